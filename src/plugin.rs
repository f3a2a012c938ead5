use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::SurfaceConfig,
    device::SurfaceAdapter,
    driver::{DeviceManager, QuickKeysDevice, SurfaceHandle},
    error::DeviceError,
    host::{DetectionEvent, DiscoveredSurface, RegisterProps, SurfaceContext},
    mappings::surface_layout,
    watcher::watcher_task,
};

/// Opened surface together with what the host needs to register it
pub struct OpenSurfaceResult<D: QuickKeysDevice> {
    pub surface: SurfaceAdapter<D>,
    pub register_props: RegisterProps,
}

pub fn register_props() -> RegisterProps {
    RegisterProps {
        brightness: true,
        surface_layout: surface_layout(),
        pincode_map: None,
        config_fields: Vec::new(),
        location: None,
    }
}

/// Entry point the host talks to: detection of devices and opening of surfaces.
///
/// Every task the plugin starts, including those of opened surfaces, is
/// tracked and stopped by [`QuickKeysPlugin::destroy`]
pub struct QuickKeysPlugin<M: DeviceManager> {
    manager: M,
    config: SurfaceConfig,
    tracker: TaskTracker,
    token: CancellationToken,
}

impl<M: DeviceManager> QuickKeysPlugin<M> {
    pub fn new(manager: M, config: SurfaceConfig) -> Self {
        Self {
            manager,
            config,
            tracker: TaskTracker::new(),
            token: CancellationToken::new(),
        }
    }

    pub async fn init(&self) -> Result<(), DeviceError> {
        log::info!("Plugin initialized");

        Ok(())
    }

    /// Starts forwarding device lifecycle events, returns the detection events for the host
    pub fn detection(&self) -> mpsc::Receiver<DetectionEvent<M::Device>> {
        let (outbound, events) = mpsc::channel(16);

        self.tracker.spawn(watcher_task(
            self.manager.watch(),
            outbound,
            self.token.child_token(),
        ));

        events
    }

    pub async fn trigger_scan(&self) -> Result<(), DeviceError> {
        log::info!("Looking for connected devices");

        self.manager.scan_devices().await
    }

    /// Host declined a discovered surface, nothing is held for it
    pub fn reject_surface(&self, surface: &DiscoveredSurface<M::Device>) {
        log::info!("Surface {} was rejected", surface.surface_id);
    }

    pub fn open_surface<C: SurfaceContext>(
        &self,
        surface_id: String,
        handle: SurfaceHandle<M::Device>,
        context: C,
    ) -> OpenSurfaceResult<M::Device> {
        log::info!("Opening surface {}", surface_id);

        let surface = SurfaceAdapter::with_tracker(
            surface_id,
            handle,
            context,
            self.config.clone(),
            &self.tracker,
            self.token.child_token(),
        );

        OpenSurfaceResult {
            surface,
            register_props: register_props(),
        }
    }

    /// Stops every task, closes all devices and waits for the tasks to finish
    pub async fn destroy(&self) -> Result<(), DeviceError> {
        log::info!("Shutting down");

        self.token.cancel();

        let result = self.manager.close_all().await;

        log::info!("Waiting for tasks to finish");

        self.tracker.close();
        self.tracker.wait().await;

        log::info!("Tasks are finished");

        result
    }
}
