//! In-memory device, device manager and host context.
//!
//! Used by the test suite and the `simulate` binary to drive the adapter
//! without hardware. The mock device records every command it receives
//! and can be told to reject commands by name.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use futures_lite::{
    StreamExt,
    stream::{self, Boxed},
};
use tokio::sync::mpsc;

use crate::{
    driver::{
        DeviceEvent, DeviceManager, ManagerEvent, QuickKeysDevice, SurfaceHandle, WheelDirection,
    },
    error::DeviceError,
    host::SurfaceContext,
    mappings::{DisplayBrightness, DisplayOrientation, WheelSpeed},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Command as received by [`MockDevice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    StartData,
    StopData,
    SetWheelSpeed(WheelSpeed),
    SetDisplayOrientation(DisplayOrientation),
    SetSleepTimeout(u8),
    SetWheelColor(u8, u8, u8),
    SetKeyText(u8, String),
    SetDisplayBrightness(DisplayBrightness),
    ShowOverlayText(u8, String),
}

impl DeviceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::StartData => "start_data",
            DeviceCommand::StopData => "stop_data",
            DeviceCommand::SetWheelSpeed(_) => "set_wheel_speed",
            DeviceCommand::SetDisplayOrientation(_) => "set_display_orientation",
            DeviceCommand::SetSleepTimeout(_) => "set_sleep_timeout",
            DeviceCommand::SetWheelColor(..) => "set_wheel_color",
            DeviceCommand::SetKeyText(..) => "set_key_text",
            DeviceCommand::SetDisplayBrightness(_) => "set_display_brightness",
            DeviceCommand::ShowOverlayText(..) => "show_overlay_text",
        }
    }
}

#[derive(Debug, Default)]
struct Recorder {
    commands: Mutex<Vec<DeviceCommand>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl Recorder {
    fn record(&self, command: DeviceCommand) -> Result<(), DeviceError> {
        log::debug!("Mock device received {:?}", command);

        let name = command.name();
        lock(&self.commands).push(command);

        if lock(&self.failing).contains(name) {
            return Err(DeviceError::Rejected(name.to_string()));
        }

        Ok(())
    }
}

/// Device that records commands instead of talking to hardware
#[derive(Debug)]
pub struct MockDevice {
    recorder: Arc<Recorder>,
}

impl MockDevice {
    /// Returns the opaque handle the adapter takes and a handle to control the device
    pub fn new() -> (SurfaceHandle<MockDevice>, MockDeviceHandle) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let recorder = Arc::new(Recorder::default());

        let device = MockDevice {
            recorder: recorder.clone(),
        };

        (
            SurfaceHandle { device, events },
            MockDeviceHandle {
                recorder,
                events_tx,
            },
        )
    }
}

impl QuickKeysDevice for MockDevice {
    async fn start_data(&self) -> Result<(), DeviceError> {
        self.recorder.record(DeviceCommand::StartData)
    }

    async fn stop_data(&self) -> Result<(), DeviceError> {
        self.recorder.record(DeviceCommand::StopData)
    }

    async fn set_wheel_speed(&self, speed: WheelSpeed) -> Result<(), DeviceError> {
        self.recorder.record(DeviceCommand::SetWheelSpeed(speed))
    }

    async fn set_display_orientation(
        &self,
        orientation: DisplayOrientation,
    ) -> Result<(), DeviceError> {
        self.recorder
            .record(DeviceCommand::SetDisplayOrientation(orientation))
    }

    async fn set_sleep_timeout(&self, minutes: u8) -> Result<(), DeviceError> {
        self.recorder.record(DeviceCommand::SetSleepTimeout(minutes))
    }

    async fn set_wheel_color(&self, r: u8, g: u8, b: u8) -> Result<(), DeviceError> {
        self.recorder.record(DeviceCommand::SetWheelColor(r, g, b))
    }

    async fn set_key_text(&self, key: u8, text: &str) -> Result<(), DeviceError> {
        self.recorder
            .record(DeviceCommand::SetKeyText(key, text.to_string()))
    }

    async fn set_display_brightness(&self, level: DisplayBrightness) -> Result<(), DeviceError> {
        self.recorder
            .record(DeviceCommand::SetDisplayBrightness(level))
    }

    async fn show_overlay_text(&self, duration: u8, text: &str) -> Result<(), DeviceError> {
        self.recorder
            .record(DeviceCommand::ShowOverlayText(duration, text.to_string()))
    }
}

/// Inspects and drives a [`MockDevice`] after it was handed to an adapter
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    recorder: Arc<Recorder>,
    events_tx: mpsc::UnboundedSender<DeviceEvent>,
}

impl MockDeviceHandle {
    pub fn commands(&self) -> Vec<DeviceCommand> {
        lock(&self.recorder.commands).clone()
    }

    /// Returns and forgets the commands recorded so far
    pub fn take_commands(&self) -> Vec<DeviceCommand> {
        std::mem::take(&mut *lock(&self.recorder.commands))
    }

    /// Makes every following command with this name (see [`DeviceCommand::name`]) fail
    pub fn fail(&self, command: &'static str) {
        lock(&self.recorder.failing).insert(command);
    }

    pub fn recover(&self, command: &'static str) {
        lock(&self.recorder.failing).remove(command);
    }

    /// Emits a device event, returns false once nobody listens anymore
    pub fn emit(&self, event: DeviceEvent) -> bool {
        self.events_tx.send(event).is_ok()
    }

    pub fn press(&self, key: u8) -> bool {
        self.emit(DeviceEvent::KeyDown(key))
    }

    pub fn release(&self, key: u8) -> bool {
        self.emit(DeviceEvent::KeyUp(key))
    }

    pub fn rotate(&self, direction: WheelDirection) -> bool {
        self.emit(DeviceEvent::Wheel(direction))
    }
}

/// Device manager whose lifecycle events are injected through [`MockManagerHandle`]
#[derive(Debug)]
pub struct MockManager {
    events: Mutex<Option<mpsc::UnboundedReceiver<ManagerEvent<MockDevice>>>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockManager {
    pub fn new() -> (Self, MockManagerHandle) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let calls = Arc::new(Mutex::new(Vec::new()));

        (
            Self {
                events: Mutex::new(Some(events)),
                calls: calls.clone(),
            },
            MockManagerHandle { events_tx, calls },
        )
    }
}

impl DeviceManager for MockManager {
    type Device = MockDevice;

    /// Only the first caller gets the events, later streams end immediately
    fn watch(&self) -> Boxed<ManagerEvent<MockDevice>> {
        match lock(&self.events).take() {
            Some(events) => stream::unfold(events, |mut events| async move {
                let event = events.recv().await?;
                Some((event, events))
            })
            .boxed(),
            None => stream::empty().boxed(),
        }
    }

    async fn scan_devices(&self) -> Result<(), DeviceError> {
        lock(&self.calls).push("scan_devices");
        Ok(())
    }

    async fn close_all(&self) -> Result<(), DeviceError> {
        lock(&self.calls).push("close_all");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MockManagerHandle {
    events_tx: mpsc::UnboundedSender<ManagerEvent<MockDevice>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockManagerHandle {
    /// Plugs in a new mock device
    pub fn connect(&self, device_id: Option<&str>) -> MockDeviceHandle {
        let (handle, device) = MockDevice::new();

        self.events_tx
            .send(ManagerEvent::Connected {
                device_id: device_id.map(str::to_string),
                handle,
            })
            .ok();

        device
    }

    pub fn disconnect(&self, device_id: Option<&str>) {
        self.events_tx
            .send(ManagerEvent::Disconnected {
                device_id: device_id.map(str::to_string),
            })
            .ok();
    }

    pub fn fail(&self, error: DeviceError) {
        self.events_tx.send(ManagerEvent::Error(error)).ok();
    }

    /// Names of the manager methods called so far
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }
}

/// Host notification as seen by [`RecordingContext`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    Disconnect(DeviceError),
    KeyDown(String),
    KeyUp(String),
    RotateLeft(String),
    RotateRight(String),
}

/// Host context that records notifications, clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    notifications: Arc<Mutex<Vec<HostNotification>>>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<HostNotification> {
        lock(&self.notifications).clone()
    }

    fn push(&self, notification: HostNotification) {
        log::info!("Host notified: {:?}", notification);
        lock(&self.notifications).push(notification);
    }
}

impl SurfaceContext for RecordingContext {
    fn disconnect(&self, error: DeviceError) {
        self.push(HostNotification::Disconnect(error));
    }

    fn key_down_by_id(&self, control_id: &str) {
        self.push(HostNotification::KeyDown(control_id.to_string()));
    }

    fn key_up_by_id(&self, control_id: &str) {
        self.push(HostNotification::KeyUp(control_id.to_string()));
    }

    fn rotate_left_by_id(&self, control_id: &str) {
        self.push(HostNotification::RotateLeft(control_id.to_string()));
    }

    fn rotate_right_by_id(&self, control_id: &str) {
        self.push(HostNotification::RotateRight(control_id.to_string()));
    }
}
