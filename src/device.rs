use std::{fmt, sync::Arc};

use tokio::{
    sync::{mpsc::UnboundedReceiver, watch},
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    color::Rgb,
    config::SurfaceConfig,
    driver::{DeviceEvent, QuickKeysDevice, SurfaceHandle, WheelDirection},
    error::{Result, SurfaceError},
    host::{DrawProps, HostCapabilities, SurfaceContext},
    inputs::{control_to_key, key_to_control},
    mappings::{
        DisplayBrightness, KEY_TEXT_LIMIT, MENU_CONTROL, PRODUCT_NAME, STATUS_CLEAR_DURATION,
        STATUS_DURATION, STATUS_REFRESH_INTERVAL, TEXT_KEY_COUNT, WHEEL_CONTROL,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    /// Init failed, the host has to discard the surface
    Failed,
    Closed,
    /// Device reported an error, terminal
    Disconnected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
            SessionState::Disconnected => "disconnected",
        };

        f.write_str(name)
    }
}

/// One open Quick Keys device, translating host commands to device commands
/// and device events to host notifications.
///
/// The adapter owns the device for the whole session. Its background tasks
/// (event forwarding and status refresh) are children of the session token
/// and stop on [`SurfaceAdapter::close`], on a device error or on drop
pub struct SurfaceAdapter<D: QuickKeysDevice> {
    surface_id: String,
    device: Arc<D>,
    config: SurfaceConfig,
    state: Arc<watch::Sender<SessionState>>,
    session: CancellationToken,
    status: Option<CancellationToken>,
    tracker: TaskTracker,
}

impl<D: QuickKeysDevice> SurfaceAdapter<D> {
    /// Wraps an opened device and starts forwarding its events to `context`.
    /// Must be called within a Tokio runtime
    pub fn new<C: SurfaceContext>(
        surface_id: String,
        handle: SurfaceHandle<D>,
        context: C,
        config: SurfaceConfig,
    ) -> Self {
        Self::with_tracker(
            surface_id,
            handle,
            context,
            config,
            &TaskTracker::new(),
            CancellationToken::new(),
        )
    }

    /// Same as [`SurfaceAdapter::new`], spawning background tasks on `tracker`
    /// and stopping them when `session` is cancelled
    pub fn with_tracker<C: SurfaceContext>(
        surface_id: String,
        handle: SurfaceHandle<D>,
        context: C,
        config: SurfaceConfig,
        tracker: &TaskTracker,
        session: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        let state = Arc::new(state);

        tracker.spawn(device_events_task(
            surface_id.clone(),
            handle.events,
            context,
            state.clone(),
            session.clone(),
        ));

        Self {
            surface_id,
            device: Arc::new(handle.device),
            config,
            state,
            session,
            status: None,
            tracker: tracker.clone(),
        }
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn product_name(&self) -> &'static str {
        PRODUCT_NAME
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribes to session state changes, e.g. to notice a disconnect
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Starts reporting, applies configured defaults and blanks the device
    pub async fn init(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Uninitialized => {}
            SessionState::Ready => return Err(SurfaceError::AlreadyInitialized),
            other => return Err(SurfaceError::NotConnected(other)),
        }

        log::info!("Initializing {}", self.surface_id);

        match self.configure().await {
            Ok(()) => {
                self.transition(SessionState::Uninitialized, SessionState::Ready);
                log::info!("{} is ready", self.surface_id);

                Ok(())
            }
            Err(err) => {
                log::error!("Had error during init of {}: {}", self.surface_id, err);
                self.transition(SessionState::Uninitialized, SessionState::Failed);

                Err(err)
            }
        }
    }

    async fn configure(&mut self) -> Result<()> {
        self.device.start_data().await?;

        self.device.set_wheel_speed(self.config.wheel_speed).await?;
        self.device
            .set_display_orientation(self.config.orientation)
            .await?;
        self.device
            .set_sleep_timeout(self.config.sleep_timeout)
            .await?;

        self.blank().await
    }

    /// Post-init hook, nothing to do for this device
    pub async fn ready(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn update_capabilities(&mut self, _capabilities: &HostCapabilities) {}

    /// Ends the session. The status timer is stopped even when the device
    /// fails to stop reporting. A disconnected surface stays disconnected
    /// and its device is not touched
    pub async fn close(&mut self) -> Result<()> {
        self.stop_status_timer();
        self.session.cancel();

        let mut previous = SessionState::Closed;
        self.state.send_if_modified(|state| {
            previous = *state;

            match *state {
                SessionState::Closed | SessionState::Disconnected => false,
                _ => {
                    *state = SessionState::Closed;
                    true
                }
            }
        });

        match previous {
            SessionState::Closed => return Ok(()),
            SessionState::Disconnected => {
                log::info!("{} is already disconnected", self.surface_id);
                return Ok(());
            }
            _ => {}
        }

        log::info!("Closing {}", self.surface_id);

        self.device.stop_data().await?;

        Ok(())
    }

    pub async fn set_brightness(&mut self, percent: u8) -> Result<()> {
        self.ensure_connected()?;

        let level = DisplayBrightness::from_percent(percent);
        log::debug!(
            "Setting brightness of {} to {:?} ({}%)",
            self.surface_id,
            level,
            percent
        );

        self.device.set_display_brightness(level).await?;

        Ok(())
    }

    /// Clears status overlay, wheel color and every key label
    pub async fn blank(&mut self) -> Result<()> {
        self.ensure_connected()?;
        self.clear_status(None).await?;

        self.device.set_wheel_color(0, 0, 0).await?;

        for key in 0..TEXT_KEY_COUNT {
            self.device.set_key_text(key, "").await?;
        }

        Ok(())
    }

    /// Draws one control. `token` is checked once, after the status overlay is retired
    pub async fn draw(&mut self, token: &CancellationToken, props: &DrawProps) -> Result<()> {
        self.ensure_connected()?;

        // Status and key content share the display
        self.clear_status(None).await?;

        if token.is_cancelled() {
            log::debug!("Draw of {} was cancelled", props.control_id);
            return Ok(());
        }

        match props.control_id.as_str() {
            // Nothing to draw
            MENU_CONTROL => {}
            WHEEL_CONTROL => {
                let Rgb { r, g, b } = wheel_color(props.color.as_deref());

                log::debug!(
                    "Setting wheel color of {} to {},{},{}",
                    self.surface_id,
                    r,
                    g,
                    b
                );
                self.device.set_wheel_color(r, g, b).await?;
            }
            control_id => {
                let Some(key) = control_to_key(control_id) else {
                    log::debug!("No key for control {}, skipping draw", control_id);
                    return Ok(());
                };

                let text: String = props
                    .text
                    .as_deref()
                    .map(|text| text.chars().take(KEY_TEXT_LIMIT).collect())
                    .unwrap_or_default();

                log::debug!("Setting text of key {} to {:?}", key, text);
                self.device.set_key_text(key, &text).await?;
            }
        }

        Ok(())
    }

    /// Shows `message` on the overlay until it is cleared or replaced
    pub async fn show_status(&mut self, message: &str) -> Result<()> {
        self.ensure_connected()?;
        self.stop_status_timer();

        self.device
            .show_overlay_text(STATUS_DURATION, message)
            .await?;

        let token = self.session.child_token();
        self.tracker.spawn(status_refresh_task(
            self.device.clone(),
            message.to_string(),
            token.clone(),
        ));
        self.status = Some(token);

        Ok(())
    }

    /// Retires the active status, briefly showing `message` in its place.
    /// Does nothing when no status is shown
    pub async fn clear_status(&mut self, message: Option<&str>) -> Result<()> {
        self.ensure_connected()?;

        if self.stop_status_timer() {
            self.device
                .show_overlay_text(STATUS_CLEAR_DURATION, message.unwrap_or(""))
                .await?;
        }

        Ok(())
    }

    /// Returns true if a timer was running
    fn stop_status_timer(&mut self) -> bool {
        match self.status.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        match self.state() {
            SessionState::Uninitialized | SessionState::Ready => Ok(()),
            other => Err(SurfaceError::NotConnected(other)),
        }
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }
}

impl<D: QuickKeysDevice> Drop for SurfaceAdapter<D> {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

fn wheel_color(spec: Option<&str>) -> Rgb {
    let Some(spec) = spec else {
        return Rgb::BLACK;
    };

    Rgb::parse(spec).unwrap_or_else(|| {
        log::warn!("Unable to parse color {:?}, using black", spec);
        Rgb::BLACK
    })
}

/// Moves a live session to Disconnected, returns false if it already ended
fn mark_disconnected(state: &watch::Sender<SessionState>) -> bool {
    state.send_if_modified(|state| match *state {
        SessionState::Uninitialized | SessionState::Ready => {
            *state = SessionState::Disconnected;
            true
        }
        _ => false,
    })
}

/// Handles events from device to host
async fn device_events_task<C: SurfaceContext>(
    surface_id: String,
    mut events: UnboundedReceiver<DeviceEvent>,
    context: C,
    state: Arc<watch::Sender<SessionState>>,
    session: CancellationToken,
) {
    log::info!("Listening for events from {}", surface_id);

    loop {
        let event = tokio::select! {
            biased;
            _ = session.cancelled() => None,
            event = events.recv() => event,
        };

        let Some(event) = event else {
            break;
        };

        log::debug!("New event from {}: {:?}", surface_id, event);

        match event {
            DeviceEvent::KeyDown(key) => {
                if let Some(control_id) = key_to_control(key) {
                    context.key_down_by_id(&control_id);
                }
            }
            DeviceEvent::KeyUp(key) => {
                if let Some(control_id) = key_to_control(key) {
                    context.key_up_by_id(&control_id);
                }
            }
            DeviceEvent::Wheel(WheelDirection::Left) => context.rotate_left_by_id(WHEEL_CONTROL),
            DeviceEvent::Wheel(WheelDirection::Right) => context.rotate_right_by_id(WHEEL_CONTROL),
            DeviceEvent::Error(err) => {
                log::error!("Device {} error: {}", surface_id, err);

                let disconnected = mark_disconnected(&state);
                // Also stops the status timer, the device is gone
                session.cancel();

                if disconnected {
                    context.disconnect(err);
                } else {
                    log::info!("{} was already closed, not reporting disconnect", surface_id);
                }
                break;
            }
        }
    }

    log::info!("Stopped listening for events from {}", surface_id);
}

/// Reissues the status overlay, which the device clears on its own after [`STATUS_DURATION`]
async fn status_refresh_task<D: QuickKeysDevice>(
    device: Arc<D>,
    message: String,
    token: CancellationToken,
) {
    let mut interval = interval_at(
        Instant::now() + STATUS_REFRESH_INTERVAL,
        STATUS_REFRESH_INTERVAL,
    );
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        log::debug!("Refreshing status overlay {:?}", message);

        if let Err(err) = device.show_overlay_text(STATUS_DURATION, &message).await {
            log::error!("Overlay failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_live_sessions_become_disconnected() {
        for live in [SessionState::Uninitialized, SessionState::Ready] {
            let (state, _) = watch::channel(live);

            assert!(mark_disconnected(&state));
            assert_eq!(*state.borrow(), SessionState::Disconnected);
        }

        for ended in [
            SessionState::Failed,
            SessionState::Closed,
            SessionState::Disconnected,
        ] {
            let (state, _) = watch::channel(ended);

            assert!(!mark_disconnected(&state));
            assert_eq!(*state.borrow(), ended);
        }
    }
}
