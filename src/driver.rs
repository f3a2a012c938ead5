//! Interface of the native Quick Keys driver.
//!
//! The driver owns USB/HID framing and enumeration. The adapter only needs
//! the commands below, the per-device event channel and the manager's
//! connect/disconnect stream.

use std::future::Future;

use futures_lite::stream::Boxed;
use tokio::sync::mpsc;

use crate::{
    error::DeviceError,
    mappings::{DisplayBrightness, DisplayOrientation, WheelSpeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Left,
    Right,
}

/// Events emitted by a connected device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    KeyDown(u8),
    KeyUp(u8),
    Wheel(WheelDirection),
    Error(DeviceError),
}

/// Commands understood by a connected device.
///
/// Every call is a request to the hardware that completes once the device
/// acknowledged it, or fails with [`DeviceError`]
pub trait QuickKeysDevice: Send + Sync + 'static {
    fn start_data(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn stop_data(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_wheel_speed(
        &self,
        speed: WheelSpeed,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_display_orientation(
        &self,
        orientation: DisplayOrientation,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Minutes of inactivity before the device sleeps, 0 disables sleeping
    fn set_sleep_timeout(&self, minutes: u8)
    -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_wheel_color(
        &self,
        r: u8,
        g: u8,
        b: u8,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_key_text(
        &self,
        key: u8,
        text: &str,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_display_brightness(
        &self,
        level: DisplayBrightness,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Shows text on the overlay for `duration` device units, after which it clears itself
    fn show_overlay_text(
        &self,
        duration: u8,
        text: &str,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

/// Connected device together with its event channel, handed to the host as an opaque handle
#[derive(Debug)]
pub struct SurfaceHandle<D> {
    pub device: D,
    pub events: mpsc::UnboundedReceiver<DeviceEvent>,
}

#[derive(Debug)]
pub enum ManagerEvent<D> {
    Connected {
        device_id: Option<String>,
        handle: SurfaceHandle<D>,
    },
    Disconnected {
        device_id: Option<String>,
    },
    Error(DeviceError),
}

/// Enumerates devices and reports them coming and going
pub trait DeviceManager: Send + Sync + 'static {
    type Device: QuickKeysDevice;

    /// Lifecycle stream of connected and disconnected devices
    fn watch(&self) -> Boxed<ManagerEvent<Self::Device>>;

    /// Asks the manager to look for devices again, new ones arrive through [`DeviceManager::watch`]
    fn scan_devices(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn close_all(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;
}
