//! Xencelabs Quick Keys surface plugin.
//!
//! Adapts the Quick Keys (8 labelled keys, a menu button, a wheel and an
//! overlay display) to a control-surface host that addresses controls by
//! id (`"0/1"` .. `"1/4"`, `"menu"`, `"wheel"`).
//!
//! The native driver sits behind [`driver::QuickKeysDevice`] and
//! [`driver::DeviceManager`]. [`plugin::QuickKeysPlugin`] turns the
//! manager's lifecycle events into detection events and opens a
//! [`device::SurfaceAdapter`] per device.

pub mod color;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod host;
pub mod inputs;
pub mod mappings;
pub mod mock;
pub mod plugin;
pub mod watcher;

pub use config::SurfaceConfig;
pub use device::{SessionState, SurfaceAdapter};
pub use error::{ConfigError, DeviceError, Result, SurfaceError};
pub use plugin::{OpenSurfaceResult, QuickKeysPlugin};
