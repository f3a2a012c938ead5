use thiserror::Error;

use crate::device::SessionState;

pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Failure reported by the device driver, either as a rejected command or as an error event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("device disconnected")]
    Disconnected,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("device rejected command: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("device command failed: {0}")]
    Device(#[from] DeviceError),

    #[error("surface is {0}")]
    NotConnected(SessionState),

    #[error("surface is already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
