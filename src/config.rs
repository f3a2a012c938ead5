use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    mappings::{DisplayOrientation, WheelSpeed},
};

/// Settings applied to every device during init
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub wheel_speed: WheelSpeed,
    pub orientation: DisplayOrientation,
    /// Minutes before the device sleeps, 0 keeps it awake
    pub sleep_timeout: u8,
}

impl SurfaceConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads config from file, missing file means defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
