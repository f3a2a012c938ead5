use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::host::{ControlPlacement, StylePreset, SurfaceLayout};

// Prefix of every surface id this plugin reports, followed by the device id
pub const SURFACE_ID_PREFIX: &str = "quickkeys";

pub const PRODUCT_NAME: &str = "Xencelabs Quick Keys";

/// Labelled keys, indices 0-7
pub const TEXT_KEY_COUNT: u8 = 8;
pub const MENU_KEY: u8 = 8;
pub const WHEEL_KEY: u8 = 9;

pub const MENU_CONTROL: &str = "menu";
pub const WHEEL_CONTROL: &str = "wheel";

/// Characters that fit on a key label
pub const KEY_TEXT_LIMIT: usize = 8;

/// Overlay duration (device units) used for status messages
pub const STATUS_DURATION: u8 = 5;
/// Overlay duration (device units) used to retire a status message
pub const STATUS_CLEAR_DURATION: u8 = 1;
/// The overlay auto-clears, so the status is reissued before it runs out
pub const STATUS_REFRESH_INTERVAL: Duration = Duration::from_millis(3000);

pub fn surface_id_for(device_id: &str) -> String {
    format!("{}:{}", SURFACE_ID_PREFIX, device_id)
}

/// Display brightness levels supported by the device, ordered from dimmest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DisplayBrightness {
    Off = 0,
    Low = 1,
    Medium = 2,
    Full = 3,
}

impl DisplayBrightness {
    pub const LEVELS: [DisplayBrightness; 4] = [
        DisplayBrightness::Off,
        DisplayBrightness::Low,
        DisplayBrightness::Medium,
        DisplayBrightness::Full,
    ];

    /// Quantizes host percentage (0-100) to the nearest supported level.
    /// Values above 100 saturate at the brightest level
    pub fn from_percent(percent: u8) -> Self {
        let per_step = 100.0 / (Self::LEVELS.len() - 1) as f64;
        let step = (f64::from(percent) / per_step).round() as usize;

        Self::LEVELS[step.min(Self::LEVELS.len() - 1)]
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum WheelSpeed {
    Slowest = 5,
    Slower = 4,
    #[default]
    Normal = 3,
    Faster = 2,
    Fastest = 1,
}

impl WheelSpeed {
    pub fn value(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DisplayOrientation {
    #[default]
    Rotate0 = 1,
    Rotate90 = 2,
    Rotate180 = 3,
    Rotate270 = 4,
}

impl DisplayOrientation {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Returns layout the host should render for this device
///
///   column:  0      1     2     3     4     5
///   row 0:   menu   0/1   0/2   0/3   0/4   wheel
///   row 1:          1/1   1/2   1/3   1/4
pub fn surface_layout() -> SurfaceLayout {
    let mut style_presets = BTreeMap::new();
    // Labelled buttons
    style_presets.insert(
        "default".to_string(),
        StylePreset {
            text: Some(true),
            ..Default::default()
        },
    );
    style_presets.insert(
        "wheel".to_string(),
        StylePreset {
            colors: Some("hex".to_string()),
            ..Default::default()
        },
    );
    // The menu button
    style_presets.insert("empty".to_string(), StylePreset::default());

    let mut controls = BTreeMap::new();
    controls.insert(
        "menu".to_string(),
        ControlPlacement::with_preset(0, 0, "empty"),
    );
    controls.insert(
        "wheel".to_string(),
        ControlPlacement::with_preset(0, 5, "wheel"),
    );

    for row in 0..=1 {
        for column in 1..=4 {
            controls.insert(
                format!("{}/{}", row, column),
                ControlPlacement::new(row, column),
            );
        }
    }

    SurfaceLayout {
        style_presets,
        controls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_endpoints() {
        assert_eq!(DisplayBrightness::from_percent(0), DisplayBrightness::Off);
        assert_eq!(DisplayBrightness::from_percent(100), DisplayBrightness::Full);
    }

    #[test]
    fn brightness_rounds_to_nearest_level() {
        assert_eq!(DisplayBrightness::from_percent(16), DisplayBrightness::Off);
        assert_eq!(DisplayBrightness::from_percent(17), DisplayBrightness::Low);
        assert_eq!(DisplayBrightness::from_percent(33), DisplayBrightness::Low);
        assert_eq!(DisplayBrightness::from_percent(50), DisplayBrightness::Medium);
        assert_eq!(DisplayBrightness::from_percent(83), DisplayBrightness::Medium);
        assert_eq!(DisplayBrightness::from_percent(84), DisplayBrightness::Full);
    }

    #[test]
    fn brightness_is_monotonic() {
        let mut previous = DisplayBrightness::Off;

        for percent in 0..=100 {
            let level = DisplayBrightness::from_percent(percent);
            assert!(level >= previous, "{percent}% went down to {level:?}");
            previous = level;
        }
    }

    #[test]
    fn brightness_saturates_above_hundred() {
        assert_eq!(DisplayBrightness::from_percent(200), DisplayBrightness::Full);
        assert_eq!(DisplayBrightness::from_percent(u8::MAX), DisplayBrightness::Full);
    }

    #[test]
    fn layout_covers_every_control() {
        let layout = surface_layout();

        assert_eq!(layout.controls.len(), 10);
        assert_eq!(layout.controls["menu"].style_preset.as_deref(), Some("empty"));
        assert_eq!(layout.controls["wheel"].column, 5);
        assert_eq!(layout.controls["1/4"].row, 1);
        assert_eq!(layout.controls["1/4"].column, 4);
        assert_eq!(layout.style_presets["default"].text, Some(true));
    }

    #[test]
    fn surface_ids_are_prefixed() {
        assert_eq!(surface_id_for("ABC123"), "quickkeys:ABC123");
    }
}
