//! Types shared with the host that loads this plugin

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{driver::SurfaceHandle, error::DeviceError};

/// Notifications from an open surface back to the host.
///
/// Controls are addressed by host control id (`"0/1"`, `"menu"`, `"wheel"`)
pub trait SurfaceContext: Send + Sync + 'static {
    /// Session is over, the host should discard the surface
    fn disconnect(&self, error: DeviceError);

    fn key_down_by_id(&self, control_id: &str);

    fn key_up_by_id(&self, control_id: &str);

    fn rotate_left_by_id(&self, control_id: &str);

    fn rotate_right_by_id(&self, control_id: &str);
}

/// Content the host wants on one control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawProps {
    pub control_id: String,
    pub text: Option<String>,
    pub color: Option<String>,
}

impl DrawProps {
    pub fn new(control_id: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Host feature flags, no field of it changes how this surface draws
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCapabilities {}

#[derive(Debug)]
pub struct DiscoveredSurface<D> {
    pub device_handle: String,
    pub surface_id: String,
    pub description: String,
    pub plugin_info: SurfaceHandle<D>,
}

#[derive(Debug)]
pub enum DetectionEvent<D> {
    SurfacesAdded(Vec<DiscoveredSurface<D>>),
    /// Device handles of surfaces that went away
    SurfacesRemoved(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlacement {
    pub row: u8,
    pub column: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

impl ControlPlacement {
    pub fn new(row: u8, column: u8) -> Self {
        Self {
            row,
            column,
            style_preset: None,
        }
    }

    pub fn with_preset(row: u8, column: u8, preset: &str) -> Self {
        Self {
            style_preset: Some(preset.to_string()),
            ..Self::new(row, column)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceLayout {
    pub style_presets: BTreeMap<String, StylePreset>,
    pub controls: BTreeMap<String, ControlPlacement>,
}

/// What the host needs to know to register an opened surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProps {
    pub brightness: bool,
    pub surface_layout: SurfaceLayout,
    /// Always `None`, the device has no pincode entry
    pub pincode_map: Option<BTreeMap<String, String>>,
    pub config_fields: Vec<String>,
    pub location: Option<String>,
}
