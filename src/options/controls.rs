use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Pointer-driven orbit controls.
pub struct ControlsOptions {
    /// Whether pointer input moves the camera at startup.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// Closest the camera may dolly toward the target.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Farthest the camera may dolly from the target.
    #[schemars(skip)]
    pub max_distance: f32,
    /// Rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Dolly sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub zoom_speed: f32,
    /// Pan sensitivity multiplier.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub pan_speed: f32,
    /// Keep orbiting with decaying velocity after the pointer is released.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub damping_factor: f32,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            min_distance: 2.0,
            max_distance: 500.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_damping: false,
            damping_factor: 0.05,
        }
    }
}
