use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tone-mapping operator applied by the output pass.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
pub enum ToneMapping {
    /// Clamp only.
    None,
    /// Reinhard `c / (1 + c)`.
    Reinhard,
    /// ACES filmic curve.
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Shader-side selector.
    #[must_use]
    pub fn as_index(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Reinhard => 1,
            Self::AcesFilmic => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Effects", inline)]
#[serde(default)]
/// Hue/saturation, depth-of-field and output parameters.
pub struct PostProcessingOptions {
    /// Saturation adjustment in `[-1, 1]`.
    #[schemars(title = "Saturation", range(min = -1.0, max = 1.0), extend("step" = 0.05))]
    pub saturation: f32,
    /// Focus distance in normalized view depth `[0, 1]`.
    #[schemars(title = "Focus", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub focus_distance: f32,
    /// Depth range around the focus that stays sharp, normalized.
    #[schemars(title = "Focal Length", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub focal_length: f32,
    /// Bokeh kernel scale.
    #[schemars(title = "Bokeh Scale", range(min = 0.0, max = 10.0), extend("step" = 0.1))]
    pub bokeh_scale: f32,
    /// Reference vertical resolution the bokeh kernel is sized for.
    #[schemars(skip)]
    pub dof_resolution_height: u32,
    /// Exposure multiplier applied before tone mapping.
    #[schemars(title = "Exposure", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub exposure: f32,
    /// Tone-mapping operator.
    #[schemars(skip)]
    pub tone_mapping: ToneMapping,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            saturation: 0.7,
            focus_distance: 0.1,
            focal_length: 0.1,
            bokeh_scale: 5.0,
            dof_resolution_height: 1024,
            exposure: 1.0,
            tone_mapping: ToneMapping::AcesFilmic,
        }
    }
}
