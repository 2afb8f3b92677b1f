//! Centralized viewer options with TOML preset support.
//!
//! Camera, controls, post-processing, scene assets, page overlay, flight and
//! debug settings are consolidated here. Options serialize to/from TOML so a
//! showcase can ship its own preset next to its assets.

mod camera;
mod controls;
mod debug;
mod flight;
mod pages;
mod post_processing;
mod scene;

use std::path::Path;

pub use camera::CameraOptions;
pub use controls::ControlsOptions;
pub use debug::DebugOptions;
pub use flight::FlightOptions;
pub use pages::PageOptions;
pub use post_processing::{PostProcessingOptions, ToneMapping};
pub use scene::{parse_hex_color, SceneOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::VitrineError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Projection and initial viewpoint.
    pub camera: CameraOptions,
    /// Orbit controls.
    pub controls: ControlsOptions,
    /// Post-processing effect parameters.
    pub post_processing: PostProcessingOptions,
    /// Startup assets and placeholder background.
    #[schemars(skip)]
    pub scene: SceneOptions,
    /// Page overlay behaviour.
    #[schemars(skip)]
    pub pages: PageOptions,
    /// Camera flight behaviour.
    pub flight: FlightOptions,
    /// Debug visualization options.
    pub debug: DebugOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let content =
            std::fs::read_to_string(path).map_err(VitrineError::Io)?;
        toml::from_str(&content)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VitrineError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VitrineError::Io)?;
        }
        std::fs::write(path, content).map_err(VitrineError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FlightPolicy;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[post_processing]
saturation = 0.2

[flight]
policy = "Overlap"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.post_processing.saturation, 0.2);
        assert_eq!(opts.flight.policy, FlightPolicy::Overlap);
        // Everything else should be default
        assert_eq!(opts.post_processing.bokeh_scale, 5.0);
        assert_eq!(opts.camera.fovy, 60.0);
        assert_eq!(opts.pages.hide_duration_ms, 500);
        assert!(!opts.controls.enabled);
    }

    #[test]
    fn defaults_match_showcase_constants() {
        let opts = Options::default();
        assert_eq!(opts.camera.znear, 0.01);
        assert_eq!(opts.camera.zfar, 50.0);
        assert_eq!(opts.camera.target, [6.98, 38.82, 9.01]);
        assert_eq!(opts.controls.min_distance, 2.0);
        assert_eq!(opts.controls.max_distance, 500.0);
        assert_eq!(opts.post_processing.focus_distance, 0.1);
        assert_eq!(opts.post_processing.focal_length, 0.1);
        assert_eq!(opts.post_processing.tone_mapping, ToneMapping::AcesFilmic);
        assert_eq!(opts.pages.initial_page, "page1.html");
        assert_eq!(opts.pages.reveal_delay_ms, 100);
    }

    #[test]
    fn save_then_load_preserves_edits() {
        let dir = std::env::temp_dir()
            .join(format!("vitrine-options-{}", std::process::id()));
        let path = dir.join("gallery.toml");
        let mut opts = Options::default();
        opts.controls.enabled = true;
        opts.pages.initial_page = "intro.html".into();
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["gallery".to_owned()]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let dir = std::env::temp_dir()
            .join(format!("vitrine-bad-options-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[camera\nfovy = ").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(VitrineError::OptionsParse(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn hex_background_parses_to_linear_rgb() {
        let rgb = parse_hex_color("#feff00").unwrap();
        assert!(rgb[0] > 0.98 && rgb[0] < 1.0);
        assert_eq!(rgb[1], 1.0);
        assert_eq!(rgb[2], 0.0);
        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("yellow"), None);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("controls"));
        assert!(props.contains_key("post_processing"));
        assert!(props.contains_key("debug"));

        // Skipped sections should be absent
        assert!(!props.contains_key("scene"));
        assert!(!props.contains_key("pages"));

        let post = &props["post_processing"]["properties"];
        assert!(post.get("saturation").is_some());
        assert!(post.get("tone_mapping").is_none());
    }
}
