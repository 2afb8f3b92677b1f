use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
/// Placeholder background and the assets loaded at startup.
pub struct SceneOptions {
    /// Background shown until the background image arrives (`#rrggbb`).
    #[schemars(title = "Background")]
    pub background_color: String,
    /// Directory every asset path is resolved against.
    #[schemars(skip)]
    pub asset_root: PathBuf,
    /// Equirectangular HDR environment map.
    #[schemars(skip)]
    pub environment: PathBuf,
    /// Flat background image.
    #[schemars(skip)]
    pub background: PathBuf,
    /// glTF model.
    #[schemars(skip)]
    pub model: PathBuf,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            background_color: "#feff00".into(),
            asset_root: PathBuf::from("."),
            environment: PathBuf::from("textures/aristea_wreck_puresky_1k.hdr"),
            background: PathBuf::from("textures/bg.png"),
            model: PathBuf::from("spiderman/scene.gltf"),
        }
    }
}

impl SceneOptions {
    /// Resolve an asset path against [`asset_root`](Self::asset_root).
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }

    /// Parse [`background_color`](Self::background_color) into linear RGB.
    ///
    /// Accepts `#rgb` and `#rrggbb`; anything else falls back to black.
    #[must_use]
    pub fn background_rgb(&self) -> [f32; 3] {
        parse_hex_color(&self.background_color).unwrap_or([0.0; 3])
    }
}

/// Parse `#rgb` / `#rrggbb` into linear-space RGB.
#[must_use]
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#')?;
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_owned(),
        _ => return None,
    };
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte =
            u8::from_str_radix(expanded.get(i * 2..i * 2 + 2)?, 16).ok()?;
        *channel = srgb_to_linear(f32::from(byte) / 255.0);
    }
    Some(rgb)
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
