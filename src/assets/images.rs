//! Decoded image assets: the HDR environment and the flat background.

use std::path::Path;

use half::f16;

use crate::error::VitrineError;

/// Equirectangular HDR environment in linear RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Row-major linear RGBA texels.
    pub texels: Vec<[f32; 4]>,
}

impl EnvironmentMap {
    /// Decode a Radiance `.hdr` (or any float-capable format) file.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::AssetLoad`] if the file cannot be read or
    /// decoded.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let img = image::open(path)
            .map_err(|e| VitrineError::asset(path.display().to_string(), e))?
            .to_rgba32f();
        let (width, height) = img.dimensions();
        let texels = img
            .pixels()
            .map(|p| p.0)
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Texels packed as `Rgba16Float`, ready for upload.
    ///
    /// Values above the half-float range saturate instead of becoming
    /// infinite.
    #[must_use]
    pub fn to_half_texels(&self) -> Vec<f16> {
        let max = f16::MAX.to_f32();
        self.texels
            .iter()
            .flat_map(|t| t.map(|c| f16::from_f32(c.clamp(-max, max))))
            .collect()
    }

    /// Mean radiance, used as the ambient term.
    #[must_use]
    pub fn average(&self) -> [f32; 3] {
        if self.texels.is_empty() {
            return [0.0; 3];
        }
        let sum = self.texels.iter().fold([0.0_f64; 3], |acc, t| {
            [
                acc[0] + f64::from(t[0]),
                acc[1] + f64::from(t[1]),
                acc[2] + f64::from(t[2]),
            ]
        });
        let n = self.texels.len() as f64;
        [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
    }
}

/// 8-bit sRGB RGBA image used as the scene backdrop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes.
    pub rgba: Vec<u8>,
}

impl BackgroundImage {
    /// Decode a PNG/JPEG/... file.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::AssetLoad`] if the file cannot be read or
    /// decoded.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let img = image::open(path)
            .map_err(|e| VitrineError::asset(path.display().to_string(), e))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("vitrine_images_{}_{name}", std::process::id()))
    }

    #[test]
    fn background_png_decodes_to_rgba() {
        let path = temp_path("bg.png");
        let img = image::RgbaImage::from_fn(4, 2, |x, _| {
            image::Rgba([x as u8 * 60, 0, 255, 255])
        });
        img.save(&path).unwrap();

        let bg = BackgroundImage::load(&path).unwrap();
        assert_eq!((bg.width, bg.height), (4, 2));
        assert_eq!(bg.rgba.len(), 4 * 2 * 4);
        assert_eq!(&bg.rgba[4..8], &[60, 0, 255, 255]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn hdr_decodes_to_linear_float() {
        let path = temp_path("env.hdr");
        let img = image::Rgb32FImage::from_fn(8, 4, |x, _| {
            image::Rgb([x as f32, 0.5, 2.0])
        });
        image::DynamicImage::ImageRgb32F(img).save(&path).unwrap();

        let env = EnvironmentMap::load(&path).unwrap();
        assert_eq!((env.width, env.height), (8, 4));
        assert_eq!(env.texels.len(), 32);
        let t = env.texels[3];
        assert!((t[0] - 3.0).abs() < 0.05);
        assert!((t[2] - 2.0).abs() < 0.05);
        assert_eq!(t[3], 1.0);
        assert_eq!(env.to_half_texels().len(), 32 * 4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let err = BackgroundImage::load(Path::new("/nonexistent/bg.png"))
            .unwrap_err();
        assert!(matches!(err, VitrineError::AssetLoad { .. }));
    }

    #[test]
    fn average_of_uniform_map() {
        let env = EnvironmentMap {
            width: 2,
            height: 1,
            texels: vec![[1.0, 2.0, 3.0, 1.0]; 2],
        };
        assert_eq!(env.average(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn half_packing_saturates() {
        let env = EnvironmentMap {
            width: 1,
            height: 1,
            texels: vec![[1e9, 0.25, 0.0, 1.0]],
        };
        let half = env.to_half_texels();
        assert!(half[0].is_finite());
        assert_eq!(half[0], f16::MAX);
        assert_eq!(half[1].to_f32(), 0.25);
    }
}
