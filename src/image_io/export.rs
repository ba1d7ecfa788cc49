/// Export rasterizer
///
/// Resamples the full-resolution adjusted surface to the chosen resolution
/// and encodes it as JPEG. Output is a pure function of (raster, factor):
/// the same inputs always give the same bytes.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::gpu::{GpuContext, GpuError};
use crate::gpu::texture::RenderSurface;

pub const SUGGESTED_FILENAME: &str = "downloaded_image.jpg";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported downscale factor {0} (expected 1, 2 or 3)")]
    InvalidFactor(u32),

    #[error("Export of {width}x{height} at 1/{factor} would be empty")]
    EmptyOutput { width: u32, height: u32, factor: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Integer divisor applied to both export dimensions
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DownscaleFactor {
    #[default]
    Normal,
    Reduced,
    Minimal,
}

impl DownscaleFactor {
    pub const ALL: [DownscaleFactor; 3] = [
        DownscaleFactor::Normal,
        DownscaleFactor::Reduced,
        DownscaleFactor::Minimal,
    ];

    pub fn divisor(self) -> u32 {
        match self {
            DownscaleFactor::Normal => 1,
            DownscaleFactor::Reduced => 2,
            DownscaleFactor::Minimal => 3,
        }
    }

    /// floor(w / f) × floor(h / f)
    pub fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        (width / self.divisor(), height / self.divisor())
    }
}

impl TryFrom<u32> for DownscaleFactor {
    type Error = ExportError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DownscaleFactor::Normal),
            2 => Ok(DownscaleFactor::Reduced),
            3 => Ok(DownscaleFactor::Minimal),
            other => Err(ExportError::InvalidFactor(other)),
        }
    }
}

impl fmt::Display for DownscaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DownscaleFactor::Normal => "Normal Resolution",
            DownscaleFactor::Reduced => "Less Resolution",
            DownscaleFactor::Minimal => "Very Less Resolution",
        };
        f.write_str(label)
    }
}

/// Encoded export, consumed once by the download step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub suggested_filename: String,
}

/// Resample an adjusted raster and encode it
pub fn export_raster(adjusted: &RgbaImage, factor: DownscaleFactor) -> Result<EncodedImage, ExportError> {
    let (width, height) = adjusted.dimensions();
    let (out_width, out_height) = factor.output_size(width, height);
    if out_width == 0 || out_height == 0 {
        return Err(ExportError::EmptyOutput {
            width,
            height,
            factor: factor.divisor(),
        });
    }

    let resampled = if factor == DownscaleFactor::Normal {
        adjusted.clone()
    } else {
        imageops::resize(adjusted, out_width, out_height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(resampled).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes).encode_image(&rgb)?;

    info!(
        "Exported {}x{} -> {}x{} ({} KB)",
        width,
        height,
        out_width,
        out_height,
        bytes.len() / 1024
    );

    Ok(EncodedImage {
        bytes,
        width: out_width,
        height: out_height,
        suggested_filename: SUGGESTED_FILENAME.to_string(),
    })
}

/// Read back `surface` and export it
pub fn export_surface(
    ctx: &GpuContext,
    surface: &RenderSurface,
    factor: DownscaleFactor,
) -> Result<EncodedImage, ExportError> {
    let adjusted = surface.read_back(ctx)?;
    export_raster(&adjusted, factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_output_size_floors() {
        let cases = [
            (DownscaleFactor::Normal, (101, 55), (101, 55)),
            (DownscaleFactor::Reduced, (101, 55), (50, 27)),
            (DownscaleFactor::Minimal, (101, 55), (33, 18)),
            (DownscaleFactor::Minimal, (3, 3), (1, 1)),
        ];
        for (factor, (w, h), expected) in cases {
            assert_eq!(factor.output_size(w, h), expected, "{:?}", factor);
        }
    }

    #[test]
    fn test_exported_jpeg_has_scaled_dimensions() {
        let source = gradient(64, 47);
        for factor in DownscaleFactor::ALL {
            let encoded = export_raster(&source, factor).unwrap();
            let expected = factor.output_size(64, 47);
            assert_eq!((encoded.width, encoded.height), expected);

            let decoded = image::load_from_memory_with_format(&encoded.bytes, image::ImageFormat::Jpeg).unwrap();
            assert_eq!((decoded.width(), decoded.height()), expected);
        }
    }

    #[test]
    fn test_export_is_byte_identical_for_same_input() {
        let source = gradient(40, 30);
        let first = export_raster(&source, DownscaleFactor::Reduced).unwrap();
        let second = export_raster(&source, DownscaleFactor::Reduced).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_reflects_pixels() {
        let black = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let white = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        let a = export_raster(&black, DownscaleFactor::Normal).unwrap();
        let b = export_raster(&white, DownscaleFactor::Normal).unwrap();
        assert_ne!(a.bytes, b.bytes);
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let thin = gradient(1, 10);
        assert!(matches!(
            export_raster(&thin, DownscaleFactor::Reduced),
            Err(ExportError::EmptyOutput { width: 1, height: 10, factor: 2 })
        ));
    }

    #[test]
    fn test_factor_from_u32() {
        assert_eq!(DownscaleFactor::try_from(1).unwrap(), DownscaleFactor::Normal);
        assert_eq!(DownscaleFactor::try_from(2).unwrap(), DownscaleFactor::Reduced);
        assert_eq!(DownscaleFactor::try_from(3).unwrap(), DownscaleFactor::Minimal);
        assert!(matches!(DownscaleFactor::try_from(4), Err(ExportError::InvalidFactor(4))));
        assert!(DownscaleFactor::try_from(0).is_err());
    }

    #[test]
    fn test_suggested_filename() {
        let encoded = export_raster(&gradient(4, 4), DownscaleFactor::Normal).unwrap();
        assert_eq!(encoded.suggested_filename, "downloaded_image.jpg");
    }
}
