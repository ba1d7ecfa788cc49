/// Source image loader
///
/// Decodes PNG/JPEG files to 8-bit RGBA and enforces the 4096×4096 upload
/// ceiling. The GPU core never checks this itself; it is the upload
/// boundary's job.

use image::RgbaImage;
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;

/// Largest accepted width or height
pub const MAX_DIMENSION: u32 = 4096;

/// Extensions the file dialog offers and the loader accepts
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0} (expected PNG or JPEG)")]
    UnsupportedFormat(String),

    #[error("Image dimensions exceeded {max}x{max} ({width}x{height}). Please upload image with lower resolution")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Background decode failed: {0}")]
    Join(String),
}

/// A decoded image ready for upload
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: RgbaImage,
    /// File name only (e.g., "beach.png")
    pub name: String,
}

impl LoadedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Check the upload ceiling
pub fn check_dimensions(width: u32, height: u32) -> Result<(), LoadError> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(LoadError::TooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }
    Ok(())
}

fn check_extension(path: &Path) -> Result<(), LoadError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(LoadError::UnsupportedFormat(extension))
    }
}

/// Decode an image file on the calling thread
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    check_extension(path)?;

    // Read the header first so oversized files are rejected before decoding
    let (width, height) = image::image_dimensions(path)?;
    check_dimensions(width, height)?;

    let pixels = image::open(path)?.to_rgba8();
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    info!("Loaded {} ({}x{})", name, width, height);
    Ok(LoadedImage { pixels, name })
}

/// Decode an image file on a blocking worker thread
pub async fn load_image_async(path: PathBuf) -> Result<LoadedImage, LoadError> {
    task::spawn_blocking(move || load_image(&path))
        .await
        .map_err(|e| LoadError::Join(e.to_string()))?
}
