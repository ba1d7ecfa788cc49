//! GPU image adjustment and preview.
//!
//! Brightness, exposure and contrast are applied in a single fragment pass
//! over the loaded image. The result can be previewed under a zoom/pan
//! transform and exported as a (optionally downscaled) JPEG.

pub mod color;
pub mod config;
pub mod gpu;
pub mod image_io;
pub mod state;
pub mod ui;
