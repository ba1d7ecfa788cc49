/// CPU reference for the colour adjustment
///
/// Mirrors the fragment shader in `gpu::shaders` operation for operation:
/// 1. contrast, pivoted at mid-gray (0.5)
/// 2. additive brightness
/// 3. multiplicative exposure
/// 4. clamp to [0, 1] at the final write
///
/// Used for headless processing and as the oracle in GPU parity tests.

use image::RgbaImage;

use crate::state::edit::AdjustmentParameters;

/// Apply contrast, brightness and exposure to one normalized channel.
/// The result is NOT clamped.
#[inline]
pub fn adjust_channel(value: f32, params: &AdjustmentParameters) -> f32 {
    let contrasted = (value - 0.5) * params.contrast + 0.5;
    let brightened = contrasted + params.brightness;
    brightened * params.exposure
}

/// Adjust one RGBA8 pixel. Alpha passes through untouched.
pub fn adjust_pixel(rgba: [u8; 4], params: &AdjustmentParameters) -> [u8; 4] {
    let mut out = rgba;
    for channel in out.iter_mut().take(3) {
        let adjusted = adjust_channel(*channel as f32 / 255.0, params);
        *channel = unorm_to_u8(adjusted);
    }
    out
}

/// Adjust every pixel of an RGBA8 raster, same dimensions out
pub fn adjust_image(source: &RgbaImage, params: &AdjustmentParameters) -> RgbaImage {
    let mut output = source.clone();
    for pixel in output.pixels_mut() {
        pixel.0 = adjust_pixel(pixel.0, params);
    }
    output
}

/// Clamp-and-round float to 8-bit, as a Unorm render target write does
#[inline]
pub fn unorm_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
