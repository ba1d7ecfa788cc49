use cgmath::{SquareMatrix, Vector3};
use image::{Rgba, RgbaImage};

use crate::state::view::ViewTransform;

/// Compose the on-screen preview for an adjusted raster.
///
/// The raster is fitted to `viewport_width` (aspect kept, so the viewport
/// height follows from the image), then the view transform is applied about
/// the viewport centre. Pixels the transformed image does not cover are
/// transparent.
pub fn compose_preview(raster: &RgbaImage, viewport_width: u32, view: &ViewTransform) -> RgbaImage {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 || viewport_width == 0 {
        return RgbaImage::new(0, 0);
    }

    let fit = viewport_width as f32 / width as f32;
    let viewport_height = ((height as f32 * fit).round() as u32).max(1);

    // Display -> content, both relative to the viewport centre
    let inverse = match view.to_matrix().invert() {
        Some(m) => m,
        None => return RgbaImage::new(viewport_width, viewport_height),
    };

    let cx = viewport_width as f32 / 2.0;
    let cy = viewport_height as f32 / 2.0;

    RgbaImage::from_fn(viewport_width, viewport_height, |dx, dy| {
        let display = Vector3::new(dx as f32 + 0.5 - cx, dy as f32 + 0.5 - cy, 1.0);
        let content = inverse * display;

        let sx = ((content.x + cx) / fit).floor();
        let sy = ((content.y + cy) / fit).floor();
        if sx < 0.0 || sy < 0.0 || sx >= width as f32 || sy >= height as f32 {
            return Rgba([0, 0, 0, 0]);
        }
        *raster.get_pixel(sx as u32, sy as u32)
    })
}
