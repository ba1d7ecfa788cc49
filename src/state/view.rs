//! Zoom and pan state for the preview.
//!
//! This is a display-only transform applied to the already rendered raster.
//! It never touches the GPU pipeline.

use cgmath::{Matrix3, Vector2};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.1;
/// Pan step in display pixels
pub const PAN_STEP: f32 = 50.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    fn delta(self) -> Vector2<f32> {
        match self {
            PanDirection::Left => Vector2::new(-PAN_STEP, 0.0),
            PanDirection::Right => Vector2::new(PAN_STEP, 0.0),
            PanDirection::Up => Vector2::new(0.0, -PAN_STEP),
            PanDirection::Down => Vector2::new(0.0, PAN_STEP),
        }
    }
}

/// Scale plus offset, in display pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: [f32; 2],
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: [0.0, 0.0],
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vector2<f32> {
        Vector2::new(self.offset[0], self.offset[1])
    }

    pub fn zoom_in(&mut self) {
        self.step_scale(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.step_scale(-ZOOM_STEP);
    }

    // Snapped to tenths so repeated steps don't drift off the 0.1 grid.
    fn step_scale(&mut self, delta: f32) {
        let stepped = ((self.scale + delta) * 10.0).round() / 10.0;
        self.scale = stepped.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn pan(&mut self, direction: PanDirection) {
        let delta = direction.delta();
        self.offset[0] += delta.x;
        self.offset[1] += delta.y;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Homogeneous 2D matrix mapping content coordinates to display
    /// coordinates, both relative to the viewport centre.
    ///
    /// Equivalent to `scale(s) translate(x, y)`: the offset is applied first
    /// and is therefore scaled too.
    pub fn to_matrix(&self) -> Matrix3<f32> {
        let s = self.scale;
        let [x, y] = self.offset;
        // Column-major
        Matrix3::new(
            s, 0.0, 0.0,
            0.0, s, 0.0,
            s * x, s * y, 1.0,
        )
    }
}
