/// Adjustment parameters for the tone editor
///
/// Two representations live here:
/// - `SliderValues` - the integer values the sliders show (UI domain)
/// - `AdjustmentParameters` - the normalized floats the shader consumes
///
/// `SliderValues::to_parameters()` is the only place where the UI domain is
/// divided down. The GPU binder never rescales.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Factor applied to every slider when converting to shader space.
/// Brightness, exposure and contrast all map by ×0.01.
pub const UI_SCALE: f32 = 0.01;

/// Normalized adjustment values, bound as shader uniforms once per render
///
/// Values outside the declared ranges are accepted and passed to the GPU
/// unclamped. Only the final colour write clamps.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentParameters {
    /// Additive brightness, nominally -1.0 to +1.0
    /// - 0.0 = no change
    pub brightness: f32,

    /// Multiplicative exposure, nominally 0.0 to 3.0
    /// - 1.0 = no change
    pub exposure: f32,

    /// Contrast around mid-gray, nominally 0.0 to 2.0
    /// - 1.0 = no change
    /// - 0.0 = flat mid-gray
    pub contrast: f32,
}

impl Default for AdjustmentParameters {
    /// Identity adjustment
    fn default() -> Self {
        Self {
            brightness: 0.0,
            exposure: 1.0,
            contrast: 1.0,
        }
    }
}

impl AdjustmentParameters {
    pub fn new(brightness: f32, exposure: f32, contrast: f32) -> Self {
        Self {
            brightness,
            exposure,
            contrast,
        }
    }

    /// Check if every value is at its default
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Reset all three values atomically
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Nearest slider positions for these parameters
    pub fn to_sliders(&self) -> SliderValues {
        SliderValues {
            brightness: (self.brightness / UI_SCALE).round() as i32,
            exposure: (self.exposure / UI_SCALE).round() as i32,
            contrast: (self.contrast / UI_SCALE).round() as i32,
        }
    }
}

/// Which adjustment slider a UI value belongs to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Brightness,
    Exposure,
    Contrast,
}

impl Slider {
    pub const ALL: [Slider; 3] = [Slider::Brightness, Slider::Exposure, Slider::Contrast];

    /// Range of the slider widget in UI units
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Slider::Brightness => -100..=100,
            Slider::Exposure => 0..=300,
            Slider::Contrast => 0..=200,
        }
    }

    /// UI value that means "no change"
    pub fn default_value(self) -> i32 {
        match self {
            Slider::Brightness => 0,
            Slider::Exposure | Slider::Contrast => 100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Slider::Brightness => "Brightness",
            Slider::Exposure => "Exposure",
            Slider::Contrast => "Contrast",
        }
    }

    /// Label shown next to the slider
    ///
    /// Exposure and contrast are displayed relative to their neutral point,
    /// so both read 0 at the default.
    pub fn label(self, value: i32) -> String {
        let shown = match self {
            Slider::Brightness => value,
            Slider::Exposure | Slider::Contrast => value - 100,
        };
        format!("{} range: {}", self.name(), shown)
    }
}

/// Integer slider positions as the UI holds them
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderValues {
    /// -100 to +100
    pub brightness: i32,
    /// 0 to 300
    pub exposure: i32,
    /// 0 to 200
    pub contrast: i32,
}

impl Default for SliderValues {
    fn default() -> Self {
        Self {
            brightness: Slider::Brightness.default_value(),
            exposure: Slider::Exposure.default_value(),
            contrast: Slider::Contrast.default_value(),
        }
    }
}

impl SliderValues {
    pub fn get(&self, slider: Slider) -> i32 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Exposure => self.exposure,
            Slider::Contrast => self.contrast,
        }
    }

    pub fn set(&mut self, slider: Slider, value: i32) {
        match slider {
            Slider::Brightness => self.brightness = value,
            Slider::Exposure => self.exposure = value,
            Slider::Contrast => self.contrast = value,
        }
    }

    /// Map UI values into shader space (divide by 100)
    pub fn to_parameters(&self) -> AdjustmentParameters {
        AdjustmentParameters {
            brightness: self.brightness as f32 * UI_SCALE,
            exposure: self.exposure as f32 * UI_SCALE,
            contrast: self.contrast as f32 * UI_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let params = AdjustmentParameters::default();
        assert!(params.is_identity());
        assert_eq!(params.brightness, 0.0);
        assert_eq!(params.exposure, 1.0);
        assert_eq!(params.contrast, 1.0);
    }

    #[test]
    fn test_default_sliders_map_to_identity() {
        assert!(SliderValues::default().to_parameters().is_identity());
    }

    #[test]
    fn test_slider_extremes_map_to_shader_ranges() {
        let low = SliderValues {
            brightness: -100,
            exposure: 0,
            contrast: 0,
        }
        .to_parameters();
        assert!((low.brightness + 1.0).abs() < 1e-6);
        assert_eq!(low.exposure, 0.0);
        assert_eq!(low.contrast, 0.0);

        let high = SliderValues {
            brightness: 100,
            exposure: 300,
            contrast: 200,
        }
        .to_parameters();
        assert!((high.brightness - 1.0).abs() < 1e-6);
        assert!((high.exposure - 3.0).abs() < 1e-6);
        assert!((high.contrast - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sliders_round_trip_through_parameters() {
        let sliders = SliderValues {
            brightness: -37,
            exposure: 245,
            contrast: 12,
        };
        assert_eq!(sliders.to_parameters().to_sliders(), sliders);
    }

    #[test]
    fn test_out_of_range_values_are_not_clamped() {
        let sliders = SliderValues {
            brightness: 250,
            exposure: -50,
            contrast: 1000,
        };
        let params = sliders.to_parameters();
        assert!((params.brightness - 2.5).abs() < 1e-6);
        assert!((params.exposure + 0.5).abs() < 1e-6);
        assert!((params.contrast - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut params = AdjustmentParameters::new(0.4, 2.0, 0.3);
        assert!(!params.is_identity());

        params.reset();

        assert!(params.is_identity());
    }

    #[test]
    fn test_labels_show_offset_from_neutral() {
        assert_eq!(Slider::Brightness.label(-20), "Brightness range: -20");
        assert_eq!(Slider::Exposure.label(100), "Exposure range: 0");
        assert_eq!(Slider::Contrast.label(150), "Contrast range: 50");
    }

    #[test]
    fn test_set_and_get() {
        let mut sliders = SliderValues::default();
        for slider in Slider::ALL {
            let top = *slider.range().end();
            sliders.set(slider, top);
            assert_eq!(sliders.get(slider), top);
        }
    }

    #[test]
    fn test_serialization() {
        let params = AdjustmentParameters::new(0.2, 1.2, 1.5);
        let json = serde_json::to_string(&params).unwrap();
        let restored: AdjustmentParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, restored);
    }
}
