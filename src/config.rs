/// Editor settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/tone-editor/config.json
/// - macOS: ~/Library/Application Support/tone-editor/config.json
/// - Windows: %APPDATA%\tone-editor\config.json
///
/// A missing or unreadable file is not an error; defaults are used.

use iced_wgpu::wgpu;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gpu::GpuConfig;
use crate::image_io::export::DownscaleFactor;

/// Adapter preference, mirrored from wgpu so it can be serialized
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerMode {
    #[default]
    HighPerformance,
    LowPower,
    /// Software adapter, for machines without a usable GPU
    Fallback,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub power_preference: PowerMode,
    /// Width of the preview area in logical pixels
    pub preview_width: u32,
    pub default_downscale: DownscaleFactor,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            power_preference: PowerMode::HighPerformance,
            preview_width: 800,
            default_downscale: DownscaleFactor::Normal,
        }
    }
}

impl EditorConfig {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Default location of the config file, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("tone-editor");
        path.push("config.json");
        Some(path)
    }

    /// Read `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                if path.exists() {
                    warn!("Could not read {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(config) => {
                info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory found, using default settings");
                Self::default()
            }
        }
    }

    pub fn gpu_config(&self) -> GpuConfig {
        let (power_preference, force_fallback_adapter) = match self.power_preference {
            PowerMode::HighPerformance => (wgpu::PowerPreference::HighPerformance, false),
            PowerMode::LowPower => (wgpu::PowerPreference::LowPower, false),
            PowerMode::Fallback => (wgpu::PowerPreference::LowPower, true),
        };
        GpuConfig {
            power_preference,
            force_fallback_adapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let config = EditorConfig {
            power_preference: PowerMode::LowPower,
            preview_width: 640,
            default_downscale: DownscaleFactor::Minimal,
        };
        let json = config.to_json().unwrap();
        let restored = EditorConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = EditorConfig::from_json(r#"{ "preview_width": 1024 }"#).unwrap();
        assert_eq!(config.preview_width, 1024);
        assert_eq!(config.power_preference, PowerMode::HighPerformance);
        assert_eq!(config.default_downscale, DownscaleFactor::Normal);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tone-editor-no-such-config.json");
        assert_eq!(EditorConfig::load_from(&path), EditorConfig::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("tone-editor-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let config = EditorConfig::load_from(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_gpu_config_mapping() {
        let mut config = EditorConfig::default();
        let gpu = config.gpu_config();
        assert_eq!(gpu.power_preference, wgpu::PowerPreference::HighPerformance);
        assert!(!gpu.force_fallback_adapter);

        config.power_preference = PowerMode::Fallback;
        assert!(config.gpu_config().force_fallback_adapter);
    }
}
