//! Configuration for the merchkit customizer
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into sections:
//! - Customizer tunables (handle hotspots, size limits, history, presets, DPI)
//! - Rendering preferences (grid, guides, colors, texture export)

pub use merchkit_core::units::MeasurementSystem;
use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use merchkit_core::units::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "merchkit";
/// Default config file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Placement engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizerSettings {
    /// Half-extent of handle hotspots in pixels
    pub handle_size: f64,
    /// Distance of the rotate knob above the artwork in pixels
    pub rotate_offset: f64,
    /// Square the artwork is fitted into at scale 1, in pixels
    pub base_artwork_px: f64,
    /// Smallest artwork edge reachable by corner resize, in pixels
    pub min_dimension_px: f64,
    /// Undo steps kept per session
    pub history_limit: usize,
    /// Position tolerance for preset detection, in percent
    pub preset_tolerance_percent: f64,
    /// Scale tolerance for preset detection
    pub preset_tolerance_scale: f64,
    /// Raster density of print-area canvases
    pub dpi: f64,
    /// Units used when printing physical sizes
    pub measurement_system: MeasurementSystem,
}

impl Default for CustomizerSettings {
    fn default() -> Self {
        Self {
            handle_size: 10.0,
            rotate_offset: 40.0,
            base_artwork_px: 200.0,
            min_dimension_px: 50.0,
            history_limit: 50,
            preset_tolerance_percent: 3.0,
            preset_tolerance_scale: 0.05,
            dpi: DEFAULT_DPI,
            measurement_system: MeasurementSystem::Metric,
        }
    }
}

/// Preview and texture rendering preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub show_grid: bool,
    pub show_guides: bool,
    pub show_selection: bool,
    /// Grid spacing in pixels
    pub grid_spacing: f32,
    pub background: String,
    pub grid_color: String,
    pub guide_color: String,
    pub selection_color: String,
    /// Base color of the product mesh under the artwork texture
    pub product_color: String,
    /// Export each texture as a PNG data URI
    pub export_texture_data_uri: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_guides: true,
            show_selection: true,
            grid_spacing: 20.0,
            background: "#f5f5f5".to_string(),
            grid_color: "#dcdcdc".to_string(),
            guide_color: "#3498dbb4".to_string(),
            selection_color: "#0078d7".to_string(),
            product_color: "#ffffff".to_string(),
            export_texture_data_uri: false,
        }
    }
}

impl RenderSettings {
    /// Parsed RGBA colors: background, grid, guide, selection, product.
    pub fn colors(&self) -> ConfigResult<[[u8; 4]; 5]> {
        Ok([
            parse_hex_color("rendering.background", &self.background)?,
            parse_hex_color("rendering.grid_color", &self.grid_color)?,
            parse_hex_color("rendering.guide_color", &self.guide_color)?,
            parse_hex_color("rendering.selection_color", &self.selection_color)?,
            parse_hex_color("rendering.product_color", &self.product_color)?,
        ])
    }
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(key: &str, value: &str) -> ConfigResult<[u8; 4]> {
    let invalid = || ConfigError::InvalidColor {
        key: key.to_string(),
        value: value.to_string(),
    };
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Placement engine tunables
    pub customizer: CustomizerSettings,
    /// Rendering preferences
    pub rendering: RenderSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("saved config to {}", path.display());
        Ok(())
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let c = &self.customizer;

        if !positive(c.handle_size) {
            return Err(SettingsError::invalid(
                "customizer.handle_size",
                "must be > 0",
            ));
        }
        if !non_negative(c.rotate_offset) {
            return Err(SettingsError::invalid(
                "customizer.rotate_offset",
                "must be >= 0",
            ));
        }
        if !positive(c.base_artwork_px) {
            return Err(SettingsError::invalid(
                "customizer.base_artwork_px",
                "must be > 0",
            ));
        }
        if !positive(c.min_dimension_px) {
            return Err(SettingsError::invalid(
                "customizer.min_dimension_px",
                "must be > 0",
            ));
        }
        if c.history_limit == 0 {
            return Err(SettingsError::invalid(
                "customizer.history_limit",
                "must be > 0",
            ));
        }
        if !non_negative(c.preset_tolerance_percent) || !non_negative(c.preset_tolerance_scale) {
            return Err(SettingsError::invalid(
                "customizer.preset_tolerance",
                "tolerances must be >= 0",
            ));
        }
        if !positive(c.dpi) {
            return Err(ConfigError::ValueOutOfRange {
                key: "customizer.dpi".to_string(),
                value: c.dpi.to_string(),
            }
            .into());
        }

        if !non_negative(f64::from(self.rendering.grid_spacing)) {
            return Err(SettingsError::invalid(
                "rendering.grid_spacing",
                "must be >= 0",
            ));
        }
        self.rendering.colors()?;

        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Platform configuration directory for merchkit
pub fn config_dir() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })
}

/// Default location of the config file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.customizer.history_limit, 50);
        assert_eq!(config.customizer.dpi, 96.0);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("k", "#ff8000"), Ok([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("k", "#00000080"), Ok([0, 0, 0, 128]));
        assert!(parse_hex_color("k", "ff8000").is_err());
        assert!(parse_hex_color("k", "#ff80").is_err());
        assert!(parse_hex_color("k", "#gg0000").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.customizer.history_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.customizer.dpi = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));

        let mut config = Config::default();
        config.rendering.grid_color = "blue".to_string();
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::InvalidColor { .. }))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[customizer]\nhandle_size = 14.0\n").expect("toml");
        assert_eq!(config.customizer.handle_size, 14.0);
        assert_eq!(config.customizer.rotate_offset, 40.0);
        assert_eq!(config.rendering, RenderSettings::default());
    }
}
