//! merchkit Settings Crate
//!
//! Handles application configuration: customizer tunables and rendering
//! preferences, persisted as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    config_dir, default_config_path, parse_hex_color, Config, CustomizerSettings,
    MeasurementSystem, RenderSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
