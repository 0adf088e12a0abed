use merchkit_settings::{Config, ConfigError, MeasurementSystem, SettingsError};

fn customized() -> Config {
    let mut config = Config::new();
    config.customizer.handle_size = 12.0;
    config.customizer.history_limit = 20;
    config.customizer.measurement_system = MeasurementSystem::Imperial;
    config.rendering.show_grid = false;
    config.rendering.product_color = "#1e1e1e".to_string();
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");
    let config = customized();
    config.save_to_file(&path).expect("save");

    let text = std::fs::read_to_string(&path).expect("read");
    assert!(text.contains("[customizer]"));
    assert!(text.contains("measurement_system = \"imperial\""));

    let loaded = Config::load_from_file(&path).expect("load");
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let config = customized();
    config.save_to_file(&path).expect("save");
    assert_eq!(Config::load_from_file(&path).expect("load"), config);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    let err = Config::new().save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
    ));
    assert!(!path.exists());
}

#[test]
fn test_load_or_default_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load_or_default(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[customizer]\nmin_dimension_px = -5.0\n").expect("write");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));

    std::fs::write(&path, "[customizer\n").expect("write");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    let mut config = Config::new();
    config.rendering.background = "#12345".to_string();
    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}
