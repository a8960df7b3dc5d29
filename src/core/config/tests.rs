use super::data::{Config, DEFAULT_GRAPH_BASE_URL};
use super::io::ConfigError;
use crate::core::render::MessageFormat;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.graph_base_url(), DEFAULT_GRAPH_BASE_URL);
    assert_eq!(config.lookup_timeout(), Duration::from_secs(5));
    assert_eq!(config.default_format(), MessageFormat::Markdown);
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        graph_base_url: Some("https://graph.example.test/beta/".to_string()),
        lookup_timeout_secs: Some(2),
        default_format: Some("text".to_string()),
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.graph_base_url(), "https://graph.example.test/beta");
    assert_eq!(loaded.lookup_timeout(), Duration::from_secs(2));
    assert_eq!(loaded.default_format(), MessageFormat::Text);

    let mut cleared = loaded;
    cleared.default_format = None;
    cleared
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.default_format, None);
}

#[test]
fn test_invalid_values_fall_back_to_defaults() {
    let config = Config {
        graph_base_url: Some(String::new()),
        lookup_timeout_secs: Some(0),
        default_format: Some("rtf".to_string()),
    };

    assert_eq!(config.graph_base_url(), DEFAULT_GRAPH_BASE_URL);
    assert_eq!(config.lookup_timeout(), Duration::from_secs(5));
    assert_eq!(config.default_format(), MessageFormat::Markdown);
}

#[test]
fn test_parse_error_names_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "lookup_timeout_secs = \"soon\"").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}
