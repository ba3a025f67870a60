//! Integration tests for configuration loading

use std::collections::HashMap;
use tempfile::TempDir;
use viewquery::logging::{LogFormat, LogOutput};
use viewquery::{ConfigLoader, QueryEngine, QueryError};

#[test]
fn test_config_file_drives_engine_settings() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("viewquery.toml");

    std::fs::write(
        &config_file,
        r#"
[refresh]
skip_unchanged = true
track_static = false

[logging]
level = "info"
format = "json"
output = "stdout"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_file(&config_file)
        .with_env(HashMap::new())
        .load()
        .unwrap();
    assert!(config.validate().is_ok());
    assert!(!config.refresh.track_static);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.output, LogOutput::Stdout);

    let engine = QueryEngine::new().with_config(&config);
    assert_eq!(engine.owner_count(), 0);
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("viewquery.toml");
    std::fs::write(&config_file, "[refresh]\nskip_unchanged = \"sometimes\"\n").unwrap();

    let result = ConfigLoader::new()
        .with_file(&config_file)
        .with_env(HashMap::new())
        .load();
    assert!(matches!(result, Err(QueryError::ConfigError(_))));
}

#[test]
fn test_invalid_log_output_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("viewquery.toml");
    std::fs::write(&config_file, "[logging]\noutput = \"both\"\n").unwrap();

    let result = ConfigLoader::new()
        .with_file(&config_file)
        .with_env(HashMap::new())
        .load();
    assert!(result.is_err());
}
