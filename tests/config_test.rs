//! Configuration loading from environment and TOML files

use folio_i18n::config::Config;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const VARS: &[&str] = &[
    "FOLIO_STORAGE_PATH",
    "FOLIO_STORAGE_ENABLED",
    "FOLIO_GEO_ENDPOINT",
    "FOLIO_REFINE_DELAY_MS",
    "FOLIO_REFINE_ENABLED",
    "FOLIO_GEO_TIMEOUT_SECS",
    "FOLIO_LOG_LEVEL",
    "FOLIO_LOG_FORMAT",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config, Config::default());
    assert!(config.refinement.enabled);
    assert_eq!(config.refinement.endpoint, "https://ipapi.co/json/");
    assert_eq!(config.refine_delay(), Duration::from_millis(1000));
    assert_eq!(config.geo_timeout(), None);
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("FOLIO_STORAGE_PATH", "/tmp/folio/prefs.json");
    std::env::set_var("FOLIO_STORAGE_ENABLED", "off");
    std::env::set_var("FOLIO_GEO_ENDPOINT", "http://localhost:8080/json/");
    std::env::set_var("FOLIO_REFINE_DELAY_MS", "250");
    std::env::set_var("FOLIO_REFINE_ENABLED", "false");
    std::env::set_var("FOLIO_GEO_TIMEOUT_SECS", "3");
    std::env::set_var("FOLIO_LOG_LEVEL", "debug");
    std::env::set_var("FOLIO_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.storage.path.to_str(), Some("/tmp/folio/prefs.json"));
    assert!(!config.storage.enabled);
    assert!(!config.refinement.enabled);
    assert_eq!(config.refinement.endpoint, "http://localhost:8080/json/");
    assert_eq!(config.refine_delay(), Duration::from_millis(250));
    assert_eq!(config.geo_timeout(), Some(Duration::from_secs(3)));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_from_env_ignores_unparseable_numbers() {
    clear_env();
    std::env::set_var("FOLIO_REFINE_DELAY_MS", "soon");
    std::env::set_var("FOLIO_STORAGE_ENABLED", "maybe");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.refinement.delay_ms, 1000);
    assert!(config.storage.enabled);
}

#[test]
fn test_from_file_partial() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[refinement]
endpoint = "http://127.0.0.1:9000/json/"
delay_ms = 0
timeout_secs = 5

[logging]
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.refinement.endpoint, "http://127.0.0.1:9000/json/");
    assert_eq!(config.refine_delay(), Duration::ZERO);
    assert_eq!(config.geo_timeout(), Some(Duration::from_secs(5)));
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.storage, Config::default().storage);
    config.validate().unwrap();
}

#[test]
fn test_from_file_rejects_bad_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[refinement\nendpoint = ").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_from_file_missing() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/folio.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = Config::default();
    config.refinement.endpoint = "ftp://example.com/".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.refinement.timeout_secs = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.logging.format = "yaml".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.storage.path = std::path::PathBuf::new();
    assert!(config.validate().is_err());
    config.storage.enabled = false;
    assert!(config.validate().is_ok());
}
