//! Configuration loading tests.
//!
//! These mutate process environment variables, so they run serially.

use std::fs;
use std::time::Duration;

use chatproxy::config::{
    ConfigError, ProxyConfig, DEFAULT_MODEL, ENV_ACCESS_TOKEN, ENV_ACCESS_TOKEN_FALLBACK,
    ENV_ENDPOINT, ENV_MODEL, ENV_TIMEOUT_MS, ENV_USER_AGENT,
};
use serial_test::serial;
use tempfile::TempDir;

const ALL_VARS: [&str; 6] = [
    ENV_ENDPOINT,
    ENV_ACCESS_TOKEN,
    ENV_ACCESS_TOKEN_FALLBACK,
    ENV_MODEL,
    ENV_TIMEOUT_MS,
    ENV_USER_AGENT,
];

fn clear_env() {
    for var in ALL_VARS {
        std::env::remove_var(var);
    }
}

fn write_config(temp_dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = temp_dir.path().join("config.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"{
            "endpoint": "http://file.example/api/conversation",
            "access_token": "file-token",
            "model": "file-model",
            "timeout_ms": 1000
        }"#,
    );

    std::env::set_var(ENV_ACCESS_TOKEN, "env-token");
    std::env::set_var(ENV_TIMEOUT_MS, "2000");

    let config = ProxyConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.endpoint, "http://file.example/api/conversation");
    assert_eq!(config.access_token, "env-token");
    assert_eq!(config.model, "file-model");
    assert_eq!(config.timeout, Duration::from_millis(2000));
    assert_eq!(config.user_agent, "curl");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_legacy_token_variable() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "{}");

    std::env::set_var(ENV_ACCESS_TOKEN_FALLBACK, "legacy-token");
    let config = ProxyConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.access_token, "legacy-token");
    assert_eq!(config.model, DEFAULT_MODEL);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nope.json");

    assert!(matches!(
        ProxyConfig::load(Some(&path)),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
#[serial]
fn test_invalid_timeout_variable_is_an_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "{}");

    std::env::set_var(ENV_TIMEOUT_MS, "ten seconds");
    let result = ProxyConfig::load(Some(&path));
    clear_env();

    match result {
        Err(ConfigError::InvalidValue { key, value }) => {
            assert_eq!(key, ENV_TIMEOUT_MS);
            assert_eq!(value, "ten seconds");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_missing_token_fails_validation() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, r#"{"model": "m"}"#);

    let config = ProxyConfig::load(Some(&path)).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingAccessToken)
    ));
}

#[test]
fn test_default_path_is_under_home() {
    if let Some(path) = ProxyConfig::default_path() {
        assert!(path.ends_with(".chatproxy/config.json"));
    }
}
