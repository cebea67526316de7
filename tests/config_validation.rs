use stackdeck::config::{ConsoleConfig, Environment, load_config};
use std::fs;
use tempfile::TempDir;

fn default_config() -> ConsoleConfig {
    serde_json::from_str("{}").unwrap()
}

#[test]
fn test_valid_default_passes() {
    assert!(default_config().validate().is_ok());
}

#[test]
fn test_zero_timeout_rejected() {
    let mut config = default_config();
    config.http.timeout_ms = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("timeoutMs"));
}

#[test]
fn test_excessive_retries_rejected() {
    let mut config = default_config();
    config.http.max_retries = 50;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("maxRetries"));
    assert!(err.is_validation_error());
}

#[test]
fn test_ten_retries_allowed() {
    let mut config = default_config();
    config.http.max_retries = 10;
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_full_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "http": { "baseUrl": "http://127.0.0.1:3021/", "retry": false },
            "environment": "development",
            "cookies": "csrf_token=abc%3D%3D"
        }"#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert!(!config.http.retry);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.http.retry_policy().effective_max_retries(None, None), 0);
}

#[test]
fn test_unknown_environment_rejected_in_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(&path, r#"{"environment": "staging"}"#).unwrap();
    assert!(load_config(Some(&path)).is_err());
}
