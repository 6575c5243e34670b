use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use runwatch_app::config::{ENV_BASE_URL, ENV_SESSION_COOKIE};
use runwatch_app::{ConfigError, MonitorConfig};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = MonitorConfig::load_from(&dir.path().join("runwatch.ron")).expect("load");

    assert_eq!(config, MonitorConfig::default());
    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.session_cookie, None);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("runwatch.ron");
    fs::write(
        &path,
        r#"(api_base_url: "https://signals.example.com", request_timeout_secs: 5)"#,
    )
    .expect("write config");

    let config = MonitorConfig::load_from(&path).expect("load");
    assert_eq!(config.api_base_url, "https://signals.example.com");
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(
        config.connect_timeout_secs,
        MonitorConfig::default().connect_timeout_secs
    );

    let settings = config.client_settings();
    assert_eq!(settings.request_timeout, Duration::from_secs(5));
    assert_eq!(settings.base_url, "https://signals.example.com");
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("runwatch.ron");
    fs::write(&path, "(api_base_url: ").expect("write config");

    let err = MonitorConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
}

#[test]
fn environment_overrides_file_values() {
    let mut config = MonitorConfig {
        api_base_url: "http://from-file:8000".to_string(),
        session_cookie: Some("access_token=file".to_string()),
        ..MonitorConfig::default()
    };
    let env: HashMap<&str, &str> = HashMap::from([
        (ENV_BASE_URL, "http://from-env:9000"),
        (ENV_SESSION_COOKIE, "access_token=env"),
    ]);

    config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

    assert_eq!(config.api_base_url, "http://from-env:9000");
    assert_eq!(config.session_cookie.as_deref(), Some("access_token=env"));
}

#[test]
fn blank_environment_values_are_ignored() {
    let mut config = MonitorConfig::default();
    config.apply_overrides(|_| Some("  ".to_string()));
    assert_eq!(config, MonitorConfig::default());
}

#[test]
fn base_url_must_be_http() {
    let config = MonitorConfig {
        api_base_url: "localhost:8000".to_string(),
        ..MonitorConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBaseUrl(_))
    ));
    assert!(MonitorConfig::default().validate().is_ok());
}
