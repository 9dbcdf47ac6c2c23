//! Unit tests for configuration module

use printssistant_backend::config::Settings;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 3000);
    assert!(!settings.auth.enabled);
    assert!(settings.rate_limit.enabled);
    assert_eq!(settings.rate_limit.requests_per_second, 20);
    assert_eq!(settings.rate_limit.burst_size, 40);
    assert_eq!(settings.dashboard.recent_limit, 50);
    assert_eq!(settings.canva.api_base, "https://api.canva.com");
    assert_eq!(settings.canva.prod_host_markers, vec!["vercel.app", "printssistant"]);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_load_from_yaml_file() {
    let file = config_file(
        ".yaml",
        r#"
server:
  host: "127.0.0.1"
  port: 8088
auth:
  enabled: true
  api_keys: ["dashboard-key"]
rate_limit:
  requests_per_second: 5
  burst_size: 10
dashboard:
  recent_limit: 25
  title: "Shop Floor"
canva:
  redirect_uri_prod: "https://printssistant.example/api/canva/callback"
"#,
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.bind_address(), "127.0.0.1:8088");
    assert!(settings.auth.enabled);
    assert_eq!(settings.auth.api_keys, vec!["dashboard-key"]);
    assert_eq!(settings.rate_limit.requests_per_second, 5);
    assert_eq!(settings.dashboard.recent_limit, 25);
    assert_eq!(settings.dashboard.title, "Shop Floor");
    assert_eq!(
        settings.canva.redirect_uri_prod.as_deref(),
        Some("https://printssistant.example/api/canva/callback")
    );
    // Untouched sections keep their defaults
    assert_eq!(settings.server.request_timeout_secs, 30);
    assert_eq!(settings.canva.auth_path, "/api/rest/v1/oauth/authorize");
}

#[test]
fn test_load_from_toml_file() {
    let file = config_file(
        ".toml",
        r#"
[server]
port = 9099

[logging]
format = "pretty"
"#,
    );

    let settings = Settings::load_from_path(file.path()).unwrap();
    assert_eq!(settings.server.port, 9099);
    assert_eq!(settings.logging.format, "pretty");
}

#[test]
fn test_missing_file_uses_defaults() {
    let settings = Settings::load_from_path("does/not/exist.yaml").unwrap();
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.database.max_connections, 10);
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let file = config_file(
        ".yaml",
        r#"
auth:
  enabled: true
  api_keys: []
"#,
    );
    assert!(Settings::load_from_path(file.path()).is_err());

    let file = config_file(".yaml", "server:\n  port: 0\n");
    assert!(Settings::load_from_path(file.path()).is_err());
}

#[test]
fn test_settings_validation() {
    let mut settings = Settings::default();
    settings.rate_limit.burst_size = 0;
    assert!(settings.validate().is_err());

    settings.rate_limit.enabled = false;
    assert!(settings.validate().is_ok());

    settings.canva.prod_host_markers = vec![" ".to_string()];
    assert!(settings.validate().is_err());
}
