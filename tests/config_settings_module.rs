use dataplay::config::{
    load_settings_from, ClientSettings, ConfigError, DEFAULT_API_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, ENV_API_BASE_URL, ENV_REQUEST_TIMEOUT_SECS,
};
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let state_root = dir.path().join(".dataplay");
    let loaded = load_settings_from(&state_root, &state_root.join("config.yaml"), no_env)
        .expect("load defaults");

    assert!(!loaded.config_exists);
    assert_eq!(loaded.settings, ClientSettings::default());
    assert_eq!(loaded.settings.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(
        loaded.settings.request_timeout(),
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    );
    assert_eq!(loaded.log_path(), state_root.join("logs/client.log"));
}

#[test]
fn yaml_values_are_loaded_and_normalized() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
api_base_url: "https://playground.example.com/api/"
request_timeout_secs: 30
log_path: custom/dataplay.log
"#,
    )
    .expect("write config");

    let loaded = load_settings_from(dir.path(), &config_path, no_env).expect("load");
    assert!(loaded.config_exists);
    assert_eq!(
        loaded.settings.api_base_url,
        "https://playground.example.com/api"
    );
    assert_eq!(loaded.settings.request_timeout_secs, 30);
    assert_eq!(loaded.settings.probe_timeout(), Duration::from_secs(5));
    assert_eq!(loaded.log_path(), dir.path().join("custom/dataplay.log"));
}

#[test]
fn environment_overrides_the_file() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "api_base_url: http://from-file:8000\n").expect("write config");

    let env = BTreeMap::from([
        (ENV_API_BASE_URL, "http://from-env:9000/"),
        (ENV_REQUEST_TIMEOUT_SECS, "7"),
    ]);
    let loaded = load_settings_from(dir.path(), &config_path, |key| {
        env.get(key).map(|value| value.to_string())
    })
    .expect("load");
    assert_eq!(loaded.settings.api_base_url, "http://from-env:9000");
    assert_eq!(loaded.settings.request_timeout_secs, 7);
}

#[test]
fn bad_timeout_override_names_the_variable() {
    let dir = tempdir().expect("tempdir");
    let err = load_settings_from(dir.path(), &dir.path().join("config.yaml"), |key| {
        (key == ENV_REQUEST_TIMEOUT_SECS).then(|| "soon".to_string())
    })
    .expect_err("invalid override");
    assert!(matches!(err, ConfigError::EnvOverride { .. }));
    assert!(err.to_string().contains(ENV_REQUEST_TIMEOUT_SECS));
}

#[test]
fn malformed_yaml_and_invalid_values_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");

    fs::write(&config_path, "api_base_url: [unclosed\n").expect("write config");
    let err = load_settings_from(dir.path(), &config_path, no_env).expect_err("parse error");
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");

    fs::write(&config_path, "request_timeout_secs: 0\n").expect("write config");
    let err = load_settings_from(dir.path(), &config_path, no_env).expect_err("zero timeout");
    assert!(err.to_string().contains("request_timeout_secs"), "{err}");
}

#[test]
fn empty_config_file_means_defaults() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "\n").expect("write config");
    let loaded = load_settings_from(dir.path(), &config_path, no_env).expect("load");
    assert!(loaded.config_exists);
    assert_eq!(loaded.settings, ClientSettings::default());
}
