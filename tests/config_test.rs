//! Configuration loading from files and environment

use std::io::Write;
use serial_test::serial;
use concert_chaussettes::config::Settings;

fn write_config(settings: &Settings) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    let text = toml::to_string(settings).expect("Failed to serialize settings");
    file.write_all(text.as_bytes()).expect("Failed to write config");
    file
}

#[test]
#[serial]
fn test_file_values_override_defaults() {
    let mut settings = Settings::default();
    settings.server.port = 9090;
    settings.auth.jwt_secret = "file-secret-0123456789".to_string();
    settings.sharing.default_expiry_hours = 48;
    settings.server.cors_origins = vec!["https://app.example.fr".to_string()];
    let file = write_config(&settings);

    let loaded = Settings::from_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(loaded.server.port, 9090);
    assert_eq!(loaded.sharing.default_expiry_hours, 48);
    assert_eq!(loaded.server.cors_origins, vec!["https://app.example.fr".to_string()]);
    assert!(loaded.validate().is_ok());
}

#[test]
#[serial]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[registration]\nmax_party_size = 6\ntoken_length = 40").unwrap();

    let loaded = Settings::from_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(loaded.registration.max_party_size, 6);
    assert_eq!(loaded.server.port, 8080);
    assert_eq!(loaded.rate_limit.per_minute, 20);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let mut settings = Settings::default();
    settings.server.port = 9090;
    let file = write_config(&settings);

    std::env::set_var("CONCERT__SERVER__PORT", "7070");
    std::env::set_var("CONCERT__AUTH__JWT_SECRET", "env-secret-0123456789");
    let loaded = Settings::from_file(file.path().to_str().unwrap());
    std::env::remove_var("CONCERT__SERVER__PORT");
    std::env::remove_var("CONCERT__AUTH__JWT_SECRET");

    let loaded = loaded.unwrap();
    assert_eq!(loaded.server.port, 7070);
    assert_eq!(loaded.auth.jwt_secret, "env-secret-0123456789");
}

#[test]
#[serial]
fn test_default_settings_need_a_secret() {
    assert!(Settings::default().validate().is_err());
}

#[test]
#[serial]
fn test_defaults_and_secret_from_environment_are_enough_to_start() {
    std::env::set_var("CONCERT__AUTH__JWT_SECRET", "env-secret-0123456789");
    let loaded = Settings::new();
    std::env::remove_var("CONCERT__AUTH__JWT_SECRET");

    let loaded = loaded.unwrap();
    assert!(loaded.server.cors_origins.is_empty());
    assert_eq!(loaded.server.port, 8080);
    assert!(loaded.validate().is_ok());
}
