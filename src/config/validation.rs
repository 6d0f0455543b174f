//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ConcertError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_logging_config(&settings.logging)?;
    validate_registration_config(&settings.registration)?;
    validate_sharing_config(&settings.sharing)?;
    validate_rate_limit_config(&settings.rate_limit)?;

    if settings.geocoding.enabled {
        validate_geocoding_config(&settings.geocoding)?;
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ConcertError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    url::Url::parse(&config.public_base_url).map_err(|e| {
        ConcertError::Config(format!("Invalid public base URL {}: {}", config.public_base_url, e))
    })?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ConcertError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ConcertError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ConcertError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate token verification settings
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < 16 {
        return Err(ConcertError::Config(
            "JWT secret is required and must be at least 16 characters".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ConcertError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ConcertError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

fn validate_registration_config(config: &super::RegistrationConfig) -> Result<()> {
    if config.max_party_size < 1 {
        return Err(ConcertError::Config(
            "Max party size must be at least 1".to_string()
        ));
    }

    if config.token_length < 16 {
        return Err(ConcertError::Config(
            "Management token length must be at least 16".to_string()
        ));
    }

    Ok(())
}

fn validate_sharing_config(config: &super::SharingConfig) -> Result<()> {
    if config.default_expiry_hours <= 0 || config.max_expiry_hours <= 0 {
        return Err(ConcertError::Config(
            "Share token expiry windows must be positive".to_string()
        ));
    }

    if config.default_expiry_hours > config.max_expiry_hours {
        return Err(ConcertError::Config(
            "Default share expiry cannot exceed the maximum expiry".to_string()
        ));
    }

    if config.token_length < 16 {
        return Err(ConcertError::Config(
            "Share token length must be at least 16".to_string()
        ));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.per_minute == 0 {
        return Err(ConcertError::Config(
            "Rate limit must allow at least one request per minute".to_string()
        ));
    }

    Ok(())
}

/// Validate geocoding configuration
fn validate_geocoding_config(config: &super::GeocodingConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(ConcertError::Config(
            "Geocoding API URL is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(ConcertError::Config(
            "Geocoding timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "0123456789abcdef0123".to_string();
        settings
    }

    #[test]
    fn test_defaults_with_secret_are_valid() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let settings = Settings::default();
        assert!(matches!(validate_settings(&settings), Err(ConcertError::Config(_))));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_sharing_window_bounds() {
        let mut settings = valid_settings();
        settings.sharing.default_expiry_hours = settings.sharing.max_expiry_hours + 1;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_geocoding_checked_only_when_enabled() {
        let mut settings = valid_settings();
        settings.geocoding.api_url = String::new();
        assert!(validate_settings(&settings).is_ok());

        settings.geocoding.enabled = true;
        assert!(validate_settings(&settings).is_err());
    }
}
