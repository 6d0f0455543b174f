//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub registration: RegistrationConfig,
    pub sharing: SharingConfig,
    pub rate_limit: RateLimitConfig,
    pub geocoding: GeocodingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the web front, used to build registration and management links
    pub public_base_url: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Bearer token verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    pub issuer: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the rolling log file; stdout only when unset
    pub file_path: Option<String>,
    pub json: bool,
}

/// Guest registration limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    pub max_party_size: i32,
    pub token_length: usize,
}

/// Contact share token defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SharingConfig {
    pub default_expiry_hours: i64,
    pub max_expiry_hours: i64,
    pub token_length: usize,
}

/// Public endpoint rate limiting
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    pub burst: u32,
}

/// Address geocoding API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific configuration file (extension optional)
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CONCERT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ConcertError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                public_base_url: "http://localhost:3000".to_string(),
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/concert_chaussettes".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                issuer: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
            registration: RegistrationConfig {
                max_party_size: 10,
                token_length: 32,
            },
            sharing: SharingConfig {
                default_expiry_hours: 72,
                max_expiry_hours: 24 * 30,
                token_length: 24,
            },
            rate_limit: RateLimitConfig {
                per_minute: 20,
                burst: 5,
            },
            geocoding: GeocodingConfig {
                enabled: false,
                api_url: "https://api-adresse.data.gouv.fr".to_string(),
                timeout_seconds: 5,
            },
        }
    }
}
