//! Error handling for Concert Chaussettes
//!
//! This module defines the main error type used throughout the application
//! and how each variant is surfaced as an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the Concert Chaussettes service
#[derive(Error, Debug)]
pub enum ConcertError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Share token no longer usable: {0}")]
    Gone(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Address geocoding specific errors
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("Geocoding API timeout")]
    Timeout,

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    #[error("No match for address: {0}")]
    NoMatch(String),
}

/// Result type alias for Concert Chaussettes operations
pub type Result<T> = std::result::Result<T, ConcertError>;

/// Result type alias for geocoding operations
pub type GeocodingResult<T> = std::result::Result<T, GeocodingError>;

impl ConcertError {
    /// Shorthand for a missing resource
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        ConcertError::NotFound { resource, id: id.to_string() }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConcertError::NotFound { .. } => StatusCode::NOT_FOUND,
            ConcertError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConcertError::Authentication(_) | ConcertError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ConcertError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ConcertError::Conflict(_) | ConcertError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            ConcertError::Gone(_) => StatusCode::GONE,
            ConcertError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ConcertError::Geocoding(_) | ConcertError::Http(_) => StatusCode::BAD_GATEWAY,
            ConcertError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConcertError::Database(sqlx::Error::RowNotFound) => ErrorSeverity::Info,
            ConcertError::Database(_) => ErrorSeverity::Critical,
            ConcertError::Migration(_) => ErrorSeverity::Critical,
            ConcertError::Config(_) => ErrorSeverity::Critical,
            ConcertError::PermissionDenied(_) => ErrorSeverity::Warning,
            ConcertError::Authentication(_) => ErrorSeverity::Warning,
            ConcertError::Jwt(_) => ErrorSeverity::Warning,
            ConcertError::RateLimitExceeded => ErrorSeverity::Warning,
            ConcertError::InvalidInput(_) => ErrorSeverity::Info,
            ConcertError::NotFound { .. } => ErrorSeverity::Info,
            ConcertError::Conflict(_) => ErrorSeverity::Info,
            ConcertError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            ConcertError::Gone(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message shown to the client; server-side failures stay generic
    fn public_message(&self) -> String {
        match self.severity() {
            ErrorSeverity::Error | ErrorSeverity::Critical => match self.status_code() {
                StatusCode::BAD_GATEWAY => "Upstream service unavailable".to_string(),
                _ => "Internal server error".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ConcertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(error = %self, status = status.as_u16(), "Request failed");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
            }
            ErrorSeverity::Info => {
                tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            }
        }

        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.public_message(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ConcertError::not_found("Concert", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ConcertError::InvalidInput("x".into()).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ConcertError::Gone("expired".into()).status_code(), StatusCode::GONE);
        assert_eq!(ConcertError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ConcertError::Config("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = ConcertError::Config("secret path /etc/x".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = ConcertError::not_found("Inscription", 42);
        assert_eq!(err.public_message(), "Inscription not found: 42");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ConcertError::RateLimitExceeded.severity().to_string(), "WARN");
        assert_eq!(ConcertError::Config("x".into()).severity(), ErrorSeverity::Critical);
    }
}
