//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Concert Chaussettes service.

use tracing::{info, warn, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{ConcertError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard must be held for the lifetime of the process when a
/// log file is configured, otherwise buffered lines are lost on exit.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},tower_http=info", config.level)));

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "concert-chaussettes.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConcertError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log concert management actions
pub fn log_concert_action(concert_id: i64, action: &str, organisateur_id: i64, details: Option<&str>) {
    info!(
        concert_id = concert_id,
        action = action,
        organisateur_id = organisateur_id,
        details = details,
        "Concert action performed"
    );
}

/// Log registration intake and self-service changes
pub fn log_registration(concert_id: i64, inscription_id: i64, action: &str, status: &str, party_size: i32) {
    info!(
        concert_id = concert_id,
        inscription_id = inscription_id,
        action = action,
        status = status,
        party_size = party_size,
        "Registration updated"
    );
}

/// Log waitlist promotions
pub fn log_promotions(concert_id: i64, promoted: &[i64]) {
    if promoted.is_empty() {
        debug!(concert_id = concert_id, "Waitlist pass promoted nobody");
    } else {
        info!(
            concert_id = concert_id,
            promoted = ?promoted,
            "Waitlisted registrations promoted"
        );
    }
}

/// Log contact share token usage
pub fn log_share_token_use(token_id: i64, owner_id: i64, action: &str, accepted: bool, reason: Option<&str>) {
    if accepted {
        info!(
            token_id = token_id,
            owner_id = owner_id,
            action = action,
            "Share token used"
        );
    } else {
        warn!(
            token_id = token_id,
            owner_id = owner_id,
            action = action,
            reason = reason,
            "Share token refused"
        );
    }
}

/// Log bulk contact imports
pub fn log_contact_import(organisateur_id: i64, source: &str, imported: usize, skipped: usize) {
    info!(
        organisateur_id = organisateur_id,
        source = source,
        imported = imported,
        skipped = skipped,
        "Contacts imported"
    );
}
