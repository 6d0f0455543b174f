//! Concert Chaussettes
//!
//! Backend of a marketplace connecting private-concert organizers with
//! performing groups. This library provides the HTTP API, guest
//! registration with capacity and waitlist handling, contact book imports
//! and sharing, group profiles and search, reviews, invitations and quote
//! requests.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod import;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ConcertError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::create_router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
