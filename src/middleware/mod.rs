//! Middleware module
//!
//! This module contains middleware for request processing

pub mod auth;
pub mod logging;
pub mod rate_limit;

// Re-export commonly used middleware
pub use auth::{Claims, CurrentOrganisateur, CurrentUser, JwtVerifier};
pub use rate_limit::{build_limiter, limit_by_ip, spawn_pruning, IpRateLimiter};
