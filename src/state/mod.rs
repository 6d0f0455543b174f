//! Shared application state
//!
//! Everything a request handler needs, cloned cheaply into each request.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::{build_limiter, IpRateLimiter, JwtVerifier};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseService,
    pub services: Arc<ServiceFactory>,
    pub jwt: JwtVerifier,
    pub rate_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    pub fn new(settings: Settings, db: DatabaseService) -> Result<Self> {
        let services = ServiceFactory::new(db.clone(), settings.clone())?;
        let jwt = JwtVerifier::new(&settings.auth);
        let rate_limiter = build_limiter(&settings.rate_limit);

        Ok(Self {
            settings: Arc::new(settings),
            db,
            services: Arc::new(services),
            jwt,
            rate_limiter,
        })
    }
}
