//! Services module
//!
//! This module contains business logic services

pub mod concert;
pub mod contacts;
pub mod devis;
pub mod geocoding;
pub mod invitation;
pub mod profile;
pub mod registration;
pub mod review;
pub mod sharing;
pub mod user;

// Re-export commonly used services
pub use concert::ConcertService;
pub use contacts::ContactService;
pub use devis::DevisService;
pub use geocoding::GeocodingService;
pub use invitation::InvitationService;
pub use profile::ProfileService;
pub use registration::RegistrationService;
pub use review::ReviewService;
pub use sharing::SharingService;
pub use user::UserService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub concert_service: ConcertService,
    pub registration_service: RegistrationService,
    pub contact_service: ContactService,
    pub sharing_service: SharingService,
    pub review_service: ReviewService,
    pub invitation_service: InvitationService,
    pub devis_service: DevisService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: Settings) -> Result<Self> {
        let geocoder = if settings.geocoding.enabled {
            Some(GeocodingService::new(&settings.geocoding)?)
        } else {
            None
        };

        Ok(Self {
            user_service: UserService::new(db.users.clone()),
            profile_service: ProfileService::new(db.clone(), geocoder),
            concert_service: ConcertService::new(db.clone()),
            registration_service: RegistrationService::new(db.clone(), settings.clone()),
            contact_service: ContactService::new(db.clone()),
            sharing_service: SharingService::new(db.clone(), settings.clone()),
            review_service: ReviewService::new(db.clone()),
            invitation_service: InvitationService::new(db.clone(), settings),
            devis_service: DevisService::new(db),
        })
    }
}
