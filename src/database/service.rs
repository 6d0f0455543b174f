//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, UserRepository, GroupeRepository, OrganisateurRepository, ConcertRepository, InscriptionRepository,
    ContactRepository, ShareTokenRepository, ReviewRepository, TemplateRepository, DevisRepository,
};
use crate::models::*;
use crate::utils::errors::ConcertError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub groupes: GroupeRepository,
    pub organisateurs: OrganisateurRepository,
    pub concerts: ConcertRepository,
    pub inscriptions: InscriptionRepository,
    pub contacts: ContactRepository,
    pub share_tokens: ShareTokenRepository,
    pub reviews: ReviewRepository,
    pub templates: TemplateRepository,
    pub devis: DevisRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groupes: GroupeRepository::new(pool.clone()),
            organisateurs: OrganisateurRepository::new(pool.clone()),
            concerts: ConcertRepository::new(pool.clone()),
            inscriptions: InscriptionRepository::new(pool.clone()),
            contacts: ContactRepository::new(pool.clone()),
            share_tokens: ShareTokenRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            templates: TemplateRepository::new(pool.clone()),
            devis: DevisRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Organizer profile of a user; 403 when the user has none
    pub async fn require_organisateur(&self, user_id: i64) -> Result<Organisateur, ConcertError> {
        self.organisateurs
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ConcertError::PermissionDenied("An organizer profile is required".to_string()))
    }

    /// Group profile of a user; 403 when the user has none
    pub async fn require_groupe(&self, user_id: i64) -> Result<Groupe, ConcertError> {
        self.groupes
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ConcertError::PermissionDenied("A group profile is required".to_string()))
    }

    /// Concert owned by the organizer.
    ///
    /// Someone else's concert answers 404 like a missing one.
    pub async fn require_owned_concert(&self, organisateur_id: i64, concert_id: i64) -> Result<Concert, ConcertError> {
        match self.concerts.find_by_id(concert_id).await? {
            Some(concert) if concert.organisateur_id == organisateur_id => Ok(concert),
            _ => Err(ConcertError::not_found("Concert", concert_id)),
        }
    }
}
