//! Quote request (devis) service

use chrono::Utc;
use tracing::info;
use crate::database::DatabaseService;
use crate::models::devis::{CreateDevisRequest, Devis, DevisParty, DevisStatus};
use crate::models::user::{User, UserRole};
use crate::utils::errors::{ConcertError, Result};

/// Devis service
#[derive(Clone)]
pub struct DevisService {
    db: DatabaseService,
}

impl DevisService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Send a quote request to a published group
    pub async fn create(&self, organisateur_id: i64, request: CreateDevisRequest) -> Result<Devis> {
        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(ConcertError::InvalidInput("Message is required".to_string()));
        }
        if request.budget.is_some_and(|b| b < 0) {
            return Err(ConcertError::InvalidInput("Budget cannot be negative".to_string()));
        }
        if request.event_date <= Utc::now() {
            return Err(ConcertError::InvalidInput("Event date must be in the future".to_string()));
        }

        self.db
            .groupes
            .find_by_id(request.groupe_id)
            .await?
            .filter(|g| g.is_published)
            .ok_or_else(|| ConcertError::not_found("Groupe", request.groupe_id))?;
        if let Some(concert_id) = request.concert_id {
            self.db.require_owned_concert(organisateur_id, concert_id).await?;
        }

        let devis = self.db.devis.create(organisateur_id, CreateDevisRequest { message, ..request }).await?;
        info!(devis_id = devis.id, organisateur_id, groupe_id = devis.groupe_id, "Quote request sent");
        Ok(devis)
    }

    /// Outgoing requests for organizers, incoming ones for groups
    pub async fn list(&self, user: &User) -> Result<Vec<Devis>> {
        match user.role {
            UserRole::Organisateur => {
                let organisateur = self.db.require_organisateur(user.id).await?;
                self.db.devis.list_for_organisateur(organisateur.id).await
            }
            UserRole::Groupe => {
                let groupe = self.db.require_groupe(user.id).await?;
                self.db.devis.list_for_groupe(groupe.id).await
            }
            UserRole::Admin => Err(ConcertError::PermissionDenied("Quote requests belong to organizers and groups".to_string())),
        }
    }

    /// Accept, decline or cancel a pending request on behalf of the caller
    pub async fn transition(&self, user: &User, devis_id: i64, next: DevisStatus) -> Result<Devis> {
        let devis = self
            .db
            .devis
            .find_by_id(devis_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Devis", devis_id))?;

        let party = match user.role {
            UserRole::Organisateur => {
                let organisateur = self.db.require_organisateur(user.id).await?;
                (organisateur.id == devis.organisateur_id).then_some(DevisParty::Organisateur)
            }
            UserRole::Groupe => {
                let groupe = self.db.require_groupe(user.id).await?;
                (groupe.id == devis.groupe_id).then_some(DevisParty::Groupe)
            }
            UserRole::Admin => None,
        }
        .ok_or_else(|| ConcertError::not_found("Devis", devis_id))?;

        if !devis.status.can_transition(next, party) {
            return Err(ConcertError::InvalidStateTransition {
                from: devis.status.to_string(),
                to: next.to_string(),
            });
        }

        let updated = self
            .db
            .devis
            .transition(devis_id, devis.status, next)
            .await?
            .ok_or_else(|| ConcertError::Conflict("The quote request changed in the meantime".to_string()))?;
        info!(devis_id, status = %next, "Quote request updated");
        Ok(updated)
    }
}
