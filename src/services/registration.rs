//! Guest registration service
//!
//! Handles registration intake with capacity and waitlist decisions, guest
//! self-service through the management token, and the organizer's guest
//! list actions. Every operation that changes confirmed seats runs in a
//! transaction holding the concert row lock.

use sqlx::PgConnection;
use tracing::{debug, info};
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::concert::{Concert, ConcertStatus, ConcertSummary};
use crate::models::inscription::{
    decide_status, plan_promotions, CreateInscriptionRequest, Inscription, InscriptionReceipt, InscriptionStatus,
    UpdateInscriptionRequest,
};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::{constant_time_eq, generate_random_string, is_valid_email, is_valid_phone, non_empty, public_link};
use crate::utils::logging::{log_promotions, log_registration};

/// Confirm waitlisted registrations that now fit, in registration order.
///
/// Must run on a connection whose transaction already holds the concert lock.
pub(crate) async fn promote_waitlist(db: &DatabaseService, conn: &mut PgConnection, concert: &Concert) -> Result<Vec<i64>> {
    if concert.status != ConcertStatus::Published {
        return Ok(Vec::new());
    }

    let confirmed = db.inscriptions.confirmed_seats(&mut *conn, concert.id).await?;
    let waitlist = db.inscriptions.waitlist(&mut *conn, concert.id).await?;
    let promoted = plan_promotions(concert.capacity, confirmed, &waitlist);

    db.inscriptions
        .set_status_many(&mut *conn, &promoted, InscriptionStatus::Confirmed)
        .await?;
    log_promotions(concert.id, &promoted);

    Ok(promoted)
}

/// Registration service
#[derive(Clone)]
pub struct RegistrationService {
    db: DatabaseService,
    settings: Settings,
}

impl RegistrationService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    /// Check and normalise a submission before touching storage
    pub fn validate_request(&self, request: CreateInscriptionRequest) -> Result<CreateInscriptionRequest> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ConcertError::InvalidInput("Name is required".to_string()));
        }

        let email = request.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ConcertError::InvalidInput(format!("Invalid email address: {}", request.email)));
        }

        self.check_party_size(request.party_size)?;

        // A blank phone clears the stored one.
        let phone = request.phone.map(|p| p.trim().to_string());
        if let Some(phone) = phone.as_deref().filter(|p| !p.is_empty()) {
            if !is_valid_phone(phone) {
                return Err(ConcertError::InvalidInput(format!("Invalid phone number: {}", phone)));
            }
        }

        Ok(CreateInscriptionRequest {
            name,
            email,
            phone,
            party_size: request.party_size,
            is_visible: request.is_visible,
            message: non_empty(request.message),
        })
    }

    fn check_party_size(&self, party_size: i32) -> Result<()> {
        let max = self.settings.registration.max_party_size;
        if !(1..=max).contains(&party_size) {
            return Err(ConcertError::InvalidInput(format!("Party size must be between 1 and {}", max)));
        }
        Ok(())
    }

    fn management_url(&self, inscription_id: i64, token: &str) -> Result<String> {
        let mut url = public_link(&self.settings.server.public_base_url, &format!("inscriptions/{}", inscription_id))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.to_string())
    }

    /// Register a party for a published concert.
    ///
    /// The party is confirmed when it fits in the remaining seats and
    /// waitlisted otherwise; a full concert never rejects.
    pub async fn register(&self, concert_id: i64, request: CreateInscriptionRequest) -> Result<InscriptionReceipt> {
        let request = self.validate_request(request)?;
        let token = generate_random_string(self.settings.registration.token_length);

        let mut tx = self.db.concerts.begin().await?;
        let concert = self
            .db
            .concerts
            .lock_for_update(&mut tx, concert_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Concert", concert_id))?;

        if concert.status != ConcertStatus::Published {
            return Err(ConcertError::Conflict(format!(
                "Concert {} is not open for registration ({})",
                concert_id, concert.status
            )));
        }

        let confirmed = self.db.inscriptions.confirmed_seats(&mut tx, concert_id).await?;
        let status = decide_status(concert.capacity, confirmed, request.party_size);
        debug!(concert_id, confirmed, requested = request.party_size, status = %status, "Registration decision");

        let inscription = self.db.inscriptions.insert(&mut tx, concert_id, request, status, &token).await?;
        tx.commit().await?;

        log_registration(concert_id, inscription.id, "created", &status.to_string(), inscription.party_size);

        let management_url = self.management_url(inscription.id, &token)?;
        Ok(InscriptionReceipt {
            inscription,
            management_token: token,
            management_url,
        })
    }

    /// Seat accounting and visible guest names for the public page
    pub async fn public_summary(&self, concert_id: i64) -> Result<ConcertSummary> {
        let concert = self
            .db
            .concerts
            .find_by_id(concert_id)
            .await?
            .filter(|c| c.status.is_public())
            .ok_or_else(|| ConcertError::not_found("Concert", concert_id))?;

        let (confirmed_seats, waitlist_count) = self.db.inscriptions.seat_counts(concert_id).await?;
        let public_guests = self.db.inscriptions.public_guest_names(concert_id).await?;
        let remaining_seats = concert.capacity.map(|cap| (i64::from(cap) - confirmed_seats).max(0));

        Ok(ConcertSummary {
            concert,
            confirmed_seats,
            remaining_seats,
            waitlist_count,
            public_guests,
        })
    }

    /// Registration matching both id and management token; anything else is not found
    async fn find_with_token(&self, inscription_id: i64, token: &str) -> Result<Inscription> {
        if token.is_empty() {
            return Err(ConcertError::not_found("Inscription", inscription_id));
        }
        match self.db.inscriptions.find_by_id(inscription_id).await? {
            Some(inscription) if constant_time_eq(&inscription.management_token, token) => Ok(inscription),
            _ => Err(ConcertError::not_found("Inscription", inscription_id)),
        }
    }

    pub async fn get_for_guest(&self, inscription_id: i64, token: &str) -> Result<Inscription> {
        self.find_with_token(inscription_id, token).await
    }

    /// Guest edit of name, phone, party size or visibility
    pub async fn edit_for_guest(&self, inscription_id: i64, token: &str, request: UpdateInscriptionRequest) -> Result<Inscription> {
        let existing = self.find_with_token(inscription_id, token).await?;

        let name = match request.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ConcertError::InvalidInput("Name cannot be empty".to_string()));
            }
            other => other.map(|n| n.trim().to_string()),
        };
        // A blank phone clears the stored one.
        let phone = request.phone.map(|p| p.trim().to_string());
        if let Some(phone) = phone.as_deref().filter(|p| !p.is_empty()) {
            if !is_valid_phone(phone) {
                return Err(ConcertError::InvalidInput(format!("Invalid phone number: {}", phone)));
            }
        }
        if let Some(size) = request.party_size {
            self.check_party_size(size)?;
        }

        let mut tx = self.db.concerts.begin().await?;
        let concert = self
            .db
            .concerts
            .lock_for_update(&mut tx, existing.concert_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Concert", existing.concert_id))?;
        let current = self
            .db
            .inscriptions
            .find_for_update(&mut tx, inscription_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Inscription", inscription_id))?;

        if concert.status != ConcertStatus::Published {
            return Err(ConcertError::Conflict(format!("Concert {} can no longer be changed ({})", concert.id, concert.status)));
        }
        if current.status == InscriptionStatus::Cancelled {
            return Err(ConcertError::Conflict("A cancelled registration cannot be edited".to_string()));
        }

        let new_size = request.party_size.unwrap_or(current.party_size);
        if current.status == InscriptionStatus::Confirmed && new_size > current.party_size {
            let others = self.db.inscriptions.confirmed_seats(&mut tx, concert.id).await? - i64::from(current.party_size);
            if decide_status(concert.capacity, others, new_size) != InscriptionStatus::Confirmed {
                return Err(ConcertError::Conflict("Not enough seats left for a larger party".to_string()));
            }
        }

        let updated = self
            .db
            .inscriptions
            .update_fields(
                &mut tx,
                inscription_id,
                UpdateInscriptionRequest {
                    name,
                    phone,
                    party_size: request.party_size,
                    is_visible: request.is_visible,
                },
            )
            .await?;

        if current.status == InscriptionStatus::Confirmed && new_size < current.party_size {
            promote_waitlist(&self.db, &mut tx, &concert).await?;
        }
        tx.commit().await?;

        log_registration(concert.id, inscription_id, "edited", &updated.status.to_string(), updated.party_size);
        Ok(updated)
    }

    /// Guest cancellation; cancelling twice returns the cancelled registration
    pub async fn cancel_for_guest(&self, inscription_id: i64, token: &str) -> Result<Inscription> {
        let existing = self.find_with_token(inscription_id, token).await?;
        if existing.status == InscriptionStatus::Cancelled {
            return Ok(existing);
        }

        self.apply_status(existing.concert_id, inscription_id, InscriptionStatus::Cancelled, "cancelled_by_guest")
            .await
    }

    /// Guest list of an owned concert, in registration order
    pub async fn list_for_organisateur(&self, organisateur_id: i64, concert_id: i64) -> Result<Vec<Inscription>> {
        self.db.require_owned_concert(organisateur_id, concert_id).await?;
        self.db.inscriptions.list_for_concert(concert_id).await
    }

    pub async fn export_csv(&self, organisateur_id: i64, concert_id: i64) -> Result<String> {
        let inscriptions = self.list_for_organisateur(organisateur_id, concert_id).await?;
        Ok(crate::import::inscriptions_to_csv(&inscriptions))
    }

    /// Organizer status change; confirming beyond capacity is refused
    pub async fn change_status(
        &self,
        organisateur_id: i64,
        concert_id: i64,
        inscription_id: i64,
        status: InscriptionStatus,
    ) -> Result<Inscription> {
        self.db.require_owned_concert(organisateur_id, concert_id).await?;
        self.apply_status(concert_id, inscription_id, status, "status_changed_by_organizer").await
    }

    async fn apply_status(&self, concert_id: i64, inscription_id: i64, status: InscriptionStatus, action: &str) -> Result<Inscription> {
        let mut tx = self.db.concerts.begin().await?;
        let concert = self
            .db
            .concerts
            .lock_for_update(&mut tx, concert_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Concert", concert_id))?;
        let current = self
            .db
            .inscriptions
            .find_for_update(&mut tx, inscription_id)
            .await?
            .filter(|i| i.concert_id == concert_id)
            .ok_or_else(|| ConcertError::not_found("Inscription", inscription_id))?;

        if current.status == status {
            return Ok(current);
        }

        if status == InscriptionStatus::Confirmed {
            let confirmed = self.db.inscriptions.confirmed_seats(&mut tx, concert_id).await?;
            if decide_status(concert.capacity, confirmed, current.party_size) != InscriptionStatus::Confirmed {
                return Err(ConcertError::Conflict("Confirming this registration would exceed capacity".to_string()));
            }
        }

        let updated = self.db.inscriptions.set_status(&mut tx, inscription_id, status).await?;
        if current.status == InscriptionStatus::Confirmed && status == InscriptionStatus::Cancelled {
            promote_waitlist(&self.db, &mut tx, &concert).await?;
        }
        tx.commit().await?;

        log_registration(concert_id, inscription_id, action, &status.to_string(), updated.party_size);
        Ok(updated)
    }

    /// Hard delete by the organizer; freed seats go to the waitlist
    pub async fn delete(&self, organisateur_id: i64, concert_id: i64, inscription_id: i64) -> Result<()> {
        self.db.require_owned_concert(organisateur_id, concert_id).await?;

        let mut tx = self.db.concerts.begin().await?;
        let concert = self
            .db
            .concerts
            .lock_for_update(&mut tx, concert_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Concert", concert_id))?;
        let current = self
            .db
            .inscriptions
            .find_for_update(&mut tx, inscription_id)
            .await?
            .filter(|i| i.concert_id == concert_id)
            .ok_or_else(|| ConcertError::not_found("Inscription", inscription_id))?;

        self.db.inscriptions.delete(&mut tx, inscription_id).await?;
        if current.status == InscriptionStatus::Confirmed {
            promote_waitlist(&self.db, &mut tx, &concert).await?;
        }
        tx.commit().await?;

        info!(concert_id, inscription_id, "Registration deleted by organizer");
        log_registration(concert_id, inscription_id, "deleted", &current.status.to_string(), current.party_size);
        Ok(())
    }
}
