//! Concert management service

use chrono::{DateTime, Utc};
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::concert::{Concert, ConcertStatus, CreateConcertRequest, UpdateConcertRequest};
use crate::services::registration::promote_waitlist;
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::non_empty;
use crate::utils::logging::log_concert_action;

/// Concert service for organizers
#[derive(Clone)]
pub struct ConcertService {
    db: DatabaseService,
}

/// Publishing needs a start time that is still ahead
pub fn check_publishable(concert: &Concert, now: DateTime<Utc>) -> Result<()> {
    match concert.starts_at {
        Some(starts_at) if starts_at > now => Ok(()),
        Some(_) => Err(ConcertError::Conflict("Cannot publish a concert that has already started".to_string())),
        None => Err(ConcertError::Conflict("A start time is required before publishing".to_string())),
    }
}

fn check_capacity(capacity: Option<i32>) -> Result<()> {
    match capacity {
        Some(cap) if cap < 1 => Err(ConcertError::InvalidInput("Capacity must be at least 1".to_string())),
        _ => Ok(()),
    }
}

impl ConcertService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    async fn check_groupe(&self, groupe_id: Option<i64>) -> Result<()> {
        if let Some(id) = groupe_id {
            self.db.groupes.find_by_id(id).await?.ok_or_else(|| ConcertError::not_found("Groupe", id))?;
        }
        Ok(())
    }

    /// Create a concert in DRAFT
    pub async fn create(&self, organisateur_id: i64, request: CreateConcertRequest) -> Result<Concert> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ConcertError::InvalidInput("Title is required".to_string()));
        }
        check_capacity(request.capacity)?;
        self.check_groupe(request.groupe_id).await?;

        let concert = self
            .db
            .concerts
            .create(
                organisateur_id,
                CreateConcertRequest {
                    title,
                    description: non_empty(request.description),
                    address: non_empty(request.address),
                    city: non_empty(request.city),
                    ..request
                },
            )
            .await?;

        log_concert_action(concert.id, "created", organisateur_id, None);
        Ok(concert)
    }

    pub async fn get(&self, organisateur_id: i64, concert_id: i64) -> Result<Concert> {
        self.db.require_owned_concert(organisateur_id, concert_id).await
    }

    /// Own concerts; published ones that already started are moved to PAST first
    pub async fn list(&self, organisateur_id: i64) -> Result<Vec<Concert>> {
        let moved = self.db.concerts.mark_past(organisateur_id, Utc::now()).await?;
        if moved > 0 {
            debug!(organisateur_id, moved, "Concerts moved to PAST");
        }
        self.db.concerts.list_by_organisateur(organisateur_id).await
    }

    /// Update fields; capacity cannot drop below the confirmed seats
    pub async fn update(&self, organisateur_id: i64, concert_id: i64, request: UpdateConcertRequest) -> Result<Concert> {
        self.db.require_owned_concert(organisateur_id, concert_id).await?;

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(ConcertError::InvalidInput("Title cannot be empty".to_string()));
            }
        }
        if let Some(capacity) = request.capacity {
            check_capacity(capacity)?;
        }
        if let Some(groupe_id) = request.groupe_id {
            self.check_groupe(groupe_id).await?;
        }

        let mut tx = self.db.concerts.begin().await?;
        let current = self
            .db
            .concerts
            .lock_for_update(&mut tx, concert_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Concert", concert_id))?;

        let capacity_grows = match request.capacity {
            Some(new_capacity) => {
                let confirmed = self.db.inscriptions.confirmed_seats(&mut tx, concert_id).await?;
                if let Some(cap) = new_capacity {
                    if i64::from(cap) < confirmed {
                        return Err(ConcertError::Conflict(format!(
                            "Capacity {} is below the {} seats already confirmed",
                            cap, confirmed
                        )));
                    }
                }
                match (current.capacity, new_capacity) {
                    (Some(old), Some(new)) => new > old,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            }
            None => false,
        };

        let updated = self
            .db
            .concerts
            .update(
                &mut tx,
                concert_id,
                UpdateConcertRequest {
                    title: request.title.map(|t| t.trim().to_string()),
                    ..request
                },
            )
            .await?;

        if capacity_grows {
            promote_waitlist(&self.db, &mut tx, &updated).await?;
        }
        tx.commit().await?;

        log_concert_action(concert_id, "updated", organisateur_id, None);
        Ok(updated)
    }

    /// Move the concert through DRAFT → PUBLISHED → PAST, or cancel it
    pub async fn change_status(&self, organisateur_id: i64, concert_id: i64, status: ConcertStatus) -> Result<Concert> {
        let concert = self.db.require_owned_concert(organisateur_id, concert_id).await?;

        if !concert.status.can_transition_to(status) {
            return Err(ConcertError::InvalidStateTransition {
                from: concert.status.to_string(),
                to: status.to_string(),
            });
        }
        if status == ConcertStatus::Published {
            check_publishable(&concert, Utc::now())?;
        }

        let updated = self.db.concerts.set_status(concert_id, status).await?;
        log_concert_action(concert_id, "status_changed", organisateur_id, Some(&status.to_string()));
        Ok(updated)
    }

    /// Delete the concert and its registrations
    pub async fn delete(&self, organisateur_id: i64, concert_id: i64) -> Result<()> {
        self.db.require_owned_concert(organisateur_id, concert_id).await?;
        self.db.concerts.delete(concert_id).await?;
        log_concert_action(concert_id, "deleted", organisateur_id, None);
        Ok(())
    }
}
