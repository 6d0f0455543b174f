//! Devis repository implementation

use sqlx::PgPool;
use crate::models::devis::{Devis, DevisStatus, CreateDevisRequest};
use crate::utils::errors::ConcertError;

const DEVIS_COLUMNS: &str = "id, organisateur_id, groupe_id, concert_id, event_date, budget, message, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct DevisRepository {
    pool: PgPool,
}

impl DevisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, organisateur_id: i64, request: CreateDevisRequest) -> Result<Devis, ConcertError> {
        let devis = sqlx::query_as::<_, Devis>(&format!(
            r#"
            INSERT INTO devis (organisateur_id, groupe_id, concert_id, event_date, budget, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'PENDING')
            RETURNING {DEVIS_COLUMNS}
            "#
        ))
        .bind(organisateur_id)
        .bind(request.groupe_id)
        .bind(request.concert_id)
        .bind(request.event_date)
        .bind(request.budget)
        .bind(request.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(devis)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Devis>, ConcertError> {
        let devis = sqlx::query_as::<_, Devis>(&format!("SELECT {DEVIS_COLUMNS} FROM devis WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(devis)
    }

    /// Requests sent by an organizer
    pub async fn list_for_organisateur(&self, organisateur_id: i64) -> Result<Vec<Devis>, ConcertError> {
        let devis = sqlx::query_as::<_, Devis>(&format!(
            "SELECT {DEVIS_COLUMNS} FROM devis WHERE organisateur_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(devis)
    }

    /// Requests received by a group
    pub async fn list_for_groupe(&self, groupe_id: i64) -> Result<Vec<Devis>, ConcertError> {
        let devis = sqlx::query_as::<_, Devis>(&format!(
            "SELECT {DEVIS_COLUMNS} FROM devis WHERE groupe_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(groupe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(devis)
    }

    /// Move from `expected` to `next`; `None` when the row was no longer in `expected`
    pub async fn transition(&self, id: i64, expected: DevisStatus, next: DevisStatus) -> Result<Option<Devis>, ConcertError> {
        let devis = sqlx::query_as::<_, Devis>(&format!(
            r#"
            UPDATE devis SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {DEVIS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        Ok(devis)
    }
}
