//! Inscription repository implementation
//!
//! Seat-changing queries take a `&mut PgConnection` so the caller can run
//! them inside the transaction that holds the concert row lock.

use sqlx::{PgConnection, PgPool};
use crate::models::inscription::{Inscription, InscriptionStatus, CreateInscriptionRequest, UpdateInscriptionRequest};
use crate::utils::errors::ConcertError;

const INSCRIPTION_COLUMNS: &str = "id, concert_id, name, email, phone, party_size, status, management_token, is_visible, message, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct InscriptionRepository {
    pool: PgPool,
}

impl InscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a registration with an already decided status
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        concert_id: i64,
        request: CreateInscriptionRequest,
        status: InscriptionStatus,
        management_token: &str,
    ) -> Result<Inscription, ConcertError> {
        let inscription = sqlx::query_as::<_, Inscription>(&format!(
            r#"
            INSERT INTO inscriptions (concert_id, name, email, phone, party_size, status, management_token, is_visible, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INSCRIPTION_COLUMNS}
            "#
        ))
        .bind(concert_id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.party_size)
        .bind(status)
        .bind(management_token)
        .bind(request.is_visible)
        .bind(request.message)
        .fetch_one(conn)
        .await?;

        Ok(inscription)
    }

    /// Find inscription by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Inscription>, ConcertError> {
        let inscription = sqlx::query_as::<_, Inscription>(&format!(
            "SELECT {INSCRIPTION_COLUMNS} FROM inscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inscription)
    }

    /// Re-read an inscription under lock
    pub async fn find_for_update(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Inscription>, ConcertError> {
        let inscription = sqlx::query_as::<_, Inscription>(&format!(
            "SELECT {INSCRIPTION_COLUMNS} FROM inscriptions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(inscription)
    }

    /// Sum of party sizes of CONFIRMED registrations
    pub async fn confirmed_seats(&self, conn: &mut PgConnection, concert_id: i64) -> Result<i64, ConcertError> {
        let seats: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(party_size), 0)::BIGINT FROM inscriptions WHERE concert_id = $1 AND status = 'CONFIRMED'"
        )
        .bind(concert_id)
        .fetch_one(conn)
        .await?;

        Ok(seats)
    }

    /// Waitlist as `(id, party_size)` in registration order
    pub async fn waitlist(&self, conn: &mut PgConnection, concert_id: i64) -> Result<Vec<(i64, i32)>, ConcertError> {
        let rows: Vec<(i64, i32)> = sqlx::query_as(
            r#"
            SELECT id, party_size FROM inscriptions
            WHERE concert_id = $1 AND status = 'WAITLISTED'
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(concert_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    /// Set the status of several inscriptions at once
    pub async fn set_status_many(&self, conn: &mut PgConnection, ids: &[i64], status: InscriptionStatus) -> Result<u64, ConcertError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("UPDATE inscriptions SET status = $2, updated_at = NOW() WHERE id = ANY($1)")
            .bind(ids)
            .bind(status)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Set the status of one inscription
    pub async fn set_status(&self, conn: &mut PgConnection, id: i64, status: InscriptionStatus) -> Result<Inscription, ConcertError> {
        let inscription = sqlx::query_as::<_, Inscription>(&format!(
            "UPDATE inscriptions SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {INSCRIPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await?;

        Ok(inscription)
    }

    /// Apply a guest edit; `None` keeps the current value
    pub async fn update_fields(&self, conn: &mut PgConnection, id: i64, request: UpdateInscriptionRequest) -> Result<Inscription, ConcertError> {
        let inscription = sqlx::query_as::<_, Inscription>(&format!(
            r#"
            UPDATE inscriptions
            SET name = COALESCE($2, name),
                phone = CASE WHEN $3::TEXT IS NULL THEN phone ELSE NULLIF($3, '') END,
                party_size = COALESCE($4, party_size),
                is_visible = COALESCE($5, is_visible),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INSCRIPTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.phone)
        .bind(request.party_size)
        .bind(request.is_visible)
        .fetch_one(conn)
        .await?;

        Ok(inscription)
    }

    /// Hard delete
    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), ConcertError> {
        sqlx::query("DELETE FROM inscriptions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// All registrations of a concert in registration order
    pub async fn list_for_concert(&self, concert_id: i64) -> Result<Vec<Inscription>, ConcertError> {
        let inscriptions = sqlx::query_as::<_, Inscription>(&format!(
            "SELECT {INSCRIPTION_COLUMNS} FROM inscriptions WHERE concert_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(concert_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(inscriptions)
    }

    /// Confirmed seats and waitlist length, outside any transaction
    pub async fn seat_counts(&self, concert_id: i64) -> Result<(i64, i64), ConcertError> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(party_size) FILTER (WHERE status = 'CONFIRMED'), 0)::BIGINT,
                COUNT(*) FILTER (WHERE status = 'WAITLISTED')
            FROM inscriptions
            WHERE concert_id = $1
            "#
        )
        .bind(concert_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Names shown on the public guest list
    pub async fn public_guest_names(&self, concert_id: i64) -> Result<Vec<String>, ConcertError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM inscriptions
            WHERE concert_id = $1 AND status = 'CONFIRMED' AND is_visible = true
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(concert_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
