//! Concert repository implementation

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use chrono::{DateTime, Utc};
use crate::models::concert::{Concert, ConcertStatus, CreateConcertRequest, UpdateConcertRequest};
use crate::utils::errors::ConcertError;

const CONCERT_COLUMNS: &str = "id, organisateur_id, groupe_id, title, description, starts_at, address, city, capacity, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ConcertRepository {
    pool: PgPool,
}

impl ConcertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a transaction on the underlying pool
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, ConcertError> {
        Ok(self.pool.begin().await?)
    }

    /// Create a new concert in DRAFT
    pub async fn create(&self, organisateur_id: i64, request: CreateConcertRequest) -> Result<Concert, ConcertError> {
        let concert = sqlx::query_as::<_, Concert>(&format!(
            r#"
            INSERT INTO concerts (organisateur_id, groupe_id, title, description, starts_at, address, city, capacity, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'DRAFT')
            RETURNING {CONCERT_COLUMNS}
            "#
        ))
        .bind(organisateur_id)
        .bind(request.groupe_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.starts_at)
        .bind(request.address)
        .bind(request.city)
        .bind(request.capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(concert)
    }

    /// Find concert by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Concert>, ConcertError> {
        let concert = sqlx::query_as::<_, Concert>(&format!("SELECT {CONCERT_COLUMNS} FROM concerts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(concert)
    }

    /// Read the concert and hold its row lock until the transaction ends.
    ///
    /// Every seat-changing operation takes this lock first, which serialises
    /// capacity checks per concert.
    pub async fn lock_for_update(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Concert>, ConcertError> {
        let concert = sqlx::query_as::<_, Concert>(&format!(
            "SELECT {CONCERT_COLUMNS} FROM concerts WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(concert)
    }

    /// Update concert fields; `None` keeps the current value
    pub async fn update(&self, conn: &mut PgConnection, id: i64, request: UpdateConcertRequest) -> Result<Concert, ConcertError> {
        let concert = sqlx::query_as::<_, Concert>(&format!(
            r#"
            UPDATE concerts
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                capacity = CASE WHEN $7 THEN $8 ELSE capacity END,
                groupe_id = CASE WHEN $9 THEN $10 ELSE groupe_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CONCERT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.starts_at)
        .bind(request.address)
        .bind(request.city)
        .bind(request.capacity.is_some())
        .bind(request.capacity.flatten())
        .bind(request.groupe_id.is_some())
        .bind(request.groupe_id.flatten())
        .fetch_one(conn)
        .await?;

        Ok(concert)
    }

    /// Set the concert status
    pub async fn set_status(&self, id: i64, status: ConcertStatus) -> Result<Concert, ConcertError> {
        let concert = sqlx::query_as::<_, Concert>(&format!(
            "UPDATE concerts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {CONCERT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(concert)
    }

    /// Delete concert; its reviews are kept without the concert link.
    ///
    /// A review whose author already has an unlinked review of the same group
    /// would collide once detached, so that one goes with the concert.
    pub async fn delete(&self, id: i64) -> Result<(), ConcertError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM reviews r
            WHERE r.concert_id = $1
              AND EXISTS (
                  SELECT 1 FROM reviews o
                  WHERE o.organisateur_id = r.organisateur_id
                    AND o.groupe_id = r.groupe_id
                    AND o.concert_id IS NULL
              )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM concerts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Concerts of an organizer, soonest first, undated last
    pub async fn list_by_organisateur(&self, organisateur_id: i64) -> Result<Vec<Concert>, ConcertError> {
        let concerts = sqlx::query_as::<_, Concert>(&format!(
            "SELECT {CONCERT_COLUMNS} FROM concerts WHERE organisateur_id = $1 ORDER BY starts_at ASC NULLS LAST, id ASC"
        ))
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(concerts)
    }

    /// Move an organizer's published concerts that already started to PAST
    pub async fn mark_past(&self, organisateur_id: i64, now: DateTime<Utc>) -> Result<u64, ConcertError> {
        let result = sqlx::query(
            r#"
            UPDATE concerts
            SET status = 'PAST', updated_at = NOW()
            WHERE organisateur_id = $1 AND status = 'PUBLISHED' AND starts_at IS NOT NULL AND starts_at < $2
            "#
        )
        .bind(organisateur_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
