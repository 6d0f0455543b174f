//! Review repository implementation

use sqlx::PgPool;
use crate::models::review::{Review, CreateReviewRequest};
use crate::utils::errors::ConcertError;

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review; a second review for the same triple is a conflict
    pub async fn create(&self, groupe_id: i64, organisateur_id: i64, request: CreateReviewRequest) -> Result<Review, ConcertError> {
        let result = sqlx::query_as::<_, Review>(
            r#"
            WITH inserted AS (
                INSERT INTO reviews (groupe_id, organisateur_id, concert_id, rating, comment)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT i.id, i.groupe_id, i.organisateur_id, o.name AS organisateur_name,
                   i.concert_id, i.rating, i.comment, i.created_at
            FROM inserted i
            JOIN organisateurs o ON o.id = i.organisateur_id
            "#
        )
        .bind(groupe_id)
        .bind(organisateur_id)
        .bind(request.concert_id)
        .bind(request.rating)
        .bind(request.comment)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(review) => Ok(review),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(ConcertError::Conflict(
                "This group has already been reviewed for this concert".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Reviews of a group, newest first
    pub async fn list_by_groupe(&self, groupe_id: i64) -> Result<Vec<Review>, ConcertError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.id, r.groupe_id, r.organisateur_id, o.name AS organisateur_name,
                   r.concert_id, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN organisateurs o ON o.id = r.organisateur_id
            WHERE r.groupe_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            "#
        )
        .bind(groupe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
