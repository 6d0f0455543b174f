//! Groupe repository implementation

use sqlx::PgPool;
use crate::models::groupe::{Groupe, UpsertGroupeRequest};
use crate::utils::errors::ConcertError;

/// Columns of `groupes g` plus the review aggregates
const GROUPE_SELECT: &str = r#"
    SELECT g.id, g.user_id, g.name, g.bio, g.genres, g.city, g.latitude, g.longitude,
           g.price_min, g.price_max, g.contact_email, g.website, g.is_published,
           (SELECT AVG(r.rating)::FLOAT8 FROM reviews r WHERE r.groupe_id = g.id) AS average_rating,
           (SELECT COUNT(*) FROM reviews r WHERE r.groupe_id = g.id) AS review_count,
           g.created_at, g.updated_at
    FROM groupes g
"#;

#[derive(Debug, Clone)]
pub struct GroupeRepository {
    pool: PgPool,
}

impl GroupeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or replace the profile owned by a user
    pub async fn upsert_for_user(&self, user_id: i64, request: UpsertGroupeRequest) -> Result<Groupe, ConcertError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO groupes (user_id, name, bio, genres, city, latitude, longitude,
                                 price_min, price_max, contact_email, website, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE
            SET name = EXCLUDED.name,
                bio = EXCLUDED.bio,
                genres = EXCLUDED.genres,
                city = EXCLUDED.city,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                price_min = EXCLUDED.price_min,
                price_max = EXCLUDED.price_max,
                contact_email = EXCLUDED.contact_email,
                website = EXCLUDED.website,
                is_published = EXCLUDED.is_published,
                updated_at = NOW()
            RETURNING id
            "#
        )
        .bind(user_id)
        .bind(request.name)
        .bind(request.bio)
        .bind(request.genres)
        .bind(request.city)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.price_min)
        .bind(request.price_max)
        .bind(request.contact_email)
        .bind(request.website)
        .bind(request.is_published)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| ConcertError::not_found("Groupe", id))
    }

    /// Find group by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Groupe>, ConcertError> {
        let groupe = sqlx::query_as::<_, Groupe>(&format!("{GROUPE_SELECT} WHERE g.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(groupe)
    }

    /// Find the profile owned by a user
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Groupe>, ConcertError> {
        let groupe = sqlx::query_as::<_, Groupe>(&format!("{GROUPE_SELECT} WHERE g.user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(groupe)
    }

    /// Published groups, optionally restricted to a genre
    pub async fn list_published(&self, genre: Option<&str>) -> Result<Vec<Groupe>, ConcertError> {
        let groupes = sqlx::query_as::<_, Groupe>(&format!(
            r#"{GROUPE_SELECT}
            WHERE g.is_published = true
              AND ($1::TEXT IS NULL OR EXISTS (SELECT 1 FROM unnest(g.genres) AS genre WHERE LOWER(genre) = LOWER($1)))
            ORDER BY g.name ASC"#
        ))
        .bind(genre)
        .fetch_all(&self.pool)
        .await?;

        Ok(groupes)
    }
}
