//! Organisateur repository implementation

use sqlx::PgPool;
use crate::models::organisateur::{Organisateur, UpsertOrganisateurRequest};
use crate::utils::errors::ConcertError;

const ORGANISATEUR_COLUMNS: &str = "id, user_id, name, city, phone, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct OrganisateurRepository {
    pool: PgPool,
}

impl OrganisateurRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or replace the profile owned by a user
    pub async fn upsert_for_user(&self, user_id: i64, request: UpsertOrganisateurRequest) -> Result<Organisateur, ConcertError> {
        let organisateur = sqlx::query_as::<_, Organisateur>(&format!(
            r#"
            INSERT INTO organisateurs (user_id, name, city, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET name = EXCLUDED.name,
                city = EXCLUDED.city,
                phone = EXCLUDED.phone,
                updated_at = NOW()
            RETURNING {ORGANISATEUR_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(request.name)
        .bind(request.city)
        .bind(request.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(organisateur)
    }

    /// Find organizer by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Organisateur>, ConcertError> {
        let organisateur = sqlx::query_as::<_, Organisateur>(&format!(
            "SELECT {ORGANISATEUR_COLUMNS} FROM organisateurs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organisateur)
    }

    /// Find the profile owned by a user
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Organisateur>, ConcertError> {
        let organisateur = sqlx::query_as::<_, Organisateur>(&format!(
            "SELECT {ORGANISATEUR_COLUMNS} FROM organisateurs WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organisateur)
    }
}
