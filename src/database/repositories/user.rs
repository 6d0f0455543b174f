//! User repository implementation

use sqlx::PgPool;
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::ConcertError;

const USER_COLUMNS: &str = "id, external_id, email, display_name, role, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the user on first sight, refresh email/name/role afterwards
    pub async fn upsert(&self, request: UpsertUserRequest) -> Result<User, ConcertError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (external_id, email, display_name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id) DO UPDATE
            SET email = EXCLUDED.email,
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                role = EXCLUDED.role,
                updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.external_id)
        .bind(request.email)
        .bind(request.display_name)
        .bind(request.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
