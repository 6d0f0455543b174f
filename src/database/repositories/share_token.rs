//! Share token repository implementation

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use chrono::{DateTime, Utc};
use crate::models::share_token::ShareToken;
use crate::utils::errors::ConcertError;

const SHARE_TOKEN_COLUMNS: &str = "id, organisateur_id, token, expires_at, max_uses, used_count, revoked, created_at";

#[derive(Debug, Clone)]
pub struct ShareTokenRepository {
    pool: PgPool,
}

impl ShareTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, ConcertError> {
        Ok(self.pool.begin().await?)
    }

    /// Store a freshly generated token
    pub async fn create(
        &self,
        organisateur_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        max_uses: Option<i32>,
    ) -> Result<ShareToken, ConcertError> {
        let share_token = sqlx::query_as::<_, ShareToken>(&format!(
            r#"
            INSERT INTO share_tokens (organisateur_id, token, expires_at, max_uses)
            VALUES ($1, $2, $3, $4)
            RETURNING {SHARE_TOKEN_COLUMNS}
            "#
        ))
        .bind(organisateur_id)
        .bind(token)
        .bind(expires_at)
        .bind(max_uses)
        .fetch_one(&self.pool)
        .await?;

        Ok(share_token)
    }

    /// Tokens of an organizer, newest first
    pub async fn list_by_organisateur(&self, organisateur_id: i64) -> Result<Vec<ShareToken>, ConcertError> {
        let tokens = sqlx::query_as::<_, ShareToken>(&format!(
            "SELECT {SHARE_TOKEN_COLUMNS} FROM share_tokens WHERE organisateur_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<ShareToken>, ConcertError> {
        let share_token = sqlx::query_as::<_, ShareToken>(&format!(
            "SELECT {SHARE_TOKEN_COLUMNS} FROM share_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(share_token)
    }

    /// Revoke a token owned by the organizer
    pub async fn revoke(&self, organisateur_id: i64, id: i64) -> Result<Option<ShareToken>, ConcertError> {
        let share_token = sqlx::query_as::<_, ShareToken>(&format!(
            r#"
            UPDATE share_tokens SET revoked = true
            WHERE id = $1 AND organisateur_id = $2
            RETURNING {SHARE_TOKEN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(organisateur_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(share_token)
    }

    /// Take one use of the token if it is still usable at `now`.
    ///
    /// The usability test and the increment are one statement, so two
    /// concurrent imports can never both take the last use.
    pub async fn consume(&self, conn: &mut PgConnection, id: i64, now: DateTime<Utc>) -> Result<Option<ShareToken>, ConcertError> {
        let share_token = sqlx::query_as::<_, ShareToken>(&format!(
            r#"
            UPDATE share_tokens
            SET used_count = used_count + 1
            WHERE id = $1
              AND revoked = false
              AND expires_at > $2
              AND (max_uses IS NULL OR used_count < max_uses)
            RETURNING {SHARE_TOKEN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(share_token)
    }

    /// Emails of the token owner's contact book
    pub async fn owner_emails(&self, organisateur_id: i64) -> Result<Vec<String>, ConcertError> {
        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT email FROM contacts WHERE organisateur_id = $1 ORDER BY LOWER(email) ASC"
        )
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }
}
