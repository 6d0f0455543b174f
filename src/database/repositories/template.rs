//! Message template repository implementation

use sqlx::PgPool;
use crate::models::template::{MessageTemplate, CreateTemplateRequest, UpdateTemplateRequest};
use crate::utils::errors::ConcertError;

const TEMPLATE_COLUMNS: &str = "id, organisateur_id, name, channel, subject, body, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, organisateur_id: i64, request: CreateTemplateRequest) -> Result<MessageTemplate, ConcertError> {
        let template = sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            INSERT INTO message_templates (organisateur_id, name, channel, subject, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(organisateur_id)
        .bind(request.name)
        .bind(request.channel)
        .bind(request.subject)
        .bind(request.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(template)
    }

    /// Find a template owned by the organizer
    pub async fn find(&self, organisateur_id: i64, id: i64) -> Result<Option<MessageTemplate>, ConcertError> {
        let template = sqlx::query_as::<_, MessageTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates WHERE id = $1 AND organisateur_id = $2"
        ))
        .bind(id)
        .bind(organisateur_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn list_by_organisateur(&self, organisateur_id: i64) -> Result<Vec<MessageTemplate>, ConcertError> {
        let templates = sqlx::query_as::<_, MessageTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates WHERE organisateur_id = $1 ORDER BY name ASC, id ASC"
        ))
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn update(&self, organisateur_id: i64, id: i64, request: UpdateTemplateRequest) -> Result<Option<MessageTemplate>, ConcertError> {
        let template = sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            UPDATE message_templates
            SET name = COALESCE($3, name),
                subject = CASE WHEN $4::TEXT IS NULL THEN subject ELSE NULLIF($4, '') END,
                body = COALESCE($5, body),
                updated_at = NOW()
            WHERE id = $1 AND organisateur_id = $2
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(organisateur_id)
        .bind(request.name)
        .bind(request.subject)
        .bind(request.body)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn delete(&self, organisateur_id: i64, id: i64) -> Result<bool, ConcertError> {
        let result = sqlx::query("DELETE FROM message_templates WHERE id = $1 AND organisateur_id = $2")
            .bind(id)
            .bind(organisateur_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
