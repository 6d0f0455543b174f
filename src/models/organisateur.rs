//! Organisateur model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organisateur {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOrganisateurRequest {
    pub name: String,
    pub city: Option<String>,
    pub phone: Option<String>,
}
