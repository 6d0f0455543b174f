//! Contact book model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactSource {
    Manual,
    Csv,
    Vcf,
    Share,
}

impl ContactSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactSource::Manual => "manual",
            ContactSource::Csv => "csv",
            ContactSource::Vcf => "vcf",
            ContactSource::Share => "share",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub organisateur_id: i64,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub source: ContactSource,
    pub created_at: DateTime<Utc>,
}

/// A contact parsed from a file or entered by hand, before storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Data rows seen in the file
    pub total: usize,
    pub imported: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}
