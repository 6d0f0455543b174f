//! Devis (quote request) model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "devis_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DevisStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl fmt::Display for DevisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DevisStatus::Pending => "PENDING",
            DevisStatus::Accepted => "ACCEPTED",
            DevisStatus::Declined => "DECLINED",
            DevisStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Who is acting on a quote request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevisParty {
    Organisateur,
    Groupe,
}

impl DevisStatus {
    /// Only pending requests move; the group answers, the organizer withdraws
    pub fn can_transition(self, next: DevisStatus, actor: DevisParty) -> bool {
        matches!(
            (self, next, actor),
            (DevisStatus::Pending, DevisStatus::Accepted, DevisParty::Groupe)
                | (DevisStatus::Pending, DevisStatus::Declined, DevisParty::Groupe)
                | (DevisStatus::Pending, DevisStatus::Cancelled, DevisParty::Organisateur)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Devis {
    pub id: i64,
    pub organisateur_id: i64,
    pub groupe_id: i64,
    pub concert_id: Option<i64>,
    pub event_date: DateTime<Utc>,
    pub budget: Option<i32>,
    pub message: String,
    pub status: DevisStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDevisRequest {
    pub groupe_id: i64,
    pub concert_id: Option<i64>,
    pub event_date: DateTime<Utc>,
    pub budget: Option<i32>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devis_transitions() {
        assert!(DevisStatus::Pending.can_transition(DevisStatus::Accepted, DevisParty::Groupe));
        assert!(DevisStatus::Pending.can_transition(DevisStatus::Cancelled, DevisParty::Organisateur));
        assert!(!DevisStatus::Pending.can_transition(DevisStatus::Accepted, DevisParty::Organisateur));
        assert!(!DevisStatus::Accepted.can_transition(DevisStatus::Declined, DevisParty::Groupe));
        assert!(!DevisStatus::Declined.can_transition(DevisStatus::Cancelled, DevisParty::Organisateur));
    }
}
