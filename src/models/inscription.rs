//! Inscription (guest registration) model and seat allocation rules

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InscriptionStatus {
    Confirmed,
    Waitlisted,
    Cancelled,
}

impl fmt::Display for InscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InscriptionStatus::Confirmed => "CONFIRMED",
            InscriptionStatus::Waitlisted => "WAITLISTED",
            InscriptionStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inscription {
    pub id: i64,
    pub concert_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub party_size: i32,
    pub status: InscriptionStatus,
    #[serde(skip_serializing, default)]
    pub management_token: String,
    pub is_visible: bool,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInscriptionRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub party_size: i32,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    pub message: Option<String>,
}

fn default_visible() -> bool {
    true
}

/// Guest self-service edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInscriptionRequest {
    pub name: Option<String>,
    /// Absent keeps the phone, blank clears it
    pub phone: Option<String>,
    pub party_size: Option<i32>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeInscriptionStatusRequest {
    pub status: InscriptionStatus,
}

/// Query string carrying the guest's management token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementTokenQuery {
    #[serde(default)]
    pub token: String,
}

/// Returned once, at creation: the only time the management token leaves the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InscriptionReceipt {
    pub inscription: Inscription,
    pub management_token: String,
    pub management_url: String,
}

/// Status for a new registration of `requested` seats.
///
/// Unlimited concerts always confirm; otherwise the party is confirmed only
/// if it fits entirely in the remaining seats. A full concert never rejects.
pub fn decide_status(capacity: Option<i32>, confirmed_seats: i64, requested: i32) -> InscriptionStatus {
    match capacity {
        None => InscriptionStatus::Confirmed,
        Some(cap) if confirmed_seats + i64::from(requested) <= i64::from(cap) => InscriptionStatus::Confirmed,
        Some(_) => InscriptionStatus::Waitlisted,
    }
}

/// Waitlisted registrations to confirm, given waitlist entries as
/// `(id, party_size)` in registration order.
///
/// Entries are walked in order and each one that still fits is confirmed, so
/// a large party at the head does not block smaller ones behind it.
pub fn plan_promotions(capacity: Option<i32>, confirmed_seats: i64, waitlist: &[(i64, i32)]) -> Vec<i64> {
    let mut promoted = Vec::new();
    let mut seats = confirmed_seats;
    for &(id, party_size) in waitlist {
        if decide_status(capacity, seats, party_size) == InscriptionStatus::Confirmed {
            seats += i64::from(party_size);
            promoted.push(id);
        }
    }
    promoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_third_guest_is_waitlisted_when_two_seats_taken() {
        assert_eq!(decide_status(Some(2), 2, 1), InscriptionStatus::Waitlisted);
    }

    #[test]
    fn test_exact_fit_is_confirmed() {
        assert_eq!(decide_status(Some(10), 7, 3), InscriptionStatus::Confirmed);
        assert_eq!(decide_status(Some(10), 8, 3), InscriptionStatus::Waitlisted);
    }

    #[test]
    fn test_unlimited_capacity_always_confirms() {
        assert_eq!(decide_status(None, 10_000, 10), InscriptionStatus::Confirmed);
    }

    #[test]
    fn test_plan_promotions_skips_parties_that_do_not_fit() {
        let waitlist = [(1, 4), (2, 1), (3, 2), (4, 1)];
        assert_eq!(plan_promotions(Some(10), 7, &waitlist), vec![2, 3]);
    }

    #[test]
    fn test_plan_promotions_unlimited_promotes_everyone() {
        let waitlist = [(5, 10), (6, 10)];
        assert_eq!(plan_promotions(None, 500, &waitlist), vec![5, 6]);
    }

    #[test]
    fn test_management_token_not_serialized() {
        let inscription = Inscription {
            id: 1,
            concert_id: 2,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: None,
            party_size: 2,
            status: InscriptionStatus::Confirmed,
            management_token: "secret".to_string(),
            is_visible: true,
            message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&inscription).unwrap();
        assert!(!json.contains("secret"));
    }

    proptest! {
        #[test]
        fn confirmed_seats_never_exceed_capacity(
            capacity in 1i32..60,
            requests in proptest::collection::vec(1i32..=10, 0..40),
        ) {
            let mut confirmed: i64 = 0;
            for requested in requests {
                if decide_status(Some(capacity), confirmed, requested) == InscriptionStatus::Confirmed {
                    confirmed += i64::from(requested);
                }
                prop_assert!(confirmed <= i64::from(capacity));
            }
        }

        #[test]
        fn promotions_never_overbook(
            capacity in 1i32..60,
            confirmed in 0i64..60,
            sizes in proptest::collection::vec(1i32..=10, 0..20),
        ) {
            prop_assume!(confirmed <= i64::from(capacity));
            let waitlist: Vec<(i64, i32)> = sizes.iter().enumerate().map(|(i, s)| (i as i64, *s)).collect();
            let promoted = plan_promotions(Some(capacity), confirmed, &waitlist);
            let added: i64 = waitlist
                .iter()
                .filter(|(id, _)| promoted.contains(id))
                .map(|(_, s)| i64::from(*s))
                .sum();
            prop_assert!(confirmed + added <= i64::from(capacity));
        }
    }
}
