//! Concert model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "concert_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcertStatus {
    Draft,
    Published,
    Cancelled,
    Past,
}

impl ConcertStatus {
    pub fn can_transition_to(self, next: ConcertStatus) -> bool {
        use ConcertStatus::*;
        matches!(
            (self, next),
            (Draft, Published) | (Draft, Cancelled) | (Published, Cancelled) | (Published, Past)
        )
    }

    /// Visible on the public registration page
    pub fn is_public(self) -> bool {
        matches!(self, ConcertStatus::Published | ConcertStatus::Past)
    }
}

impl fmt::Display for ConcertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConcertStatus::Draft => "DRAFT",
            ConcertStatus::Published => "PUBLISHED",
            ConcertStatus::Cancelled => "CANCELLED",
            ConcertStatus::Past => "PAST",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Concert {
    pub id: i64,
    pub organisateur_id: i64,
    pub groupe_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// `None` means unlimited
    pub capacity: Option<i32>,
    pub status: ConcertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConcertRequest {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<i32>,
    pub groupe_id: Option<i64>,
}

/// Partial update; `capacity` and `groupe_id` distinguish "absent" from "set to null"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConcertRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(default, with = "double_option")]
    pub capacity: Option<Option<i32>>,
    #[serde(default, with = "double_option")]
    pub groupe_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeConcertStatusRequest {
    pub status: ConcertStatus,
}

/// Seat accounting shown on the public registration page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcertSummary {
    pub concert: Concert,
    pub confirmed_seats: i64,
    /// `None` when the concert has no capacity limit
    pub remaining_seats: Option<i64>,
    pub waitlist_count: i64,
    pub public_guests: Vec<String>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use ConcertStatus::*;
        assert!(Draft.can_transition_to(Published));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Published.can_transition_to(Past));
        assert!(!Published.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Published));
        assert!(!Past.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn test_update_request_distinguishes_null_capacity() {
        let absent: UpdateConcertRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.capacity, None);

        let cleared: UpdateConcertRequest = serde_json::from_str(r#"{"capacity":null}"#).unwrap();
        assert_eq!(cleared.capacity, Some(None));

        let set: UpdateConcertRequest = serde_json::from_str(r#"{"capacity":40}"#).unwrap();
        assert_eq!(set.capacity, Some(Some(40)));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&ConcertStatus::Published).unwrap(), "\"PUBLISHED\"");
        assert_eq!(ConcertStatus::Cancelled.to_string(), "CANCELLED");
    }
}
