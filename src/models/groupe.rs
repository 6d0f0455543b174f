//! Groupe (performing act) model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::geo::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Groupe {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub is_published: bool,
    /// Average review rating, `None` without reviews
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Groupe {
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    /// Whether the text query matches the name, bio or city
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [Some(&self.name), self.bio.as_ref(), self.city.as_ref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertGroupeRequest {
    pub name: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Query string of the public group search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupeSearchQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub genre: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupeSearchResult {
    #[serde(flatten)]
    pub groupe: Groupe,
    pub distance_km: Option<f64>,
}
