//! Review model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub groupe_id: i64,
    pub organisateur_id: i64,
    pub organisateur_name: String,
    pub concert_id: Option<i64>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
    pub concert_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewList {
    pub groupe_id: i64,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub reviews: Vec<Review>,
}
