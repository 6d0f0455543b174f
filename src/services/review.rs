//! Group review service

use crate::database::DatabaseService;
use crate::models::review::{CreateReviewRequest, Review, ReviewList};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::non_empty;

const MAX_COMMENT_CHARS: usize = 2000;

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    db: DatabaseService,
}

pub fn validate_review(request: CreateReviewRequest) -> Result<CreateReviewRequest> {
    if !(1..=5).contains(&request.rating) {
        return Err(ConcertError::InvalidInput("Rating must be between 1 and 5".to_string()));
    }
    let comment = non_empty(request.comment);
    if comment.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS) {
        return Err(ConcertError::InvalidInput(format!("Comment is limited to {} characters", MAX_COMMENT_CHARS)));
    }
    Ok(CreateReviewRequest { comment, ..request })
}

/// Mean rating, `None` without reviews
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    Some(sum as f64 / reviews.len() as f64)
}

impl ReviewService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Review a group, optionally for one of the organizer's concerts it played
    pub async fn create(&self, organisateur_id: i64, groupe_id: i64, request: CreateReviewRequest) -> Result<Review> {
        let request = validate_review(request)?;
        self.db
            .groupes
            .find_by_id(groupe_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Groupe", groupe_id))?;

        if let Some(concert_id) = request.concert_id {
            let concert = self.db.require_owned_concert(organisateur_id, concert_id).await?;
            if concert.groupe_id != Some(groupe_id) {
                return Err(ConcertError::InvalidInput(format!(
                    "Concert {} was not played by group {}",
                    concert_id, groupe_id
                )));
            }
        }

        self.db.reviews.create(groupe_id, organisateur_id, request).await
    }

    pub async fn list(&self, groupe_id: i64) -> Result<ReviewList> {
        let reviews = self.db.reviews.list_by_groupe(groupe_id).await?;
        Ok(ReviewList {
            groupe_id,
            average_rating: average_rating(&reviews),
            review_count: reviews.len(),
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn review(rating: i16) -> Review {
        Review {
            id: 1,
            groupe_id: 1,
            organisateur_id: 1,
            organisateur_name: "Salon Dupont".to_string(),
            concert_id: None,
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rating_bounds() {
        let make = |rating| CreateReviewRequest { rating, comment: None, concert_id: None };
        assert!(validate_review(make(1)).is_ok());
        assert!(validate_review(make(5)).is_ok());
        assert_matches!(validate_review(make(0)), Err(ConcertError::InvalidInput(_)));
        assert_matches!(validate_review(make(6)), Err(ConcertError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_comment_is_dropped() {
        let validated = validate_review(CreateReviewRequest { rating: 4, comment: Some("  ".to_string()), concert_id: None }).unwrap();
        assert_eq!(validated.comment, None);
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(5), review(4), review(3)]), Some(4.0));
    }
}
