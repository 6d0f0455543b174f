//! Test data builders

use chrono::{Duration, Utc};
use concert_chaussettes::config::Settings;
use concert_chaussettes::middleware::auth::{issue_token, Claims};
use concert_chaussettes::models::concert::CreateConcertRequest;
use concert_chaussettes::models::inscription::CreateInscriptionRequest;
use concert_chaussettes::models::user::UserRole;

pub const TEST_JWT_SECRET: &str = "test-secret-0123456789abcdef";

/// Settings pointing at nothing external
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.server.public_base_url = "https://concerts.example.fr".to_string();
    settings.rate_limit.per_minute = 600;
    settings.rate_limit.burst = 100;
    settings.geocoding.enabled = false;
    settings
}

/// `Authorization` header value for a user of the given role
pub fn bearer(subject: &str, email: &str, role: UserRole) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        email: email.to_string(),
        name: Some(subject.to_string()),
        role,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        iss: None,
    };
    let token = issue_token(TEST_JWT_SECRET, &claims).expect("Failed to sign test token");
    format!("Bearer {}", token)
}

pub fn concert_request(title: &str, capacity: Option<i32>) -> CreateConcertRequest {
    CreateConcertRequest {
        title: title.to_string(),
        description: Some("Salon concert".to_string()),
        starts_at: Some(Utc::now() + Duration::days(14)),
        address: Some("12 rue des Lilas".to_string()),
        city: Some("Lyon".to_string()),
        capacity,
        groupe_id: None,
    }
}

pub fn inscription_request(name: &str, party_size: i32) -> CreateInscriptionRequest {
    CreateInscriptionRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: None,
        party_size,
        is_visible: true,
        message: None,
    }
}
