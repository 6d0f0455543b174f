//! Test context: database, application state and router in one place

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use concert_chaussettes::create_router;
use concert_chaussettes::database::DatabaseService;
use concert_chaussettes::models::concert::{Concert, ConcertStatus};
use concert_chaussettes::models::groupe::{Groupe, UpsertGroupeRequest};
use concert_chaussettes::models::organisateur::{Organisateur, UpsertOrganisateurRequest};
use concert_chaussettes::models::user::{UpsertUserRequest, User, UserRole};
use concert_chaussettes::AppState;
use super::{concert_request, test_settings, TestDatabase};

/// State over a pool that never connects, for paths rejected before storage
pub fn lazy_state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/unused")
        .expect("Failed to build lazy pool");
    AppState::new(test_settings(), DatabaseService::new(pool)).expect("Failed to build state")
}

pub struct TestContext {
    pub database: TestDatabase,
    pub state: AppState,
}

impl TestContext {
    /// `None` when no test database is configured
    pub async fn new() -> Option<Self> {
        let database = TestDatabase::connect().await?;
        let state = AppState::new(test_settings(), DatabaseService::new(database.pool.clone()))
            .expect("Failed to build state");
        Some(Self { database, state })
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn user(&self, subject: &str, role: UserRole) -> User {
        self.state
            .services
            .user_service
            .provision(UpsertUserRequest {
                external_id: subject.to_string(),
                email: format!("{}@example.com", subject),
                display_name: Some(subject.to_string()),
                role,
            })
            .await
            .expect("Failed to provision user")
    }

    /// Provisioned organizer with a profile
    pub async fn organisateur(&self, subject: &str) -> Organisateur {
        let user = self.user(subject, UserRole::Organisateur).await;

        self.state
            .db
            .organisateurs
            .upsert_for_user(
                user.id,
                UpsertOrganisateurRequest {
                    name: format!("Salon {}", subject),
                    city: Some("Lyon".to_string()),
                    phone: None,
                },
            )
            .await
            .expect("Failed to create organizer profile")
    }

    /// Published group profile owned by a new GROUPE user
    pub async fn groupe(&self, subject: &str, name: &str, location: Option<(f64, f64)>, genres: &[&str]) -> (User, Groupe) {
        let user = self.user(subject, UserRole::Groupe).await;
        let groupe = self
            .state
            .services
            .profile_service
            .upsert_groupe(
                &user,
                UpsertGroupeRequest {
                    name: name.to_string(),
                    genres: genres.iter().map(|g| g.to_string()).collect(),
                    latitude: location.map(|l| l.0),
                    longitude: location.map(|l| l.1),
                    is_published: true,
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to create group profile");
        (user, groupe)
    }

    /// Concert owned by `organisateur_id`, already published
    pub async fn published_concert(&self, organisateur_id: i64, capacity: Option<i32>) -> Concert {
        let concerts = &self.state.services.concert_service;
        let concert = concerts
            .create(organisateur_id, concert_request("Concert au salon", capacity))
            .await
            .expect("Failed to create concert");
        concerts
            .change_status(organisateur_id, concert.id, ConcertStatus::Published)
            .await
            .expect("Failed to publish concert")
    }
}
