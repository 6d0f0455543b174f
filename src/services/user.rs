//! User service implementation
//!
//! Users are provisioned from identity provider claims the first time they
//! call the API and refreshed on every later call.

use tracing::debug;
use crate::database::repositories::UserRepository;
use crate::models::user::{UpsertUserRequest, User};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::is_valid_email;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Create the user on first sight, or refresh their email, name and role
    pub async fn provision(&self, request: UpsertUserRequest) -> Result<User> {
        if request.external_id.trim().is_empty() {
            return Err(ConcertError::Authentication("Token subject is empty".to_string()));
        }
        if !is_valid_email(&request.email) {
            return Err(ConcertError::Authentication("Token email is invalid".to_string()));
        }

        let user = self.user_repository.upsert(request).await?;
        debug!(user_id = user.id, role = ?user.role, "User provisioned");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use assert_matches::assert_matches;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> UserService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .expect("lazy pool");
        UserService::new(UserRepository::new(pool))
    }

    fn request(external_id: &str, email: &str) -> UpsertUserRequest {
        UpsertUserRequest {
            external_id: external_id.to_string(),
            email: email.to_string(),
            display_name: None,
            role: UserRole::Groupe,
        }
    }

    #[tokio::test]
    async fn test_claims_are_checked_before_storage() {
        assert_matches!(service().provision(request("  ", "a@example.com")).await, Err(ConcertError::Authentication(_)));
        assert_matches!(service().provision(request("sub-1", "nope")).await, Err(ConcertError::Authentication(_)));
    }
}
