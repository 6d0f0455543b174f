//! Authentication middleware
//!
//! Bearer tokens are HS256 JWTs issued by the identity provider. The
//! extractors verify the token, provision the user on first sight and
//! enforce the role a route needs.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::settings::AuthConfig;
use crate::models::organisateur::Organisateur;
use crate::models::user::{UpsertUserRequest, User, UserRole};
use crate::state::AppState;
use crate::utils::errors::{ConcertError, Result};

/// Claims expected in the identity provider's token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: UserRole,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    fn into_upsert(self) -> UpsertUserRequest {
        UpsertUserRequest {
            external_id: self.sub,
            email: self.email.trim().to_lowercase(),
            display_name: self.name,
            role: self.role,
        }
    }
}

/// Token verifier built from the auth settings
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Sign claims with the shared secret, as the identity provider does
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

fn bearer_token(parts: &Parts) -> Result<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ConcertError::Authentication("Missing bearer token".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConcertError::Authentication("Malformed authorization header".to_string()))
}

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ConcertError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let claims = state.jwt.verify(bearer_token(parts)?).map_err(|e| {
            warn!(uri = %parts.uri, error = %e, "Rejected bearer token");
            e
        })?;
        let user = state.services.user_service.provision(claims.into_upsert()).await?;
        debug!(user_id = user.id, "Request authenticated");

        let current = CurrentUser(user);
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Authenticated user holding the organizer role and profile
#[derive(Debug, Clone)]
pub struct CurrentOrganisateur {
    pub user: User,
    pub organisateur: Organisateur,
}

impl FromRequestParts<AppState> for CurrentOrganisateur {
    type Rejection = ConcertError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Organisateur {
            return Err(ConcertError::PermissionDenied("Organizer role required".to_string()));
        }
        let organisateur = state.db.require_organisateur(user.id).await?;
        Ok(Self { user, organisateur })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config(issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "0123456789abcdef0123".to_string(),
            issuer: issuer.map(str::to_string),
        }
    }

    fn claims(exp_offset: i64, iss: Option<&str>) -> Claims {
        Claims {
            sub: "auth0|42".to_string(),
            email: "Orga@Example.com".to_string(),
            name: Some("Orga".to_string()),
            role: UserRole::Organisateur,
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iss: iss.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_token_round_trip() {
        let token = issue_token("0123456789abcdef0123", &claims(3600, None)).unwrap();
        let verified = JwtVerifier::new(&config(None)).verify(&token).unwrap();
        assert_eq!(verified.sub, "auth0|42");
        assert_eq!(verified.role, UserRole::Organisateur);
        assert_eq!(verified.into_upsert().email, "orga@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("0123456789abcdef0123", &claims(-3600, None)).unwrap();
        assert_matches!(JwtVerifier::new(&config(None)).verify(&token), Err(ConcertError::Jwt(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("another-secret-entirely", &claims(3600, None)).unwrap();
        assert_matches!(JwtVerifier::new(&config(None)).verify(&token), Err(ConcertError::Jwt(_)));
    }

    #[test]
    fn test_issuer_enforced_when_configured() {
        let verifier = JwtVerifier::new(&config(Some("https://id.example.fr/")));
        let wrong = issue_token("0123456789abcdef0123", &claims(3600, Some("https://evil.example/"))).unwrap();
        assert_matches!(verifier.verify(&wrong), Err(ConcertError::Jwt(_)));

        let right = issue_token("0123456789abcdef0123", &claims(3600, Some("https://id.example.fr/"))).unwrap();
        assert!(verifier.verify(&right).is_ok());
    }
}
