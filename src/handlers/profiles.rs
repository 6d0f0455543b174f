//! Own profiles, public group pages, search and reviews

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use crate::middleware::{CurrentOrganisateur, CurrentUser};
use crate::models::groupe::{Groupe, GroupeSearchQuery, GroupeSearchResult, UpsertGroupeRequest};
use crate::models::organisateur::{Organisateur, UpsertOrganisateurRequest};
use crate::models::review::{CreateReviewRequest, Review, ReviewList};
use crate::state::AppState;
use crate::utils::errors::Result;
use super::extract::{Json, Path, Query};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me/groupe", get(get_own_groupe).put(upsert_groupe))
        .route("/api/me/organisateur", get(get_own_organisateur).put(upsert_organisateur))
        .route("/api/groupes", get(search))
        .route("/api/groupes/{id}", get(get_groupe))
        .route("/api/groupes/{id}/reviews", get(list_reviews).post(create_review))
}

/// GET /api/me/groupe
async fn get_own_groupe(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Groupe>> {
    Ok(Json(state.services.profile_service.get_own_groupe(&user).await?))
}

/// PUT /api/me/groupe
async fn upsert_groupe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpsertGroupeRequest>,
) -> Result<Json<Groupe>> {
    Ok(Json(state.services.profile_service.upsert_groupe(&user, payload).await?))
}

/// GET /api/me/organisateur
async fn get_own_organisateur(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Organisateur>> {
    Ok(Json(state.services.profile_service.get_own_organisateur(&user).await?))
}

/// PUT /api/me/organisateur
async fn upsert_organisateur(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpsertOrganisateurRequest>,
) -> Result<Json<Organisateur>> {
    Ok(Json(state.services.profile_service.upsert_organisateur(&user, payload).await?))
}

/// GET /api/groupes?lat=&lng=&radius_km=&genre=&q=&limit=
async fn search(State(state): State<AppState>, Query(query): Query<GroupeSearchQuery>) -> Result<Json<Vec<GroupeSearchResult>>> {
    Ok(Json(state.services.profile_service.search(query).await?))
}

/// GET /api/groupes/{id}
async fn get_groupe(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Groupe>> {
    Ok(Json(state.services.profile_service.get_public_groupe(id).await?))
}

/// GET /api/groupes/{id}/reviews
async fn list_reviews(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ReviewList>> {
    Ok(Json(state.services.review_service.list(id).await?))
}

/// POST /api/groupes/{id}/reviews
async fn create_review(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state
        .services
        .review_service
        .create(current.organisateur.id, id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
