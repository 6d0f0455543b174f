//! Guest-facing endpoints: no account, a management token at most

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use crate::middleware::limit_by_ip;
use crate::models::concert::ConcertSummary;
use crate::models::inscription::{
    CreateInscriptionRequest, Inscription, InscriptionReceipt, ManagementTokenQuery, UpdateInscriptionRequest,
};
use crate::models::share_token::SharePreview;
use crate::state::AppState;
use crate::utils::errors::Result;
use super::extract::{Json, Path, Query};

pub fn router(state: &AppState) -> Router<AppState> {
    let limited = Router::new()
        .route("/api/public/concerts/{id}/inscriptions", post(register))
        .route("/api/share/{token}", get(share_preview))
        .route_layer(from_fn_with_state(state.rate_limiter.clone(), limit_by_ip));

    Router::new()
        .route("/api/public/concerts/{id}", get(concert_summary))
        .route(
            "/api/public/inscriptions/{id}",
            get(get_inscription).put(edit_inscription).delete(cancel_inscription),
        )
        .merge(limited)
}

/// GET /api/public/concerts/{id}
async fn concert_summary(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ConcertSummary>> {
    Ok(Json(state.services.registration_service.public_summary(id).await?))
}

/// POST /api/public/concerts/{id}/inscriptions
async fn register(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateInscriptionRequest>,
) -> Result<(StatusCode, Json<InscriptionReceipt>)> {
    let receipt = state.services.registration_service.register(id, payload).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/public/inscriptions/{id}?token=
async fn get_inscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ManagementTokenQuery>,
) -> Result<Json<Inscription>> {
    Ok(Json(state.services.registration_service.get_for_guest(id, &query.token).await?))
}

/// PUT /api/public/inscriptions/{id}?token=
async fn edit_inscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ManagementTokenQuery>,
    Json(payload): Json<UpdateInscriptionRequest>,
) -> Result<Json<Inscription>> {
    let inscription = state
        .services
        .registration_service
        .edit_for_guest(id, &query.token, payload)
        .await?;
    Ok(Json(inscription))
}

/// DELETE /api/public/inscriptions/{id}?token=
async fn cancel_inscription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ManagementTokenQuery>,
) -> Result<Json<Inscription>> {
    Ok(Json(state.services.registration_service.cancel_for_guest(id, &query.token).await?))
}

/// GET /api/share/{token} - preview without spending a use
async fn share_preview(State(state): State<AppState>, Path(token): Path<String>) -> Result<Json<SharePreview>> {
    Ok(Json(state.services.sharing_service.preview(&token).await?))
}
