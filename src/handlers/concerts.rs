//! Organizer concert management, guest list and invitations

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use crate::middleware::CurrentOrganisateur;
use crate::models::concert::{ChangeConcertStatusRequest, Concert, CreateConcertRequest, UpdateConcertRequest};
use crate::models::inscription::{ChangeInscriptionStatusRequest, Inscription};
use crate::models::template::{InvitationRequest, RenderedInvitation};
use crate::state::AppState;
use crate::utils::errors::Result;
use super::csv_attachment;
use super::extract::{Json, Path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/concerts", get(list).post(create))
        .route("/api/concerts/{id}", get(get_one).put(update).delete(delete))
        .route("/api/concerts/{id}/status", post(change_status))
        .route("/api/concerts/{id}/inscriptions", get(list_inscriptions))
        .route("/api/concerts/{id}/inscriptions.csv", get(export_inscriptions))
        .route("/api/concerts/{id}/inscriptions/{iid}", put(change_inscription_status).delete(delete_inscription))
        .route("/api/concerts/{id}/invitations", post(render_invitations))
}

/// GET /api/concerts
async fn list(State(state): State<AppState>, current: CurrentOrganisateur) -> Result<Json<Vec<Concert>>> {
    Ok(Json(state.services.concert_service.list(current.organisateur.id).await?))
}

/// POST /api/concerts
async fn create(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Json(payload): Json<CreateConcertRequest>,
) -> Result<(StatusCode, Json<Concert>)> {
    let concert = state.services.concert_service.create(current.organisateur.id, payload).await?;
    Ok((StatusCode::CREATED, Json(concert)))
}

/// GET /api/concerts/{id}
async fn get_one(State(state): State<AppState>, current: CurrentOrganisateur, Path(id): Path<i64>) -> Result<Json<Concert>> {
    Ok(Json(state.services.concert_service.get(current.organisateur.id, id).await?))
}

/// PUT /api/concerts/{id}
async fn update(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateConcertRequest>,
) -> Result<Json<Concert>> {
    Ok(Json(state.services.concert_service.update(current.organisateur.id, id, payload).await?))
}

/// DELETE /api/concerts/{id}
async fn delete(State(state): State<AppState>, current: CurrentOrganisateur, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.concert_service.delete(current.organisateur.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/concerts/{id}/status
async fn change_status(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
    Json(payload): Json<ChangeConcertStatusRequest>,
) -> Result<Json<Concert>> {
    let concert = state
        .services
        .concert_service
        .change_status(current.organisateur.id, id, payload.status)
        .await?;
    Ok(Json(concert))
}

/// GET /api/concerts/{id}/inscriptions
async fn list_inscriptions(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Inscription>>> {
    let inscriptions = state
        .services
        .registration_service
        .list_for_organisateur(current.organisateur.id, id)
        .await?;
    Ok(Json(inscriptions))
}

/// GET /api/concerts/{id}/inscriptions.csv
async fn export_inscriptions(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse> {
    let body = state
        .services
        .registration_service
        .export_csv(current.organisateur.id, id)
        .await?;
    Ok(csv_attachment(&format!("inscriptions-{}.csv", id), body))
}

/// PUT /api/concerts/{id}/inscriptions/{iid}
async fn change_inscription_status(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path((id, iid)): Path<(i64, i64)>,
    Json(payload): Json<ChangeInscriptionStatusRequest>,
) -> Result<Json<Inscription>> {
    let inscription = state
        .services
        .registration_service
        .change_status(current.organisateur.id, id, iid, payload.status)
        .await?;
    Ok(Json(inscription))
}

/// DELETE /api/concerts/{id}/inscriptions/{iid}
async fn delete_inscription(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path((id, iid)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state
        .services
        .registration_service
        .delete(current.organisateur.id, id, iid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/concerts/{id}/invitations
async fn render_invitations(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
    Json(payload): Json<InvitationRequest>,
) -> Result<Json<Vec<RenderedInvitation>>> {
    let rendered = state
        .services
        .invitation_service
        .render(current.organisateur.id, id, payload)
        .await?;
    Ok(Json(rendered))
}
