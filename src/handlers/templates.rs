//! Message templates and quote requests

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use crate::middleware::{CurrentOrganisateur, CurrentUser};
use crate::models::devis::{CreateDevisRequest, Devis, DevisStatus};
use crate::models::template::{CreateTemplateRequest, MessageTemplate, UpdateTemplateRequest};
use crate::state::AppState;
use crate::utils::errors::{ConcertError, Result};
use super::extract::{Json, Path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(list).post(create))
        .route("/api/templates/{id}", get(get_one).put(update).delete(remove))
        .route("/api/devis", get(list_devis).post(create_devis))
        .route("/api/devis/{id}/{action}", post(devis_action))
}

/// GET /api/templates
async fn list(State(state): State<AppState>, current: CurrentOrganisateur) -> Result<Json<Vec<MessageTemplate>>> {
    Ok(Json(state.services.invitation_service.list_templates(current.organisateur.id).await?))
}

/// POST /api/templates
async fn create(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<MessageTemplate>)> {
    let template = state
        .services
        .invitation_service
        .create_template(current.organisateur.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/templates/{id}
async fn get_one(State(state): State<AppState>, current: CurrentOrganisateur, Path(id): Path<i64>) -> Result<Json<MessageTemplate>> {
    Ok(Json(state.services.invitation_service.get_template(current.organisateur.id, id).await?))
}

/// PUT /api/templates/{id}
async fn update(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<Json<MessageTemplate>> {
    let template = state
        .services
        .invitation_service
        .update_template(current.organisateur.id, id, payload)
        .await?;
    Ok(Json(template))
}

/// DELETE /api/templates/{id}
async fn remove(State(state): State<AppState>, current: CurrentOrganisateur, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.invitation_service.delete_template(current.organisateur.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/devis - outgoing for organizers, incoming for groups
async fn list_devis(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<Devis>>> {
    Ok(Json(state.services.devis_service.list(&user).await?))
}

/// POST /api/devis
async fn create_devis(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Json(payload): Json<CreateDevisRequest>,
) -> Result<(StatusCode, Json<Devis>)> {
    let devis = state.services.devis_service.create(current.organisateur.id, payload).await?;
    Ok((StatusCode::CREATED, Json(devis)))
}

fn parse_action(action: &str) -> Result<DevisStatus> {
    match action {
        "accept" => Ok(DevisStatus::Accepted),
        "decline" => Ok(DevisStatus::Declined),
        "cancel" => Ok(DevisStatus::Cancelled),
        other => Err(ConcertError::not_found("Devis action", other)),
    }
}

/// POST /api/devis/{id}/{accept,decline,cancel}
async fn devis_action(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, action)): Path<(i64, String)>,
) -> Result<Json<Devis>> {
    let next = parse_action(&action)?;
    Ok(Json(state.services.devis_service.transition(&user, id, next).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("accept").unwrap(), DevisStatus::Accepted);
        assert_eq!(parse_action("decline").unwrap(), DevisStatus::Declined);
        assert_eq!(parse_action("cancel").unwrap(), DevisStatus::Cancelled);
        assert!(matches!(parse_action("pending"), Err(ConcertError::NotFound { .. })));
    }
}
