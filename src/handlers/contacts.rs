//! Contact book, imports and share tokens

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;
use crate::middleware::CurrentOrganisateur;
use crate::models::contact::{Contact, ImportReport, NewContact};
use crate::models::share_token::{CreateShareTokenRequest, ShareTokenView};
use crate::state::AppState;
use crate::utils::errors::Result;
use super::csv_attachment;
use super::extract::{Json, Path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contacts", get(list).post(create))
        .route("/api/contacts/{id}", delete(remove))
        .route("/api/contacts/import/csv", post(import_csv))
        .route("/api/contacts/import/vcf", post(import_vcf))
        .route("/api/contacts/export.csv", get(export_csv))
        .route("/api/share-tokens", get(list_tokens).post(create_token))
        .route("/api/share-tokens/{id}/revoke", post(revoke_token))
        .route("/api/share/{token}/import", post(import_shared))
}

/// GET /api/contacts
async fn list(State(state): State<AppState>, current: CurrentOrganisateur) -> Result<Json<Vec<Contact>>> {
    Ok(Json(state.services.contact_service.list(current.organisateur.id).await?))
}

/// POST /api/contacts
async fn create(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Json(payload): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = state.services.contact_service.create(current.organisateur.id, payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// DELETE /api/contacts/{id}
async fn remove(State(state): State<AppState>, current: CurrentOrganisateur, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.contact_service.delete(current.organisateur.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/contacts/import/csv (text body)
async fn import_csv(State(state): State<AppState>, current: CurrentOrganisateur, body: String) -> Result<Json<ImportReport>> {
    Ok(Json(state.services.contact_service.import_csv(current.organisateur.id, &body).await?))
}

/// POST /api/contacts/import/vcf (text body)
async fn import_vcf(State(state): State<AppState>, current: CurrentOrganisateur, body: String) -> Result<Json<ImportReport>> {
    Ok(Json(state.services.contact_service.import_vcf(current.organisateur.id, &body).await?))
}

/// GET /api/contacts/export.csv
async fn export_csv(State(state): State<AppState>, current: CurrentOrganisateur) -> Result<impl IntoResponse> {
    let body = state.services.contact_service.export_csv(current.organisateur.id).await?;
    Ok(csv_attachment("contacts.csv", body))
}

/// GET /api/share-tokens
async fn list_tokens(State(state): State<AppState>, current: CurrentOrganisateur) -> Result<Json<Vec<ShareTokenView>>> {
    Ok(Json(state.services.sharing_service.list(current.organisateur.id).await?))
}

/// POST /api/share-tokens
async fn create_token(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Json(payload): Json<CreateShareTokenRequest>,
) -> Result<(StatusCode, Json<ShareTokenView>)> {
    let view = state.services.sharing_service.create(current.organisateur.id, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/share-tokens/{id}/revoke
async fn revoke_token(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(id): Path<i64>,
) -> Result<Json<ShareTokenView>> {
    Ok(Json(state.services.sharing_service.revoke(current.organisateur.id, id).await?))
}

/// POST /api/share/{token}/import
async fn import_shared(
    State(state): State<AppState>,
    current: CurrentOrganisateur,
    Path(token): Path<String>,
) -> Result<Json<ImportReport>> {
    Ok(Json(state.services.sharing_service.import(&token, current.organisateur.id).await?))
}
