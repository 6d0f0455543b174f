//! HTTP handlers module
//!
//! Routes are grouped by resource:
//! - Health probes
//! - Profiles, group search and reviews
//! - Organizer concerts, guest lists and invitations
//! - Guest-facing registration and share previews
//! - Contacts, imports and share tokens
//! - Message templates and quote requests

pub mod concerts;
pub mod contacts;
pub mod extract;
pub mod health;
pub mod profiles;
pub mod public;
pub mod templates;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use crate::middleware::logging::log_requests;
use crate::state::AppState;

/// Assemble the full API router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .merge(health::router())
        .merge(profiles::router())
        .merge(concerts::router())
        .merge(public::router(&state))
        .merge(contacts::router())
        .merge(templates::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(log_requests)),
        )
        .with_state(state)
}

/// CORS from configured origins; `*` or an empty list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// CSV download response
pub(crate) fn csv_attachment(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
}
