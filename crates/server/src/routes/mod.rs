pub mod connection_questions;
pub mod dating_style;
pub mod health;
pub mod life_vision;

use axum::{Router, http::HeaderMap};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utils::auth::AuthUser;

use crate::{error::ApiError, state::AppState};

/// Resolve the authenticated user from the `Authorization` header.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    Ok(state.verifier.verify_bearer(header)?)
}

/// Same, but absence of a (valid) token is not an error.
pub fn maybe_authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.verifier.verify_bearer(header).ok()
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(dating_style::router())
        .merge(life_vision::router())
        .merge(connection_questions::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
