use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

/// GET /api/health
/// Liveness plus a database round-trip.
pub async fn health(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<&'static str>>, ApiError> {
    sqlx_ping(&state).await?;
    Ok(ResponseJson(ApiResponse::success("ok")))
}

async fn sqlx_ping(state: &AppState) -> Result<(), ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .map_err(services::services::AssessmentError::from)?;
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
