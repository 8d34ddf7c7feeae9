pub mod connection_questions;
pub mod dating_style;
pub mod generation_guard;
pub mod life_vision;
pub mod openrouter;

use thiserror::Error;

/// Failure modes shared by the three assessment flows. The server maps
/// these onto HTTP statuses; dependency failures of the narrative
/// generator never surface here because the generators recover with a
/// deterministic fallback.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("not found")]
    NotFound,
    #[error("resource belongs to another user")]
    Forbidden,
    #[error("assessment already completed")]
    AlreadyCompleted,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("a generation for this user is already in progress")]
    GenerationInProgress,
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
}
