use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::AssessmentError;
use tracing::error;
use utils::{auth::AuthError, response::ApiResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error("subscription tier '{0}' required")]
    TierRequired(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::TierRequired(_) => StatusCode::FORBIDDEN,
            Self::Assessment(e) => match e {
                AssessmentError::NotFound => StatusCode::NOT_FOUND,
                AssessmentError::Forbidden => StatusCode::FORBIDDEN,
                AssessmentError::AlreadyCompleted | AssessmentError::InvalidResponse(_) => {
                    StatusCode::BAD_REQUEST
                }
                AssessmentError::GenerationInProgress => StatusCode::CONFLICT,
                AssessmentError::Database(_) | AssessmentError::Serde(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal failures get logged server-side and a generic error on
        // the wire; debug builds attach the detail as `message`, release
        // builds never leak backend details.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "internal error while handling request");
            if cfg!(debug_assertions) {
                ApiResponse::<()>::error_with_message("internal server error", self.to_string())
            } else {
                ApiResponse::<()>::error("internal server error")
            }
        } else {
            ApiResponse::<()>::error(self.to_string())
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_errors_map_to_expected_statuses() {
        let cases = [
            (AssessmentError::NotFound, StatusCode::NOT_FOUND),
            (AssessmentError::Forbidden, StatusCode::FORBIDDEN),
            (
                AssessmentError::AlreadyCompleted,
                StatusCode::BAD_REQUEST,
            ),
            (
                AssessmentError::InvalidResponse("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AssessmentError::GenerationInProgress,
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::Assessment(err).status(), status);
        }
    }

    #[tokio::test]
    async fn internal_errors_use_a_generic_envelope() {
        let response = ApiError::Assessment(AssessmentError::Database(sqlx::Error::PoolClosed))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "internal server error");
        // debug builds carry the detail in `message`
        if cfg!(debug_assertions) {
            assert!(json["message"].is_string());
        }
    }

    #[test]
    fn auth_and_tier_failures_map_to_401_and_403() {
        assert_eq!(
            ApiError::Auth(AuthError::MissingToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::TierRequired("transformatie").status(),
            StatusCode::FORBIDDEN
        );
    }
}
