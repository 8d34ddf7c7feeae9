use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::connection::ConnectionSessionWithCount;
use serde::{Deserialize, Serialize};
use services::services::connection_questions::{
    AnswerOutcome, QuestionInfo, QuestionnaireInfo, SessionSummary, StartedSession,
};
use ts_rs::TS;
use utils::{auth::AuthUser, response::ApiResponse};
use uuid::Uuid;

use crate::{
    error::ApiError,
    routes::{authenticate, maybe_authenticate},
    state::AppState,
};

/// Subscription tier required for the guided 36-questions tool.
const REQUIRED_TIER: &str = "transformatie";

fn require_tier(user: &AuthUser) -> Result<(), ApiError> {
    if user.has_tier(REQUIRED_TIER) {
        Ok(())
    } else {
        Err(ApiError::TierRequired(REQUIRED_TIER))
    }
}

#[derive(Debug, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ConnectionAction {
    StartSession {
        #[serde(default)]
        partner_name: Option<String>,
    },
    GetQuestion {
        session_id: Uuid,
    },
    AnswerQuestion {
        session_id: Uuid,
        answer: String,
    },
    GetProgress {
        session_id: Uuid,
    },
    GetSessions,
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum ConnectionReply {
    Started(StartedSession),
    Question { question: QuestionInfo },
    Answered(AnswerOutcome),
    Progress { session: ConnectionSessionWithCount },
    Sessions { sessions: Vec<SessionSummary> },
}

/// POST /api/connection-questions
/// All actions require authentication and the paid tier.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(action): axum::Json<ConnectionAction>,
) -> Result<ResponseJson<ApiResponse<ConnectionReply>>, ApiError> {
    let user = authenticate(&state, &headers)?;
    require_tier(&user)?;

    let reply = match action {
        ConnectionAction::StartSession { partner_name } => ConnectionReply::Started(
            state
                .connection
                .start_session(&user, partner_name.as_deref())
                .await?,
        ),
        ConnectionAction::GetQuestion { session_id } => ConnectionReply::Question {
            question: state.connection.get_question(&user, session_id).await?,
        },
        ConnectionAction::AnswerQuestion { session_id, answer } => ConnectionReply::Answered(
            state
                .connection
                .answer_question(&user, session_id, &answer)
                .await?,
        ),
        ConnectionAction::GetProgress { session_id } => ConnectionReply::Progress {
            session: state.connection.get_progress(&user, session_id).await?,
        },
        ConnectionAction::GetSessions => ConnectionReply::Sessions {
            sessions: state.connection.get_sessions(&user).await?,
        },
    };

    Ok(ResponseJson(ApiResponse::success(reply)))
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct InfoView {
    pub info: QuestionnaireInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionSummary>>,
}

/// GET /api/connection-questions
/// Program description is public; recent sessions are included for
/// authenticated callers.
pub async fn get_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ApiResponse<InfoView>>, ApiError> {
    let user = maybe_authenticate(&state, &headers);
    let (info, sessions) = state.connection.info(user.as_ref()).await?;
    Ok(ResponseJson(ApiResponse::success(InfoView {
        info,
        sessions,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/connection-questions", post(dispatch).get(get_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_session_parses_optional_partner_name() {
        let action: ConnectionAction = serde_json::from_value(serde_json::json!({
            "action": "start_session",
            "partnerName": "Sam"
        }))
        .unwrap();
        assert!(matches!(
            action,
            ConnectionAction::StartSession { partner_name: Some(ref n) } if n == "Sam"
        ));

        let action: ConnectionAction =
            serde_json::from_value(serde_json::json!({ "action": "start_session" })).unwrap();
        assert!(matches!(
            action,
            ConnectionAction::StartSession { partner_name: None }
        ));
    }

    #[test]
    fn answer_question_requires_session_and_answer() {
        let action: ConnectionAction = serde_json::from_value(serde_json::json!({
            "action": "answer_question",
            "sessionId": Uuid::new_v4(),
            "answer": "Mijn oma."
        }))
        .unwrap();
        assert!(matches!(action, ConnectionAction::AnswerQuestion { .. }));

        let missing: Result<ConnectionAction, _> = serde_json::from_value(serde_json::json!({
            "action": "answer_question",
            "sessionId": Uuid::new_v4()
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn get_sessions_is_a_bare_action() {
        let action: ConnectionAction =
            serde_json::from_value(serde_json::json!({ "action": "get_sessions" })).unwrap();
        assert!(matches!(action, ConnectionAction::GetSessions));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<ConnectionAction, _> =
            serde_json::from_value(serde_json::json!({ "action": "skip_question" }));
        assert!(result.is_err());
    }

    #[test]
    fn tier_gate_rejects_free_accounts() {
        let free = AuthUser {
            id: Uuid::new_v4(),
            tier: None,
        };
        assert!(require_tier(&free).is_err());

        let paid = AuthUser {
            id: Uuid::new_v4(),
            tier: Some(REQUIRED_TIER.to_string()),
        };
        assert!(require_tier(&paid).is_ok());
    }
}
