use axum::{
    Router,
    extract::{Query, State},
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::dating_style::{
    DatingStyleAnalysis, DatingStyleAssessment, DatingStyleResult, MicroIntake, StyleScores,
    SubmittedResponse,
};
use serde::{Deserialize, Serialize};
use services::services::dating_style::DatingStyleOutcome;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, routes::authenticate, state::AppState};

#[derive(Debug, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DatingStyleAction {
    Start {
        #[serde(default)]
        micro_intake: Option<MicroIntake>,
    },
    Submit {
        assessment_id: Uuid,
        responses: Vec<SubmittedResponse>,
    },
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum DatingStyleReply {
    Started { assessment: DatingStyleAssessment },
    Submitted(DatingStyleOutcome),
}

/// POST /api/dating-style
/// Action dispatch: start a new assessment or submit all responses.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(action): axum::Json<DatingStyleAction>,
) -> Result<ResponseJson<ApiResponse<DatingStyleReply>>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let reply = match action {
        DatingStyleAction::Start { micro_intake } => {
            let assessment = state
                .dating_style
                .start(&user, &micro_intake.unwrap_or_default())
                .await?;
            DatingStyleReply::Started { assessment }
        }
        DatingStyleAction::Submit {
            assessment_id,
            responses,
        } => {
            let outcome = state
                .dating_style
                .submit(&user, assessment_id, &responses)
                .await?;
            DatingStyleReply::Submitted(outcome)
        }
    };

    Ok(ResponseJson(ApiResponse::success(reply)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    pub assessment_id: Option<Uuid>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub assessment_id: Uuid,
    pub scores: StyleScores,
    pub analysis: Option<DatingStyleAnalysis>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ResultView {
    fn from_row(result: DatingStyleResult) -> Self {
        Self {
            assessment_id: result.assessment_id,
            scores: result.scores(),
            analysis: result.parsed_analysis(),
            created_at: result.created_at,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub assessment: Option<DatingStyleAssessment>,
    pub result: Option<ResultView>,
}

/// GET /api/dating-style?assessmentId=…
/// With an id: that assessment's persisted result. Without: the caller's
/// latest assessment plus its result when completed.
pub async fn get_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GetParams>,
) -> Result<ResponseJson<ApiResponse<AssessmentView>>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let view = match params.assessment_id {
        Some(assessment_id) => {
            let result = state.dating_style.get_result(&user, assessment_id).await?;
            AssessmentView {
                assessment: None,
                result: Some(ResultView::from_row(result)),
            }
        }
        None => match state.dating_style.latest_for_user(&user).await? {
            Some((assessment, result)) => AssessmentView {
                assessment: Some(assessment),
                result: result.map(ResultView::from_row),
            },
            None => AssessmentView {
                assessment: None,
                result: None,
            },
        },
    };

    Ok(ResponseJson(ApiResponse::success(view)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dating-style", post(dispatch).get(get_result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_action_parses_with_and_without_intake() {
        let action: DatingStyleAction = serde_json::from_value(serde_json::json!({
            "action": "start",
            "microIntake": { "huidigeDatingStatus": "single" }
        }))
        .unwrap();
        assert!(matches!(
            action,
            DatingStyleAction::Start { micro_intake: Some(_) }
        ));

        let action: DatingStyleAction =
            serde_json::from_value(serde_json::json!({ "action": "start" })).unwrap();
        assert!(matches!(
            action,
            DatingStyleAction::Start { micro_intake: None }
        ));
    }

    #[test]
    fn submit_action_parses_camel_case_fields() {
        let action: DatingStyleAction = serde_json::from_value(serde_json::json!({
            "action": "submit",
            "assessmentId": Uuid::new_v4(),
            "responses": [ { "questionId": 1, "value": 4 } ]
        }))
        .unwrap();
        let DatingStyleAction::Submit { responses, .. } = action else {
            panic!("expected submit");
        };
        assert_eq!(responses[0].question_id, 1);
        assert_eq!(responses[0].value, 4);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<DatingStyleAction, _> =
            serde_json::from_value(serde_json::json!({ "action": "delete_everything" }));
        assert!(result.is_err());
    }
}
