use axum::{
    Router,
    extract::{Query, State},
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::life_vision::{
    DomainScores, LifeVisionAnalysis, LifeVisionAssessment, LifeVisionResult,
    SubmittedVisionResponse, VisionDomain,
};
use serde::{Deserialize, Serialize};
use services::services::life_vision::LifeVisionOutcome;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, routes::authenticate, state::AppState};

#[derive(Debug, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LifeVisionAction {
    Start {
        #[serde(default)]
        horizon_scan: Option<serde_json::Value>,
    },
    Submit {
        assessment_id: Uuid,
        responses: Vec<SubmittedVisionResponse>,
    },
}

#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
pub enum LifeVisionReply {
    Started { assessment: LifeVisionAssessment },
    Submitted(LifeVisionOutcome),
}

/// POST /api/life-vision
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::Json(action): axum::Json<LifeVisionAction>,
) -> Result<ResponseJson<ApiResponse<LifeVisionReply>>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let reply = match action {
        LifeVisionAction::Start { horizon_scan } => {
            let scan = horizon_scan.unwrap_or_else(|| serde_json::json!({}));
            let assessment = state.life_vision.start(&user, &scan).await?;
            LifeVisionReply::Started { assessment }
        }
        LifeVisionAction::Submit {
            assessment_id,
            responses,
        } => {
            let outcome = state
                .life_vision
                .submit(&user, assessment_id, &responses)
                .await?;
            LifeVisionReply::Submitted(outcome)
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
    pub primary_domain: VisionDomain,
    pub domain_scores: Option<DomainScores>,
    pub analysis: Option<LifeVisionAnalysis>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ResultView {
    fn from_row(result: LifeVisionResult) -> Self {
        Self {
            assessment_id: result.assessment_id,
            primary_domain: result.primary_domain,
            domain_scores: result.parsed_domain_scores(),
            analysis: result.parsed_analysis(),
            created_at: result.created_at,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub assessment: Option<LifeVisionAssessment>,
    pub result: Option<ResultView>,
}

/// GET /api/life-vision?assessmentId=…
pub async fn get_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GetParams>,
) -> Result<ResponseJson<ApiResponse<AssessmentView>>, ApiError> {
    let user = authenticate(&state, &headers)?;

    let view = match params.assessment_id {
        Some(assessment_id) => {
            let result = state.life_vision.get_result(&user, assessment_id).await?;
            AssessmentView {
                assessment: None,
                result: Some(ResultView::from_row(result)),
            }
        }
        None => match state.life_vision.latest_for_user(&user).await? {
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
    Router::new().route("/life-vision", post(dispatch).get(get_result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_action_parses_phased_responses() {
        let action: LifeVisionAction = serde_json::from_value(serde_json::json!({
            "action": "submit",
            "assessmentId": Uuid::new_v4(),
            "responses": [
                { "phase": "values_mapping", "questionId": 3, "value": 5 },
                { "phase": "future_partner", "questionId": 1, "value": 2, "metadata": { "note": "x" } }
            ]
        }))
        .unwrap();
        let LifeVisionAction::Submit { responses, .. } = action else {
            panic!("expected submit");
        };
        assert_eq!(responses.len(), 2);
        assert!(responses[1].metadata.is_some());
    }

    #[test]
    fn start_accepts_free_form_horizon_scan() {
        let action: LifeVisionAction = serde_json::from_value(serde_json::json!({
            "action": "start",
            "horizonScan": { "droomleven": "aan zee wonen" }
        }))
        .unwrap();
        assert!(matches!(
            action,
            LifeVisionAction::Start { horizon_scan: Some(_) }
        ));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<LifeVisionAction, _> =
            serde_json::from_value(serde_json::json!({ "action": "reset" }));
        assert!(result.is_err());
    }
}
