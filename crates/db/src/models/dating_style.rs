use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, PgPool, Postgres, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::AssessmentStatus;

/// The eight dating-style categories scored by the scan.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
    EnumString, Display, EnumIter,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StyleCategory {
    Initiator,
    Planner,
    Adventurer,
    Selector,
    Pleaser,
    Distant,
    OverSharer,
    GhostProne,
}

impl StyleCategory {
    /// Dutch display name used in narrative text.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Initiator => "Initiator",
            Self::Planner => "Planner",
            Self::Adventurer => "Avonturier",
            Self::Selector => "Selecteur",
            Self::Pleaser => "Pleaser",
            Self::Distant => "Afstandelijk",
            Self::OverSharer => "Over-Sharer",
            Self::GhostProne => "Ghost-Gevoelig",
        }
    }
}

/// Whether a question is a Likert statement or a weighted scenario choice.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
    Statement,
    Scenario,
}

/// Free-form intake collected before the questionnaire starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MicroIntake {
    pub huidige_dating_status: Option<String>,
    pub gewenste_relatie_type: Option<String>,
    pub app_gebruik: Option<String>,
}

/// A single raw answer as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub question_id: i32,
    /// Likert 1-5 for statements, choice 1-3 for scenarios.
    pub value: i32,
    #[serde(default)]
    pub time_ms: Option<i32>,
}

/// Normalized 0-100 scores per category plus the winning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct StyleScores {
    pub initiator: i32,
    pub planner: i32,
    pub adventurer: i32,
    pub selector: i32,
    pub pleaser: i32,
    pub distant: i32,
    pub over_sharer: i32,
    pub ghost_prone: i32,
    pub primary_style: StyleCategory,
}

impl StyleScores {
    pub fn score(&self, category: StyleCategory) -> i32 {
        match category {
            StyleCategory::Initiator => self.initiator,
            StyleCategory::Planner => self.planner,
            StyleCategory::Adventurer => self.adventurer,
            StyleCategory::Selector => self.selector,
            StyleCategory::Pleaser => self.pleaser,
            StyleCategory::Distant => self.distant,
            StyleCategory::OverSharer => self.over_sharer,
            StyleCategory::GhostProne => self.ghost_prone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ChatScripts {
    pub eerste_bericht: String,
    pub diepte_gesprek: String,
    pub grens_stellen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MicroExercise {
    pub titel: String,
    pub beschrijving: String,
    pub stappen: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MicroExercises {
    pub stijl_bewustzijn: MicroExercise,
    pub flexibiliteit_training: MicroExercise,
    pub grens_experiment: MicroExercise,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilters {
    pub communicatie_stijl: String,
    pub energie_niveau: String,
    pub relatie_doelen: String,
    pub levensstijl: String,
}

/// The full narrative produced by the generator. Every field is required:
/// the fallback path fills all of them, so a result row never has holes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DatingStyleAnalysis {
    pub stijl_profiel: String,
    pub moderne_dating_analyse: String,
    pub sterke_punten: Vec<String>,
    pub aandachtspunten: Vec<String>,
    pub date_voorkeuren: Vec<String>,
    pub vermijd_dates: Vec<String>,
    pub chat_scripts: ChatScripts,
    pub micro_exercises: MicroExercises,
    pub match_filters: MatchFilters,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DatingStyleAssessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: AssessmentStatus,
    pub huidige_dating_status: Option<String>,
    pub gewenste_relatie_type: Option<String>,
    pub app_gebruik: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DatingStyleAssessment {
    pub fn intake(&self) -> MicroIntake {
        MicroIntake {
            huidige_dating_status: self.huidige_dating_status.clone(),
            gewenste_relatie_type: self.gewenste_relatie_type.clone(),
            app_gebruik: self.app_gebruik.clone(),
        }
    }

    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        intake: &MicroIntake,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO dating_style_assessments
                (id, user_id, huidige_dating_status, gewenste_relatie_type, app_gebruik)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, status, huidige_dating_status, gewenste_relatie_type,
                      app_gebruik, created_at, completed_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&intake.huidige_dating_status)
        .bind(&intake.gewenste_relatie_type)
        .bind(&intake.app_gebruik)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, status, huidige_dating_status, gewenste_relatie_type,
                      app_gebruik, created_at, completed_at
               FROM dating_style_assessments
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_latest_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, status, huidige_dating_status, gewenste_relatie_type,
                      app_gebruik, created_at, completed_at
               FROM dating_style_assessments
               WHERE user_id = $1
               ORDER BY created_at DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_completed<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE dating_style_assessments SET status = 'completed', completed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DatingStyleResponse {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub question_type: QuestionKind,
    pub question_id: i32,
    pub response_value: i32,
    pub response_time_ms: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl DatingStyleResponse {
    /// Append-only insert; the unique (assessment, question) constraint
    /// rejects duplicate answers for the same question.
    pub async fn create<'e, E>(
        executor: E,
        assessment_id: Uuid,
        question_type: QuestionKind,
        response: &SubmittedResponse,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"INSERT INTO dating_style_responses
                (id, assessment_id, question_type, question_id, response_value, response_time_ms)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(Uuid::new_v4())
        .bind(assessment_id)
        .bind(question_type)
        .bind(response.question_id)
        .bind(response.value)
        .bind(response.time_ms)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DatingStyleResult {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub primary_style: StyleCategory,
    pub initiator_score: i32,
    pub planner_score: i32,
    pub adventurer_score: i32,
    pub selector_score: i32,
    pub pleaser_score: i32,
    pub distant_score: i32,
    pub over_sharer_score: i32,
    pub ghost_prone_score: i32,
    pub stijl_profiel: String,
    pub moderne_dating_analyse: String,
    // JSON-serialized narrative substructures
    pub sterke_punten: String,
    pub aandachtspunten: String,
    pub date_voorkeuren: String,
    pub vermijd_dates: String,
    pub chat_scripts: String,
    pub micro_exercises: String,
    pub match_filters: String,
    pub created_at: DateTime<Utc>,
}

impl DatingStyleResult {
    /// Reassemble the typed analysis from the stored columns.
    pub fn parsed_analysis(&self) -> Option<DatingStyleAnalysis> {
        Some(DatingStyleAnalysis {
            stijl_profiel: self.stijl_profiel.clone(),
            moderne_dating_analyse: self.moderne_dating_analyse.clone(),
            sterke_punten: serde_json::from_str(&self.sterke_punten).ok()?,
            aandachtspunten: serde_json::from_str(&self.aandachtspunten).ok()?,
            date_voorkeuren: serde_json::from_str(&self.date_voorkeuren).ok()?,
            vermijd_dates: serde_json::from_str(&self.vermijd_dates).ok()?,
            chat_scripts: serde_json::from_str(&self.chat_scripts).ok()?,
            micro_exercises: serde_json::from_str(&self.micro_exercises).ok()?,
            match_filters: serde_json::from_str(&self.match_filters).ok()?,
        })
    }

    pub fn scores(&self) -> StyleScores {
        StyleScores {
            initiator: self.initiator_score,
            planner: self.planner_score,
            adventurer: self.adventurer_score,
            selector: self.selector_score,
            pleaser: self.pleaser_score,
            distant: self.distant_score,
            over_sharer: self.over_sharer_score,
            ghost_prone: self.ghost_prone_score,
            primary_style: self.primary_style,
        }
    }

    pub async fn create<'e, E>(
        executor: E,
        assessment_id: Uuid,
        scores: &StyleScores,
        analysis: &DatingStyleAnalysis,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO dating_style_results (
                id, assessment_id, primary_style,
                initiator_score, planner_score, adventurer_score, selector_score,
                pleaser_score, distant_score, over_sharer_score, ghost_prone_score,
                stijl_profiel, moderne_dating_analyse, sterke_punten, aandachtspunten,
                date_voorkeuren, vermijd_dates, chat_scripts, micro_exercises, match_filters
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            RETURNING id, assessment_id, primary_style,
                      initiator_score, planner_score, adventurer_score, selector_score,
                      pleaser_score, distant_score, over_sharer_score, ghost_prone_score,
                      stijl_profiel, moderne_dating_analyse, sterke_punten, aandachtspunten,
                      date_voorkeuren, vermijd_dates, chat_scripts, micro_exercises,
                      match_filters, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(assessment_id)
        .bind(scores.primary_style)
        .bind(scores.initiator)
        .bind(scores.planner)
        .bind(scores.adventurer)
        .bind(scores.selector)
        .bind(scores.pleaser)
        .bind(scores.distant)
        .bind(scores.over_sharer)
        .bind(scores.ghost_prone)
        .bind(&analysis.stijl_profiel)
        .bind(&analysis.moderne_dating_analyse)
        .bind(serde_json::to_string(&analysis.sterke_punten).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.aandachtspunten).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.date_voorkeuren).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.vermijd_dates).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.chat_scripts).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.micro_exercises).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.match_filters).map_err(to_protocol_err)?)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_assessment_id(
        pool: &PgPool,
        assessment_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, assessment_id, primary_style,
                      initiator_score, planner_score, adventurer_score, selector_score,
                      pleaser_score, distant_score, over_sharer_score, ghost_prone_score,
                      stijl_profiel, moderne_dating_analyse, sterke_punten, aandachtspunten,
                      date_voorkeuren, vermijd_dates, chat_scripts, micro_exercises,
                      match_filters, created_at
               FROM dating_style_results
               WHERE assessment_id = $1"#,
        )
        .bind(assessment_id)
        .fetch_optional(pool)
        .await
    }
}

fn to_protocol_err(e: serde_json::Error) -> sqlx::Error {
    sqlx::Error::Protocol(e.to_string())
}
