use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, PgPool, Postgres, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::AssessmentStatus;

/// The twelve life domains scored by the compass.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
    EnumString, Display, EnumIter,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisionDomain {
    CarriereBetekenis,
    VrijheidLifestyle,
    FamilieRelaties,
    GroeiRitme,
    EmotioneleStabiliteit,
    SpiritualiteitOntwikkeling,
    SocialeEnergie,
    FinancieleVisie,
    GezondheidWelzijn,
    AvontuurVerkenning,
    StabiliteitZekerheid,
    MaatschappelijkeBijdrage,
}

impl VisionDomain {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CarriereBetekenis => "Carrière & Betekenis",
            Self::VrijheidLifestyle => "Vrijheid & Lifestyle",
            Self::FamilieRelaties => "Familie & Relaties",
            Self::GroeiRitme => "Groei & Ritme",
            Self::EmotioneleStabiliteit => "Emotionele Stabiliteit",
            Self::SpiritualiteitOntwikkeling => "Spiritualiteit & Ontwikkeling",
            Self::SocialeEnergie => "Sociale Energie",
            Self::FinancieleVisie => "Financiële Visie",
            Self::GezondheidWelzijn => "Gezondheid & Welzijn",
            Self::AvontuurVerkenning => "Avontuur & Verkenning",
            Self::StabiliteitZekerheid => "Stabiliteit & Zekerheid",
            Self::MaatschappelijkeBijdrage => "Maatschappelijke Bijdrage",
        }
    }
}

/// Normalized 0-100 score per domain. BTreeMap keeps serialization order
/// deterministic.
pub type DomainScores = BTreeMap<VisionDomain, i32>;

/// Questionnaire phase a response belongs to. Only `values_mapping`
/// answers feed the scorer; the other phases carry context for the
/// narrative prompt.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
    EnumString, Display,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VisionPhase {
    HorizonScan,
    ValuesMapping,
    FuturePartner,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedVisionResponse {
    pub phase: VisionPhase,
    pub question_id: i32,
    /// Likert 1-5.
    pub value: i32,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct VisionProfile {
    pub samenvatting: String,
    pub kernwaarden: Vec<String>,
    pub toekomstbeeld: String,
    pub drijfveren: Vec<String>,
    pub levensritme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FutureCompass {
    pub noord: String,
    pub oost: String,
    pub zuid: String,
    pub west: String,
    pub centrum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityPredictions {
    pub lifestyle: i32,
    pub ambitie: i32,
    pub relatie_ritme: i32,
    pub gezin_visie: i32,
    pub energie_niveau: i32,
    pub groei_richting: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DatingStrategy {
    pub beste_date_types: Vec<String>,
    pub toekomst_delen_guidelines: BTreeMap<String, String>,
    pub levensvisie_bespreken_timing: String,
    pub profiel_aandachtspunten: Vec<String>,
    pub gedeelde_visie_signalen: Vec<String>,
}

/// Narrative half of a life-vision result. Domain scores are kept separate
/// because they come from the deterministic scorer, never from the model.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LifeVisionAnalysis {
    pub levensvisie_profiel: VisionProfile,
    pub toekomst_kompas: FutureCompass,
    pub levensrichting_analyse: String,
    pub toekomst_partner_profiel: Vec<String>,
    pub niet_onderhandelbare_punten: Vec<String>,
    pub partner_behoeften: Vec<String>,
    pub valkuilen: Vec<String>,
    pub compatibility_predictions: CompatibilityPredictions,
    pub dating_strategy: DatingStrategy,
    pub mismatch_risicos: Vec<String>,
    pub onbespreekbare_dealbreakers: Vec<String>,
    pub communicatie_scripts: BTreeMap<String, String>,
    pub zelfreflectie_prompts: Vec<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LifeVisionAssessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: AssessmentStatus,
    /// JSON-serialized free-form horizon-scan intake.
    pub horizon_scan: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LifeVisionAssessment {
    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        horizon_scan: &serde_json::Value,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO life_vision_assessments (id, user_id, horizon_scan)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, status, horizon_scan, created_at, completed_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(horizon_scan.to_string())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, status, horizon_scan, created_at, completed_at
               FROM life_vision_assessments
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
            r#"SELECT id, user_id, status, horizon_scan, created_at, completed_at
               FROM life_vision_assessments
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
            "UPDATE life_vision_assessments SET status = 'completed', completed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LifeVisionResponse {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub phase: VisionPhase,
    pub question_id: i32,
    pub response_value: i32,
    pub response_metadata: String,
    pub created_at: DateTime<Utc>,
}

impl LifeVisionResponse {
    pub async fn create<'e, E>(
        executor: E,
        assessment_id: Uuid,
        response: &SubmittedVisionResponse,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let metadata = response
            .metadata
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "{}".to_string());
        sqlx::query(
            r#"INSERT INTO life_vision_responses
                (id, assessment_id, phase, question_id, response_value, response_metadata)
            VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(Uuid::new_v4())
        .bind(assessment_id)
        .bind(response.phase)
        .bind(response.question_id)
        .bind(response.value)
        .bind(metadata)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LifeVisionResult {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub primary_domain: VisionDomain,
    // JSON-serialized columns
    pub domain_scores: String,
    pub levensvisie_profiel: String,
    pub toekomst_kompas: String,
    pub levensrichting_analyse: String,
    pub toekomst_partner_profiel: String,
    pub niet_onderhandelbare_punten: String,
    pub partner_behoeften: String,
    pub valkuilen: String,
    pub compatibility_predictions: String,
    pub dating_strategy: String,
    pub mismatch_risicos: String,
    pub onbespreekbare_dealbreakers: String,
    pub communicatie_scripts: String,
    pub zelfreflectie_prompts: String,
    pub created_at: DateTime<Utc>,
}

impl LifeVisionResult {
    pub fn parsed_domain_scores(&self) -> Option<DomainScores> {
        serde_json::from_str(&self.domain_scores).ok()
    }

    pub fn parsed_analysis(&self) -> Option<LifeVisionAnalysis> {
        Some(LifeVisionAnalysis {
            levensvisie_profiel: serde_json::from_str(&self.levensvisie_profiel).ok()?,
            toekomst_kompas: serde_json::from_str(&self.toekomst_kompas).ok()?,
            levensrichting_analyse: self.levensrichting_analyse.clone(),
            toekomst_partner_profiel: serde_json::from_str(&self.toekomst_partner_profiel).ok()?,
            niet_onderhandelbare_punten: serde_json::from_str(&self.niet_onderhandelbare_punten)
                .ok()?,
            partner_behoeften: serde_json::from_str(&self.partner_behoeften).ok()?,
            valkuilen: serde_json::from_str(&self.valkuilen).ok()?,
            compatibility_predictions: serde_json::from_str(&self.compatibility_predictions)
                .ok()?,
            dating_strategy: serde_json::from_str(&self.dating_strategy).ok()?,
            mismatch_risicos: serde_json::from_str(&self.mismatch_risicos).ok()?,
            onbespreekbare_dealbreakers: serde_json::from_str(&self.onbespreekbare_dealbreakers)
                .ok()?,
            communicatie_scripts: serde_json::from_str(&self.communicatie_scripts).ok()?,
            zelfreflectie_prompts: serde_json::from_str(&self.zelfreflectie_prompts).ok()?,
        })
    }

    pub async fn create<'e, E>(
        executor: E,
        assessment_id: Uuid,
        primary_domain: VisionDomain,
        domain_scores: &DomainScores,
        analysis: &LifeVisionAnalysis,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO life_vision_results (
                id, assessment_id, primary_domain, domain_scores,
                levensvisie_profiel, toekomst_kompas, levensrichting_analyse,
                toekomst_partner_profiel, niet_onderhandelbare_punten, partner_behoeften,
                valkuilen, compatibility_predictions, dating_strategy,
                mismatch_risicos, onbespreekbare_dealbreakers, communicatie_scripts,
                zelfreflectie_prompts
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            )
            RETURNING id, assessment_id, primary_domain, domain_scores,
                      levensvisie_profiel, toekomst_kompas, levensrichting_analyse,
                      toekomst_partner_profiel, niet_onderhandelbare_punten, partner_behoeften,
                      valkuilen, compatibility_predictions, dating_strategy,
                      mismatch_risicos, onbespreekbare_dealbreakers, communicatie_scripts,
                      zelfreflectie_prompts, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(assessment_id)
        .bind(primary_domain)
        .bind(serde_json::to_string(domain_scores).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.levensvisie_profiel).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.toekomst_kompas).map_err(to_protocol_err)?)
        .bind(&analysis.levensrichting_analyse)
        .bind(serde_json::to_string(&analysis.toekomst_partner_profiel).map_err(to_protocol_err)?)
        .bind(
            serde_json::to_string(&analysis.niet_onderhandelbare_punten)
                .map_err(to_protocol_err)?,
        )
        .bind(serde_json::to_string(&analysis.partner_behoeften).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.valkuilen).map_err(to_protocol_err)?)
        .bind(
            serde_json::to_string(&analysis.compatibility_predictions).map_err(to_protocol_err)?,
        )
        .bind(serde_json::to_string(&analysis.dating_strategy).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.mismatch_risicos).map_err(to_protocol_err)?)
        .bind(
            serde_json::to_string(&analysis.onbespreekbare_dealbreakers)
                .map_err(to_protocol_err)?,
        )
        .bind(serde_json::to_string(&analysis.communicatie_scripts).map_err(to_protocol_err)?)
        .bind(serde_json::to_string(&analysis.zelfreflectie_prompts).map_err(to_protocol_err)?)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_assessment_id(
        pool: &PgPool,
        assessment_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, assessment_id, primary_domain, domain_scores,
                      levensvisie_profiel, toekomst_kompas, levensrichting_analyse,
                      toekomst_partner_profiel, niet_onderhandelbare_punten, partner_behoeften,
                      valkuilen, compatibility_predictions, dating_strategy,
                      mismatch_risicos, onbespreekbare_dealbreakers, communicatie_scripts,
                      zelfreflectie_prompts, created_at
               FROM life_vision_results
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
