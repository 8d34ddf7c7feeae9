//! Levensvisie compass: deterministic domain scoring plus AI narrative.
//!
//! Domain scores never come from the model. The values-mapping answers are
//! scored locally and the narrative generator only writes prose around
//! them, so two identical submissions always yield identical scores.

use std::collections::{BTreeMap, BTreeSet};

use db::{
    DBService,
    models::life_vision::{
        CompatibilityPredictions, DatingStrategy, DomainScores, FutureCompass, LifeVisionAnalysis,
        LifeVisionAssessment, LifeVisionResponse, LifeVisionResult, SubmittedVisionResponse,
        VisionDomain, VisionPhase, VisionProfile,
    },
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{info, warn};
use ts_rs::TS;
use utils::auth::AuthUser;
use uuid::Uuid;

use super::{
    AssessmentError,
    generation_guard::GenerationGuard,
    openrouter::{GenerationOptions, OpenRouterClient},
};

const LIKERT_MIN: i32 = 1;
const LIKERT_MAX: i32 = 5;

/// Two questions per domain at weight 10: a full-agreement pair scores
/// the raw maximum of 100.
const MAX_RAW_PER_DOMAIN: f64 = 100.0;

struct DomainWeight {
    question_id: i32,
    domain: VisionDomain,
    reverse: bool,
}

/// Values-mapping weights, two questions per domain. A handful of
/// questions are phrased negatively and reverse-scored.
const DOMAIN_WEIGHTS: &[DomainWeight] = &[
    DomainWeight { question_id: 1, domain: VisionDomain::CarriereBetekenis, reverse: false },
    DomainWeight { question_id: 2, domain: VisionDomain::CarriereBetekenis, reverse: false },
    DomainWeight { question_id: 3, domain: VisionDomain::VrijheidLifestyle, reverse: false },
    DomainWeight { question_id: 4, domain: VisionDomain::VrijheidLifestyle, reverse: true },
    DomainWeight { question_id: 5, domain: VisionDomain::FamilieRelaties, reverse: false },
    DomainWeight { question_id: 6, domain: VisionDomain::FamilieRelaties, reverse: false },
    DomainWeight { question_id: 7, domain: VisionDomain::GroeiRitme, reverse: false },
    DomainWeight { question_id: 8, domain: VisionDomain::GroeiRitme, reverse: false },
    DomainWeight { question_id: 9, domain: VisionDomain::EmotioneleStabiliteit, reverse: false },
    DomainWeight { question_id: 10, domain: VisionDomain::EmotioneleStabiliteit, reverse: true },
    DomainWeight { question_id: 11, domain: VisionDomain::SpiritualiteitOntwikkeling, reverse: false },
    DomainWeight { question_id: 12, domain: VisionDomain::SpiritualiteitOntwikkeling, reverse: false },
    DomainWeight { question_id: 13, domain: VisionDomain::SocialeEnergie, reverse: false },
    DomainWeight { question_id: 14, domain: VisionDomain::SocialeEnergie, reverse: true },
    DomainWeight { question_id: 15, domain: VisionDomain::FinancieleVisie, reverse: false },
    DomainWeight { question_id: 16, domain: VisionDomain::FinancieleVisie, reverse: false },
    DomainWeight { question_id: 17, domain: VisionDomain::GezondheidWelzijn, reverse: false },
    DomainWeight { question_id: 18, domain: VisionDomain::GezondheidWelzijn, reverse: false },
    DomainWeight { question_id: 19, domain: VisionDomain::AvontuurVerkenning, reverse: false },
    DomainWeight { question_id: 20, domain: VisionDomain::AvontuurVerkenning, reverse: false },
    DomainWeight { question_id: 21, domain: VisionDomain::StabiliteitZekerheid, reverse: false },
    DomainWeight { question_id: 22, domain: VisionDomain::StabiliteitZekerheid, reverse: true },
    DomainWeight { question_id: 23, domain: VisionDomain::MaatschappelijkeBijdrage, reverse: false },
    DomainWeight { question_id: 24, domain: VisionDomain::MaatschappelijkeBijdrage, reverse: false },
];

/// Validate the whole batch and compute normalized 0-100 domain scores.
/// Every response is checked (Likert range, sane question id, no
/// duplicate (phase, question) pair); only `values_mapping` answers feed
/// the scorer, the other phases carry context for the narrative prompt.
pub fn compute_domain_scores(
    responses: &[SubmittedVisionResponse],
) -> Result<DomainScores, AssessmentError> {
    let mut raw: BTreeMap<VisionDomain, i32> = VisionDomain::iter().map(|d| (d, 0)).collect();
    let mut seen: BTreeSet<(VisionPhase, i32)> = BTreeSet::new();

    for response in responses {
        if !seen.insert((response.phase, response.question_id)) {
            return Err(AssessmentError::InvalidResponse(format!(
                "duplicate question id {} in phase {}",
                response.question_id, response.phase
            )));
        }
        if !(LIKERT_MIN..=LIKERT_MAX).contains(&response.value) {
            return Err(AssessmentError::InvalidResponse(format!(
                "{} question {}: likert value {} out of range 1-5",
                response.phase, response.question_id, response.value
            )));
        }
        if response.phase != VisionPhase::ValuesMapping {
            if response.question_id < 1 {
                return Err(AssessmentError::InvalidResponse(format!(
                    "{} question id {} out of range",
                    response.phase, response.question_id
                )));
            }
            continue;
        }
        let Some(weight) = DOMAIN_WEIGHTS
            .iter()
            .find(|w| w.question_id == response.question_id)
        else {
            return Err(AssessmentError::InvalidResponse(format!(
                "unknown values_mapping question id {}",
                response.question_id
            )));
        };
        let points = if weight.reverse {
            (6 - response.value) * 10
        } else {
            response.value * 10
        };
        *raw.get_mut(&weight.domain).expect("all domains present") += points;
    }

    Ok(raw
        .into_iter()
        .map(|(domain, points)| {
            let normalized =
                ((points as f64 / MAX_RAW_PER_DOMAIN) * 100.0).round().min(100.0) as i32;
            (domain, normalized)
        })
        .collect())
}

/// Highest-scoring domain, ties broken alphabetically by snake_case name.
pub fn primary_domain(scores: &DomainScores) -> VisionDomain {
    let mut ranked: Vec<(VisionDomain, i32)> = scores.iter().map(|(&d, &s)| (d, s)).collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.to_string().cmp(&b.0.to_string()))
    });
    ranked[0].0
}

struct DomainTexts {
    richting: &'static str,
    kernwaarde: &'static str,
    partner_trek: &'static str,
    valkuil: &'static str,
    date_type: &'static str,
}

fn domain_texts(domain: VisionDomain) -> DomainTexts {
    match domain {
        VisionDomain::CarriereBetekenis => DomainTexts {
            richting: "betekenisvol werk en professionele groei",
            kernwaarde: "Betekenis",
            partner_trek: "Iemand die jouw ambities begrijpt en eigen doelen nastreeft",
            valkuil: "Werk laten overheersen boven de relatie",
            date_type: "Diepgaand gesprek over dromen en doelen",
        },
        VisionDomain::VrijheidLifestyle => DomainTexts {
            richting: "vrijheid en een zelfgekozen levensstijl",
            kernwaarde: "Autonomie",
            partner_trek: "Iemand die ruimte geeft en zelf ook onafhankelijk is",
            valkuil: "Commitment uitstellen uit angst voor beperking",
            date_type: "Spontane activiteit zonder vast plan",
        },
        VisionDomain::FamilieRelaties => DomainTexts {
            richting: "hechte familie en duurzame relaties",
            kernwaarde: "Verbondenheid",
            partner_trek: "Iemand met dezelfde gezinswensen en familiewaarden",
            valkuil: "Te snel vooruitlopen op een gezamenlijke toekomst",
            date_type: "Ontmoeting in een warme, persoonlijke setting",
        },
        VisionDomain::GroeiRitme => DomainTexts {
            richting: "continue persoonlijke ontwikkeling",
            kernwaarde: "Groei",
            partner_trek: "Iemand die zichzelf ook wil blijven ontwikkelen",
            valkuil: "De ander willen veranderen in plaats van accepteren",
            date_type: "Samen iets nieuws leren of proberen",
        },
        VisionDomain::EmotioneleStabiliteit => DomainTexts {
            richting: "innerlijke rust en emotionele balans",
            kernwaarde: "Balans",
            partner_trek: "Iemand die emotioneel beschikbaar en stabiel is",
            valkuil: "Conflict vermijden om de rust te bewaren",
            date_type: "Rustige een-op-een ontmoeting",
        },
        VisionDomain::SpiritualiteitOntwikkeling => DomainTexts {
            richting: "zingeving en innerlijke ontwikkeling",
            kernwaarde: "Zingeving",
            partner_trek: "Iemand die openstaat voor diepere levensvragen",
            valkuil: "Verwachten dat de ander hetzelfde pad volgt",
            date_type: "Wandeling met ruimte voor een goed gesprek",
        },
        VisionDomain::SocialeEnergie => DomainTexts {
            richting: "een rijk sociaal leven",
            kernwaarde: "Verbinding",
            partner_trek: "Iemand die het leuk vindt om samen mensen te ontmoeten",
            valkuil: "Te weinig tijd voor de relatie zelf",
            date_type: "Samen naar een sociale gelegenheid",
        },
        VisionDomain::FinancieleVisie => DomainTexts {
            richting: "financiële zekerheid en opbouw",
            kernwaarde: "Zekerheid",
            partner_trek: "Iemand met een vergelijkbare kijk op geld en toekomst",
            valkuil: "Verschillen in bestedingspatroon onbesproken laten",
            date_type: "Laagdrempelige date zonder grote uitgaven",
        },
        VisionDomain::GezondheidWelzijn => DomainTexts {
            richting: "een gezond en energiek leven",
            kernwaarde: "Vitaliteit",
            partner_trek: "Iemand met een actieve levensstijl",
            valkuil: "Oordelen over andermans gewoonten",
            date_type: "Actieve date zoals sporten of wandelen",
        },
        VisionDomain::AvontuurVerkenning => DomainTexts {
            richting: "avontuur en nieuwe ervaringen",
            kernwaarde: "Avontuur",
            partner_trek: "Iemand die meegaat in spontane plannen",
            valkuil: "Rusteloosheid zodra het dagelijks leven went",
            date_type: "Onverwacht uitje naar een onbekende plek",
        },
        VisionDomain::StabiliteitZekerheid => DomainTexts {
            richting: "een stabiel en voorspelbaar leven",
            kernwaarde: "Stabiliteit",
            partner_trek: "Iemand die betrouwbaar is en afspraken nakomt",
            valkuil: "Verandering te snel als bedreiging zien",
            date_type: "Vertrouwde setting zoals een goed restaurant",
        },
        VisionDomain::MaatschappelijkeBijdrage => DomainTexts {
            richting: "bijdragen aan iets groters dan jezelf",
            kernwaarde: "Bijdrage",
            partner_trek: "Iemand die maatschappelijke betrokkenheid waardeert",
            valkuil: "De relatie ondergeschikt maken aan idealen",
            date_type: "Samen vrijwilligerswerk of een goed doel bezoeken",
        },
    }
}

/// Deterministic narrative when the external generation fails. Predictions
/// are derived from the computed domain scores, never invented.
pub fn fallback_analysis(scores: &DomainScores, primary: VisionDomain) -> LifeVisionAnalysis {
    let texts = domain_texts(primary);
    let score = |d: VisionDomain| scores.get(&d).copied().unwrap_or(0);

    let mut ranked: Vec<(VisionDomain, i32)> = scores.iter().map(|(&d, &s)| (d, s)).collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.to_string().cmp(&b.0.to_string()))
    });
    let top_three: Vec<String> = ranked
        .iter()
        .take(3)
        .map(|(d, _)| domain_texts(*d).kernwaarde.to_string())
        .collect();

    let mut guidelines = BTreeMap::new();
    guidelines.insert(
        "date1".to_string(),
        "Houd het licht; deel hooguit één toekomstwens".to_string(),
    );
    guidelines.insert(
        "date3".to_string(),
        "Verken elkaars kijk op werk, wonen en ritme".to_string(),
    );
    guidelines.insert(
        "date5".to_string(),
        "Bespreek concrete toekomstplannen en dealbreakers".to_string(),
    );

    let mut scripts = BTreeMap::new();
    scripts.insert(
        "toekomst_introduceren".to_string(),
        format!(
            "Ik merk dat {} belangrijk voor me is. Hoe kijk jij daar naar?",
            texts.richting
        ),
    );
    scripts.insert(
        "verschil_bespreken".to_string(),
        "We kijken hier verschillend naar. Ik wil graag begrijpen hoe jij het ziet.".to_string(),
    );

    LifeVisionAnalysis {
        levensvisie_profiel: VisionProfile {
            samenvatting: format!(
                "Jouw levensvisie draait vooral om {} (domein: {}, score {}%).",
                texts.richting,
                primary.display_name(),
                score(primary)
            ),
            kernwaarden: top_three,
            toekomstbeeld: format!(
                "Over vijf jaar wil je een leven waarin {} centraal staat.",
                texts.richting
            ),
            drijfveren: vec![
                texts.kernwaarde.to_string(),
                "Authenticiteit".to_string(),
                "Richting".to_string(),
            ],
            levensritme: if score(VisionDomain::AvontuurVerkenning)
                > score(VisionDomain::StabiliteitZekerheid)
            {
                "Dynamisch, met ruimte voor het onverwachte".to_string()
            } else {
                "Geaard, met een herkenbaar ritme".to_string()
            },
        },
        toekomst_kompas: FutureCompass {
            noord: format!("Richting: {}", texts.richting),
            oost: "Wat je energie geeft: momenten die bij je kernwaarden passen".to_string(),
            zuid: "Wat je loslaat: verwachtingen van anderen die niet bij je passen".to_string(),
            west: format!("Waar je op let: {}", texts.valkuil.to_lowercase()),
            centrum: format!("Kern: {}", texts.kernwaarde),
        },
        levensrichting_analyse: format!(
            "Je hoogst scorende levensdomein is {} ({}%). Dat betekent dat {} zwaar weegt in hoe je keuzes maakt, ook in dating. Een partner die hier haaks op staat zal op termijn wringen, terwijl gedeelde richting juist versnelt.",
            primary.display_name(),
            score(primary),
            texts.richting
        ),
        toekomst_partner_profiel: vec![
            texts.partner_trek.to_string(),
            "Iemand die open communiceert over de toekomst".to_string(),
            "Iemand wiens dagelijks ritme bij het jouwe past".to_string(),
        ],
        niet_onderhandelbare_punten: vec![
            format!("Respect voor jouw focus op {}", texts.richting),
            "Eerlijkheid over toekomstplannen".to_string(),
        ],
        partner_behoeften: vec![
            "Gedeelde kijk op de grote lijnen".to_string(),
            "Ruimte voor ieders eigen ontwikkeling".to_string(),
        ],
        valkuilen: vec![
            texts.valkuil.to_string(),
            "Toekomstgesprekken te lang uitstellen".to_string(),
        ],
        compatibility_predictions: CompatibilityPredictions {
            lifestyle: score(VisionDomain::VrijheidLifestyle),
            ambitie: score(VisionDomain::CarriereBetekenis),
            relatie_ritme: score(VisionDomain::FamilieRelaties),
            gezin_visie: score(VisionDomain::FamilieRelaties),
            energie_niveau: score(VisionDomain::SocialeEnergie),
            groei_richting: score(VisionDomain::GroeiRitme),
        },
        dating_strategy: DatingStrategy {
            beste_date_types: vec![
                texts.date_type.to_string(),
                "Gesprek waarin waarden vanzelf ter sprake komen".to_string(),
            ],
            toekomst_delen_guidelines: guidelines,
            levensvisie_bespreken_timing: "Vanaf date drie, wanneer er een basis van vertrouwen is"
                .to_string(),
            profiel_aandachtspunten: vec![
                format!("Laat zien dat {} je drijft", texts.richting),
                "Wees concreet over wat je zoekt".to_string(),
            ],
            gedeelde_visie_signalen: vec![
                "De ander stelt zelf vragen over jouw toekomstbeeld".to_string(),
                "Plannen maken voelt vanzelfsprekend".to_string(),
            ],
        },
        mismatch_risicos: vec![
            format!("Een partner voor wie {} geen rol speelt", texts.richting),
            "Structureel verschillend levensritme".to_string(),
        ],
        onbespreekbare_dealbreakers: vec![
            "Oneerlijkheid over wat iemand wil".to_string(),
            format!("Minachting voor jouw kernwaarde {}", texts.kernwaarde),
        ],
        communicatie_scripts: scripts,
        zelfreflectie_prompts: vec![
            format!("Wanneer voelde {} deze week het sterkst?", texts.richting),
            "Welke toekomstwens heb ik nog niet uitgesproken?".to_string(),
            "Waar pas ik me aan terwijl ik dat eigenlijk niet wil?".to_string(),
        ],
    }
}

fn build_prompt(
    scores: &DomainScores,
    primary: VisionDomain,
    horizon_scan: &str,
    responses: &[SubmittedVisionResponse],
) -> String {
    let score_lines: Vec<String> = scores
        .iter()
        .map(|(d, s)| format!("- {}: {}%", d.display_name(), s))
        .collect();

    let partner_answers: Vec<String> = responses
        .iter()
        .filter(|r| r.phase == VisionPhase::FuturePartner)
        .map(|r| format!("- vraag {}: {}", r.question_id, r.value))
        .collect();

    format!(
        r#"Genereer een Nederlandse levensvisie-analyse voor een dating coaching traject.

Domein scores (deterministisch berekend, neem deze EXACT over in je tekst, verzin geen andere scores):
{}

Primair domein: {}
Horizon scan (vrije intake): {}
Toekomst-partner antwoorden: {}

Geef ALLEEN geldige JSON terug met exact deze velden:
{{
  "levensvisieProfiel": {{ "samenvatting": "...", "kernwaarden": ["..."], "toekomstbeeld": "...", "drijfveren": ["..."], "levensritme": "..." }},
  "toekomstKompas": {{ "noord": "...", "oost": "...", "zuid": "...", "west": "...", "centrum": "..." }},
  "levensrichtingAnalyse": "Uitgebreide analyse van de levensrichting",
  "toekomstPartnerProfiel": ["3-4 partner kenmerken"],
  "nietOnderhandelbarePunten": ["2-3 punten"],
  "partnerBehoeften": ["2-3 behoeften"],
  "valkuilen": ["2-3 valkuilen"],
  "compatibilityPredictions": {{ "lifestyle": 0, "ambitie": 0, "relatieRitme": 0, "gezinVisie": 0, "energieNiveau": 0, "groeiRichting": 0 }},
  "datingStrategy": {{
    "besteDateTypes": ["..."],
    "toekomstDelenGuidelines": {{ "date1": "...", "date3": "...", "date5": "..." }},
    "levensvisieBesprekenTiming": "...",
    "profielAandachtspunten": ["..."],
    "gedeeldeVisieSignalen": ["..."]
  }},
  "mismatchRisicos": ["2-3 risico's"],
  "onbespreekbareDealbreakers": ["2 dealbreakers"],
  "communicatieScripts": {{ "toekomst_introduceren": "...", "verschil_bespreken": "..." }},
  "zelfreflectiePrompts": ["3 prompts"]
}}

De compatibilityPredictions moeten gebaseerd zijn op de gegeven domein scores (0-100)."#,
        score_lines.join("\n"),
        primary.display_name(),
        horizon_scan,
        if partner_answers.is_empty() {
            "geen".to_string()
        } else {
            partner_answers.join("\n")
        },
    )
}

const SYSTEM_PROMPT: &str = "Je bent een Nederlandse levenscoach gespecialiseerd in dating. Antwoord uitsluitend met geldige JSON die exact het gevraagde schema volgt.";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LifeVisionOutcome {
    pub result: LifeVisionResult,
    pub primary_domain: VisionDomain,
    pub domain_scores: DomainScores,
    pub analysis: LifeVisionAnalysis,
}

#[derive(Clone)]
pub struct LifeVisionService {
    db: DBService,
    client: OpenRouterClient,
    guard: GenerationGuard,
}

impl LifeVisionService {
    pub fn new(db: DBService, client: OpenRouterClient, guard: GenerationGuard) -> Self {
        Self { db, client, guard }
    }

    pub async fn start(
        &self,
        user: &AuthUser,
        horizon_scan: &serde_json::Value,
    ) -> Result<LifeVisionAssessment, AssessmentError> {
        let assessment =
            LifeVisionAssessment::create(&self.db.pool, Uuid::new_v4(), user.id, horizon_scan)
                .await?;
        info!(assessment_id = %assessment.id, user_id = %user.id, "life-vision assessment started");
        Ok(assessment)
    }

    pub async fn submit(
        &self,
        user: &AuthUser,
        assessment_id: Uuid,
        responses: &[SubmittedVisionResponse],
    ) -> Result<LifeVisionOutcome, AssessmentError> {
        if !responses
            .iter()
            .any(|r| r.phase == VisionPhase::ValuesMapping)
        {
            return Err(AssessmentError::InvalidResponse(
                "at least one values_mapping response is required".to_string(),
            ));
        }

        let assessment = LifeVisionAssessment::find_by_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        if assessment.user_id != user.id {
            return Err(AssessmentError::Forbidden);
        }
        if assessment.completed_at.is_some() {
            return Err(AssessmentError::AlreadyCompleted);
        }

        let domain_scores = compute_domain_scores(responses)?;
        let primary = primary_domain(&domain_scores);

        let _permit = self
            .guard
            .try_acquire(user.id)
            .ok_or(AssessmentError::GenerationInProgress)?;

        let analysis = self
            .generate_analysis(&domain_scores, primary, &assessment.horizon_scan, responses)
            .await;

        let mut tx = self.db.pool.begin().await?;
        for response in responses {
            LifeVisionResponse::create(&mut *tx, assessment_id, response).await?;
        }
        let result =
            LifeVisionResult::create(&mut *tx, assessment_id, primary, &domain_scores, &analysis)
                .await?;
        LifeVisionAssessment::mark_completed(&mut *tx, assessment_id).await?;
        tx.commit().await?;

        info!(
            assessment_id = %assessment_id,
            primary_domain = %primary,
            "life-vision assessment completed"
        );

        Ok(LifeVisionOutcome {
            result,
            primary_domain: primary,
            domain_scores,
            analysis,
        })
    }

    async fn generate_analysis(
        &self,
        scores: &DomainScores,
        primary: VisionDomain,
        horizon_scan: &str,
        responses: &[SubmittedVisionResponse],
    ) -> LifeVisionAnalysis {
        let prompt = build_prompt(scores, primary, horizon_scan, responses);
        match self
            .client
            .ask_json::<LifeVisionAnalysis>(
                &prompt,
                Some(SYSTEM_PROMPT),
                GenerationOptions {
                    temperature: 0.7,
                    max_tokens: 3000,
                },
            )
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "life-vision generation failed, using fallback narrative");
                fallback_analysis(scores, primary)
            }
        }
    }

    pub async fn get_result(
        &self,
        user: &AuthUser,
        assessment_id: Uuid,
    ) -> Result<LifeVisionResult, AssessmentError> {
        let assessment = LifeVisionAssessment::find_by_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        if assessment.user_id != user.id {
            return Err(AssessmentError::Forbidden);
        }
        LifeVisionResult::find_by_assessment_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)
    }

    pub async fn latest_for_user(
        &self,
        user: &AuthUser,
    ) -> Result<Option<(LifeVisionAssessment, Option<LifeVisionResult>)>, AssessmentError> {
        let Some(assessment) =
            LifeVisionAssessment::find_latest_by_user(&self.db.pool, user.id).await?
        else {
            return Ok(None);
        };
        let result = LifeVisionResult::find_by_assessment_id(&self.db.pool, assessment.id).await?;
        Ok(Some((assessment, result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(question_id: i32, value: i32) -> SubmittedVisionResponse {
        SubmittedVisionResponse {
            phase: VisionPhase::ValuesMapping,
            question_id,
            value,
            metadata: None,
        }
    }

    #[test]
    fn two_full_agreement_answers_max_a_domain() {
        let scores = compute_domain_scores(&[values(1, 5), values(2, 5)]).unwrap();
        assert_eq!(scores[&VisionDomain::CarriereBetekenis], 100);
        assert_eq!(scores[&VisionDomain::FamilieRelaties], 0);
    }

    #[test]
    fn reverse_scored_questions_invert_the_likert_value() {
        // q4 is reverse-scored: answering 1 contributes (6 - 1) * 10 = 50
        let scores = compute_domain_scores(&[values(3, 1), values(4, 1)]).unwrap();
        assert_eq!(scores[&VisionDomain::VrijheidLifestyle], 60);
    }

    #[test]
    fn non_scoring_phases_are_ignored() {
        let scores = compute_domain_scores(&[
            values(1, 5),
            SubmittedVisionResponse {
                phase: VisionPhase::HorizonScan,
                question_id: 1,
                value: 5,
                metadata: None,
            },
            SubmittedVisionResponse {
                phase: VisionPhase::FuturePartner,
                question_id: 1,
                value: 5,
                metadata: None,
            },
        ])
        .unwrap();
        assert_eq!(scores[&VisionDomain::CarriereBetekenis], 50);
    }

    #[test]
    fn all_domains_always_present_in_output() {
        let scores = compute_domain_scores(&[values(1, 3)]).unwrap();
        assert_eq!(scores.len(), 12);
    }

    #[test]
    fn rejects_out_of_range_value() {
        let err = compute_domain_scores(&[values(1, 0)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_unknown_question() {
        let err = compute_domain_scores(&[values(25, 3)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_duplicate_phase_question_pairs() {
        let err = compute_domain_scores(&[values(1, 5), values(1, 4)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));

        // the same id in different phases is a different question
        let ok = compute_domain_scores(&[
            values(1, 5),
            SubmittedVisionResponse {
                phase: VisionPhase::FuturePartner,
                question_id: 1,
                value: 3,
                metadata: None,
            },
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn validates_non_scoring_phases_too() {
        let err = compute_domain_scores(&[SubmittedVisionResponse {
            phase: VisionPhase::FuturePartner,
            question_id: 1,
            value: 999,
            metadata: None,
        }])
        .unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));

        let err = compute_domain_scores(&[SubmittedVisionResponse {
            phase: VisionPhase::HorizonScan,
            question_id: 0,
            value: 3,
            metadata: None,
        }])
        .unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn primary_domain_ties_break_alphabetically() {
        let scores = compute_domain_scores(&[values(1, 5), values(19, 5)]).unwrap();
        // avontuur_verkenning and carriere_betekenis both at 50
        assert_eq!(primary_domain(&scores), VisionDomain::AvontuurVerkenning);
    }

    #[test]
    fn fallback_predictions_come_from_domain_scores() {
        let scores =
            compute_domain_scores(&[values(1, 5), values(2, 5), values(13, 4), values(14, 2)])
                .unwrap();
        let primary = primary_domain(&scores);
        let analysis = fallback_analysis(&scores, primary);
        assert_eq!(analysis.compatibility_predictions.ambitie, 100);
        assert_eq!(
            analysis.compatibility_predictions.energie_niveau,
            scores[&VisionDomain::SocialeEnergie]
        );
    }

    #[test]
    fn fallback_fills_every_field_for_every_domain() {
        let scores = compute_domain_scores(&[values(1, 3)]).unwrap();
        for domain in VisionDomain::iter() {
            let analysis = fallback_analysis(&scores, domain);
            assert!(!analysis.levensvisie_profiel.samenvatting.is_empty());
            assert!(!analysis.levensvisie_profiel.kernwaarden.is_empty());
            assert!(!analysis.toekomst_kompas.noord.is_empty());
            assert!(!analysis.levensrichting_analyse.is_empty());
            assert!(!analysis.toekomst_partner_profiel.is_empty());
            assert!(!analysis.dating_strategy.beste_date_types.is_empty());
            assert!(!analysis.communicatie_scripts.is_empty());
            assert!(!analysis.zelfreflectie_prompts.is_empty());
        }
    }
}
