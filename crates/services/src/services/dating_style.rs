//! Dating-style scan: deterministic scoring plus AI narrative generation.

use std::collections::{BTreeMap, BTreeSet};

use db::{
    DBService,
    models::dating_style::{
        ChatScripts, DatingStyleAnalysis, DatingStyleAssessment, DatingStyleResponse,
        DatingStyleResult, MatchFilters, MicroExercise, MicroExercises, MicroIntake, QuestionKind,
        StyleCategory, StyleScores, SubmittedResponse,
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
const SCENARIO_CHOICES: i32 = 3;

/// Rough maximum raw accumulation per style, matching the original
/// calibration of the questionnaire.
const MAX_RAW_PER_STYLE: f64 = 300.0;

/// Weight of one statement question: which style it feeds and whether the
/// Likert value is reverse-scored (`(6 - value) * 10` instead of
/// `value * 10`).
struct StatementWeight {
    question_id: i32,
    category: StyleCategory,
    reverse: bool,
}

const STATEMENT_WEIGHTS: &[StatementWeight] = &[
    // communicatie_stijl
    StatementWeight { question_id: 1, category: StyleCategory::Initiator, reverse: false },
    StatementWeight { question_id: 2, category: StyleCategory::OverSharer, reverse: false },
    StatementWeight { question_id: 3, category: StyleCategory::Distant, reverse: true },
    // date_aanpak
    StatementWeight { question_id: 4, category: StyleCategory::Planner, reverse: false },
    StatementWeight { question_id: 5, category: StyleCategory::Adventurer, reverse: false },
    StatementWeight { question_id: 6, category: StyleCategory::Selector, reverse: false },
    // relatie_verwachtingen
    StatementWeight { question_id: 7, category: StyleCategory::Initiator, reverse: false },
    StatementWeight { question_id: 8, category: StyleCategory::Pleaser, reverse: false },
    StatementWeight { question_id: 9, category: StyleCategory::Distant, reverse: false },
    // conflict_afhandeling
    StatementWeight { question_id: 10, category: StyleCategory::Initiator, reverse: false },
    StatementWeight { question_id: 11, category: StyleCategory::Distant, reverse: false },
    // zelfvertrouwen
    StatementWeight { question_id: 12, category: StyleCategory::Initiator, reverse: false },
    StatementWeight { question_id: 13, category: StyleCategory::Pleaser, reverse: true },
    // grenzen
    StatementWeight { question_id: 14, category: StyleCategory::Initiator, reverse: false },
    StatementWeight { question_id: 15, category: StyleCategory::Pleaser, reverse: false },
    // modern_dating
    StatementWeight { question_id: 16, category: StyleCategory::Adventurer, reverse: false },
];

/// Scenario questions award fixed points per discrete choice.
fn scenario_points(question_id: i32, choice: i32) -> Option<&'static [(StyleCategory, i32)]> {
    match (question_id, choice) {
        // spontaneous-date scenario
        (17, 1) => Some(&[(StyleCategory::Adventurer, 90)]),
        (17, 2) => Some(&[(StyleCategory::Planner, 90)]),
        (17, 3) => Some(&[(StyleCategory::Selector, 90)]),
        // awkward-conversation scenario
        (18, 1) => Some(&[(StyleCategory::OverSharer, 85)]),
        (18, 2) => Some(&[(StyleCategory::Pleaser, 85)]),
        (18, 3) => Some(&[(StyleCategory::Distant, 80), (StyleCategory::GhostProne, 80)]),
        _ => None,
    }
}

pub fn question_kind(question_id: i32) -> Option<QuestionKind> {
    match question_id {
        1..=16 => Some(QuestionKind::Statement),
        17 | 18 => Some(QuestionKind::Scenario),
        _ => None,
    }
}

/// Accumulate raw (pre-normalization) scores. Rejects unknown question ids
/// and out-of-range values so nothing malformed reaches persistence.
fn accumulate_raw(
    responses: &[SubmittedResponse],
) -> Result<BTreeMap<StyleCategory, i32>, AssessmentError> {
    let mut raw: BTreeMap<StyleCategory, i32> =
        StyleCategory::iter().map(|c| (c, 0)).collect();
    let mut seen = BTreeSet::new();

    for response in responses {
        if !seen.insert(response.question_id) {
            return Err(AssessmentError::InvalidResponse(format!(
                "duplicate question id {}",
                response.question_id
            )));
        }
        match question_kind(response.question_id) {
            Some(QuestionKind::Statement) => {
                if !(LIKERT_MIN..=LIKERT_MAX).contains(&response.value) {
                    return Err(AssessmentError::InvalidResponse(format!(
                        "question {}: likert value {} out of range 1-5",
                        response.question_id, response.value
                    )));
                }
                let weight = STATEMENT_WEIGHTS
                    .iter()
                    .find(|w| w.question_id == response.question_id)
                    .expect("statement weight table covers questions 1-16");
                let points = if weight.reverse {
                    (6 - response.value) * 10
                } else {
                    response.value * 10
                };
                *raw.get_mut(&weight.category).expect("all categories present") += points;
            }
            Some(QuestionKind::Scenario) => {
                if !(1..=SCENARIO_CHOICES).contains(&response.value) {
                    return Err(AssessmentError::InvalidResponse(format!(
                        "question {}: scenario choice {} out of range 1-3",
                        response.question_id, response.value
                    )));
                }
                let awards = scenario_points(response.question_id, response.value)
                    .expect("scenario table covers questions 17-18 choices 1-3");
                for (category, points) in awards {
                    *raw.get_mut(category).expect("all categories present") += points;
                }
            }
            None => {
                return Err(AssessmentError::InvalidResponse(format!(
                    "unknown question id {}",
                    response.question_id
                )));
            }
        }
    }

    Ok(raw)
}

fn normalize(raw: i32) -> i32 {
    ((raw as f64 / MAX_RAW_PER_STYLE) * 100.0).round().min(100.0) as i32
}

/// Compute normalized scores and pick the primary style. Pure and
/// deterministic: ties break alphabetically by category name.
pub fn compute_scores(responses: &[SubmittedResponse]) -> Result<StyleScores, AssessmentError> {
    let raw = accumulate_raw(responses)?;

    let mut ranked: Vec<(StyleCategory, i32)> = raw
        .iter()
        .map(|(&category, &points)| (category, normalize(points)))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.to_string().cmp(&b.0.to_string()))
    });
    let primary_style = ranked[0].0;

    let score = |category: StyleCategory| normalize(raw[&category]);
    Ok(StyleScores {
        initiator: score(StyleCategory::Initiator),
        planner: score(StyleCategory::Planner),
        adventurer: score(StyleCategory::Adventurer),
        selector: score(StyleCategory::Selector),
        pleaser: score(StyleCategory::Pleaser),
        distant: score(StyleCategory::Distant),
        over_sharer: score(StyleCategory::OverSharer),
        ghost_prone: score(StyleCategory::GhostProne),
        primary_style,
    })
}

/// Static per-style fragments used by both the prompt framing and the
/// fallback narrative. The exhaustive match makes a missing style a
/// compile error rather than a runtime hole.
struct StyleTexts {
    gedrag: &'static str,
    modern: &'static str,
    sterk: &'static str,
    aandacht: &'static str,
    date_voorkeur: &'static str,
    vermijd: &'static str,
    eerste_bericht: &'static str,
}

fn style_texts(style: StyleCategory) -> StyleTexts {
    match style {
        StyleCategory::Initiator => StyleTexts {
            gedrag: "de leiding te nemen en initiatief te tonen",
            modern: "hoe snel je eerste berichten stuurt en gesprekken initieert",
            sterk: "Neemt initiatief en toont interesse duidelijk",
            aandacht: "Kan soms te dominant overkomen",
            date_voorkeur: "Actieve dates zoals wandelen en praten",
            vermijd: "Te passieve, saaie activiteiten",
            eerste_bericht: "Hey! Zag je profiel en moest meteen een berichtje sturen. Wat is het leukste wat je deze week hebt gedaan?",
        },
        StyleCategory::Planner => StyleTexts {
            gedrag: "alles zorgvuldig te plannen en organiseren",
            modern: "je voorkeur voor georganiseerde dates en duidelijke planning",
            sterk: "Organiseert en plant zorgvuldig",
            aandacht: "Kan te rigide zijn in planning",
            date_voorkeur: "Geplande uitjes zoals restaurant of museum",
            vermijd: "Chaos en gebrek aan planning",
            eerste_bericht: "Hoi! Je profiel sprak me aan. Wat doe je in het weekend?",
        },
        StyleCategory::Adventurer => StyleTexts {
            gedrag: "open te staan voor spontaniteit en avontuur",
            modern: "je enthousiasme voor spontane ontmoetingen en nieuwe ervaringen",
            sterk: "Open voor nieuwe ervaringen en spontaniteit",
            aandacht: "Kan moeite hebben met commitment",
            date_voorkeur: "Spontane avonturen zoals een stedentrip",
            vermijd: "Te formele, stijve gelegenheden",
            eerste_bericht: "Hey! Zin in iets spontaans dit weekend?",
        },
        StyleCategory::Selector => StyleTexts {
            gedrag: "selectief te zijn en hoge eisen te stellen",
            modern: "je zorgvuldige screening van matches voordat je investeert",
            sterk: "Weet precies wat hij/zij wil",
            aandacht: "Kan te kritisch zijn",
            date_voorkeur: "Kwalitatieve gesprekken bij koffie",
            vermijd: "Te oppervlakkige ontmoetingen",
            eerste_bericht: "Hoi! Ik zag dat we allebei van [interesse] houden. Hoe ben je daarmee begonnen?",
        },
        StyleCategory::Pleaser => StyleTexts {
            gedrag: "je aan te passen aan wat de ander wil",
            modern: "hoe je je aanpast aan de communicatie stijl van de ander",
            sterk: "Stelt de ander op gemak",
            aandacht: "Verliest eigen wensen uit het oog",
            date_voorkeur: "Ontspannen sfeer waar je jezelf kunt zijn",
            vermijd: "Situaties waar je niet tot je recht komt",
            eerste_bericht: "Hoi! Wat voor plekken vind jij fijn voor een eerste afspraak?",
        },
        StyleCategory::Distant => StyleTexts {
            gedrag: "afstand te houden tot er zekerheid is",
            modern: "je voorzichtige aanpak en behoefte aan zekerheid",
            sterk: "Bewaakt eigen tempo en grenzen",
            aandacht: "Kan gereserveerd overkomen",
            date_voorkeur: "Rustige een-op-een ontmoetingen",
            vermijd: "Te drukke gelegenheden",
            eerste_bericht: "Hoi! Ik vind dit gesprek leuk, maar ik doe het graag rustig aan.",
        },
        StyleCategory::OverSharer => StyleTexts {
            gedrag: "veel van jezelf te delen",
            modern: "hoe open je bent over gevoelens en ervaringen",
            sterk: "Open en expressief over gevoelens",
            aandacht: "Deelt soms te veel te vroeg",
            date_voorkeur: "Persoonlijke gesprekken",
            vermijd: "Onpersoonlijke settings",
            eerste_bericht: "Ik vind het interessant hoe je over je werk praat. Ikzelf heb laatst een grote verandering doorgemaakt...",
        },
        StyleCategory::GhostProne => StyleTexts {
            gedrag: "terughoudend te zijn met communicatie",
            modern: "je neiging om af te haken bij ongemak",
            sterk: "Voelt eigen grenzen goed aan",
            aandacht: "Haakt af in plaats van uit te spreken",
            date_voorkeur: "Laagdrempelige korte ontmoetingen",
            vermijd: "Oncomfortabele situaties zonder uitweg",
            eerste_bericht: "Hoi! Korte vraag: wat is jouw ideale zondag?",
        },
    }
}

/// Deterministic narrative used when the external generation fails. Every
/// schema field is populated.
pub fn fallback_analysis(scores: &StyleScores, intake: &MicroIntake) -> DatingStyleAnalysis {
    let style = scores.primary_style;
    let texts = style_texts(style);

    DatingStyleAnalysis {
        stijl_profiel: format!(
            "Je primaire dating stijl is **{}** ({}% match). Dit betekent dat je in dating situaties geneigd bent om {}.",
            style.display_name(),
            scores.score(style),
            texts.gedrag
        ),
        moderne_dating_analyse: format!(
            "In het moderne dating landschap komt deze stijl vooral tot uiting in {}.",
            texts.modern
        ),
        sterke_punten: vec![
            texts.sterk.to_string(),
            "Betrouwbaar in eigen gedragspatroon".to_string(),
            "Heldere communicatiestijl".to_string(),
        ],
        aandachtspunten: vec![
            texts.aandacht.to_string(),
            "Flexibiliteit in andere stijlen".to_string(),
            "Bewustzijn van eigen patronen".to_string(),
        ],
        date_voorkeuren: vec![
            texts.date_voorkeur.to_string(),
            "Kwalitatieve gesprekken".to_string(),
            "Ontspannen sfeer waar je jezelf kunt zijn".to_string(),
        ],
        vermijd_dates: vec![
            texts.vermijd.to_string(),
            "Onpersoonlijke settings".to_string(),
            "Situaties waar je niet tot je recht komt".to_string(),
        ],
        chat_scripts: ChatScripts {
            eerste_bericht: texts.eerste_bericht.to_string(),
            diepte_gesprek: "Vertel eens meer over wat jou echt bezighoudt?".to_string(),
            grens_stellen: "Bedankt voor het compliment, maar ik wil het graag rustig aan doen."
                .to_string(),
        },
        micro_exercises: MicroExercises {
            stijl_bewustzijn: MicroExercise {
                titel: "Stijl Bewustzijn (5 min/dag)".to_string(),
                beschrijving: "Reflecteer dagelijks op je dating gedrag".to_string(),
                stappen: vec![
                    "Noteer 1 dating interactie".to_string(),
                    "Analyseer je gedrag".to_string(),
                    "Bedenk 1 alternatief".to_string(),
                ],
            },
            flexibiliteit_training: MicroExercise {
                titel: "Flexibiliteit Training".to_string(),
                beschrijving: "Probeer eens een andere aanpak".to_string(),
                stappen: vec![
                    "Kies 1 situatie".to_string(),
                    "Probeer de tegengestelde stijl".to_string(),
                    "Reflecteer op het gevoel".to_string(),
                ],
            },
            grens_experiment: MicroExercise {
                titel: "Grens Experiment".to_string(),
                beschrijving: "Oefen met duidelijke communicatie".to_string(),
                stappen: vec![
                    "Identificeer een grens".to_string(),
                    "Oefen het uitspreken".to_string(),
                    "Observeer de reactie".to_string(),
                ],
            },
        },
        match_filters: MatchFilters {
            communicatie_stijl: match style {
                StyleCategory::OverSharer => "Open en expressieve communicator".to_string(),
                _ => "Betrouwbare communicator".to_string(),
            },
            energie_niveau: match style {
                StyleCategory::Adventurer => "Avontuurlijk en spontaan".to_string(),
                _ => "Stabiel en consistent".to_string(),
            },
            relatie_doelen: intake
                .gewenste_relatie_type
                .clone()
                .unwrap_or_else(|| "Serieus georiënteerd".to_string()),
            levensstijl: "Passend bij jouw dagelijkse routine".to_string(),
        },
    }
}

fn build_prompt(scores: &StyleScores, intake: &MicroIntake) -> String {
    format!(
        r#"Genereer een Nederlandse analyse voor een Dating Stijl Scan met deze scores:
- Initiator: {}%
- Planner: {}%
- Adventurer: {}%
- Selector: {}%
- Pleaser: {}%
- Distant: {}%
- Over Sharer: {}%
- Ghost Prone: {}%

Primaire stijl: {} ({})
Micro-intake: Dating status: {}, Gewenste relatie: {}, App gebruik: {}

Geef ALLEEN geldige JSON terug met exact deze velden:
{{
  "stijlProfiel": "Gedetailleerde beschrijving van de primaire dating stijl",
  "moderneDatingAnalyse": "Hoe deze stijl uitkomt in modern dating (apps, ghosting, etc.)",
  "sterkePunten": ["3-4 sterke punten"],
  "aandachtspunten": ["3-4 aandachtspunten"],
  "dateVoorkeuren": ["3 ideale date types"],
  "vermijdDates": ["3 date types om te vermijden"],
  "chatScripts": {{ "eersteBericht": "...", "diepteGesprek": "...", "grensStellen": "..." }},
  "microExercises": {{
    "stijlBewustzijn": {{ "titel": "...", "beschrijving": "...", "stappen": ["..."] }},
    "flexibiliteitTraining": {{ "titel": "...", "beschrijving": "...", "stappen": ["..."] }},
    "grensExperiment": {{ "titel": "...", "beschrijving": "...", "stappen": ["..."] }}
  }},
  "matchFilters": {{ "communicatieStijl": "...", "energieNiveau": "...", "relatieDoelen": "...", "levensstijl": "..." }}
}}

Wees specifiek, behulpzaam en focus op moderne dating dynamieken."#,
        scores.initiator,
        scores.planner,
        scores.adventurer,
        scores.selector,
        scores.pleaser,
        scores.distant,
        scores.over_sharer,
        scores.ghost_prone,
        scores.primary_style,
        scores.primary_style.display_name(),
        intake.huidige_dating_status.as_deref().unwrap_or("onbekend"),
        intake.gewenste_relatie_type.as_deref().unwrap_or("onbekend"),
        intake.app_gebruik.as_deref().unwrap_or("onbekend"),
    )
}

const SYSTEM_PROMPT: &str = "Je bent een Nederlandse dating coach. Antwoord uitsluitend met geldige JSON die exact het gevraagde schema volgt.";

/// Outcome of a completed submit: the persisted row plus the typed
/// scores and analysis for the response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DatingStyleOutcome {
    pub result: DatingStyleResult,
    pub scores: StyleScores,
    pub analysis: DatingStyleAnalysis,
}

#[derive(Clone)]
pub struct DatingStyleService {
    db: DBService,
    client: OpenRouterClient,
    guard: GenerationGuard,
}

impl DatingStyleService {
    pub fn new(db: DBService, client: OpenRouterClient, guard: GenerationGuard) -> Self {
        Self { db, client, guard }
    }

    pub async fn start(
        &self,
        user: &AuthUser,
        intake: &MicroIntake,
    ) -> Result<DatingStyleAssessment, AssessmentError> {
        let assessment =
            DatingStyleAssessment::create(&self.db.pool, Uuid::new_v4(), user.id, intake).await?;
        info!(assessment_id = %assessment.id, user_id = %user.id, "dating-style assessment started");
        Ok(assessment)
    }

    /// Terminal submit: validate, score, generate the narrative (outside
    /// any transaction), then persist responses + result + completion
    /// atomically.
    pub async fn submit(
        &self,
        user: &AuthUser,
        assessment_id: Uuid,
        responses: &[SubmittedResponse],
    ) -> Result<DatingStyleOutcome, AssessmentError> {
        if responses.is_empty() {
            return Err(AssessmentError::InvalidResponse(
                "at least one response is required".to_string(),
            ));
        }

        let assessment = DatingStyleAssessment::find_by_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        if assessment.user_id != user.id {
            return Err(AssessmentError::Forbidden);
        }
        if assessment.completed_at.is_some() {
            return Err(AssessmentError::AlreadyCompleted);
        }

        // Reject malformed answers before anything is persisted.
        let scores = compute_scores(responses)?;
        let intake = assessment.intake();

        let _permit = self
            .guard
            .try_acquire(user.id)
            .ok_or(AssessmentError::GenerationInProgress)?;

        let analysis = self.generate_analysis(&scores, &intake).await;

        let mut tx = self.db.pool.begin().await?;
        for response in responses {
            let kind = question_kind(response.question_id)
                .expect("validated by compute_scores");
            DatingStyleResponse::create(&mut *tx, assessment_id, kind, response).await?;
        }
        let result = DatingStyleResult::create(&mut *tx, assessment_id, &scores, &analysis).await?;
        DatingStyleAssessment::mark_completed(&mut *tx, assessment_id).await?;
        tx.commit().await?;

        info!(
            assessment_id = %assessment_id,
            primary_style = %scores.primary_style,
            "dating-style assessment completed"
        );

        Ok(DatingStyleOutcome {
            result,
            scores,
            analysis,
        })
    }

    /// Never fails: any generation problem degrades to the deterministic
    /// fallback narrative.
    async fn generate_analysis(
        &self,
        scores: &StyleScores,
        intake: &MicroIntake,
    ) -> DatingStyleAnalysis {
        let prompt = build_prompt(scores, intake);
        match self
            .client
            .ask_json::<DatingStyleAnalysis>(
                &prompt,
                Some(SYSTEM_PROMPT),
                GenerationOptions {
                    temperature: 0.7,
                    max_tokens: 2000,
                },
            )
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "dating-style generation failed, using fallback narrative");
                fallback_analysis(scores, intake)
            }
        }
    }

    pub async fn get_result(
        &self,
        user: &AuthUser,
        assessment_id: Uuid,
    ) -> Result<DatingStyleResult, AssessmentError> {
        let assessment = DatingStyleAssessment::find_by_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        if assessment.user_id != user.id {
            return Err(AssessmentError::Forbidden);
        }
        DatingStyleResult::find_by_assessment_id(&self.db.pool, assessment_id)
            .await?
            .ok_or(AssessmentError::NotFound)
    }

    /// Most recent assessment for the user, with its result when completed.
    pub async fn latest_for_user(
        &self,
        user: &AuthUser,
    ) -> Result<Option<(DatingStyleAssessment, Option<DatingStyleResult>)>, AssessmentError> {
        let Some(assessment) =
            DatingStyleAssessment::find_latest_by_user(&self.db.pool, user.id).await?
        else {
            return Ok(None);
        };
        let result =
            DatingStyleResult::find_by_assessment_id(&self.db.pool, assessment.id).await?;
        Ok(Some((assessment, result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(question_id: i32, value: i32) -> SubmittedResponse {
        SubmittedResponse {
            question_id,
            value,
            time_ms: None,
        }
    }

    #[test]
    fn communication_block_accumulates_per_original_weights() {
        // all three communicatie_stijl questions answered with 5
        let raw = accumulate_raw(&[statement(1, 5), statement(2, 5), statement(3, 5)]).unwrap();
        assert_eq!(raw[&StyleCategory::Initiator], 50);
        assert_eq!(raw[&StyleCategory::OverSharer], 50);
        // q3 is reverse-scored: (6 - 5) * 10
        assert_eq!(raw[&StyleCategory::Distant], 10);
    }

    #[test]
    fn scenario_choices_award_fixed_points() {
        let raw = accumulate_raw(&[SubmittedResponse {
            question_id: 18,
            value: 3,
            time_ms: None,
        }])
        .unwrap();
        assert_eq!(raw[&StyleCategory::Distant], 80);
        assert_eq!(raw[&StyleCategory::GhostProne], 80);
    }

    #[test]
    fn scorer_is_deterministic() {
        let responses: Vec<_> = (1..=16)
            .map(|q| statement(q, ((q - 1) % 5) + 1))
            .chain([statement(17, 2), statement(18, 1)])
            .collect();
        let first = compute_scores(&responses).unwrap();
        let second = compute_scores(&responses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scores_stay_within_bounds() {
        // maximum everything: all statements at 5, both scenarios
        let responses: Vec<_> = (1..=16)
            .map(|q| statement(q, 5))
            .chain([statement(17, 1), statement(18, 1)])
            .collect();
        let scores = compute_scores(&responses).unwrap();
        for category in StyleCategory::iter() {
            let s = scores.score(category);
            assert!((0..=100).contains(&s), "{category} score {s} out of bounds");
        }
    }

    #[test]
    fn normalization_rounds_and_clamps() {
        assert_eq!(normalize(50), 17); // 50/300 -> 16.67 -> 17
        assert_eq!(normalize(0), 0);
        assert_eq!(normalize(300), 100);
        assert_eq!(normalize(400), 100);
    }

    #[test]
    fn tie_breaks_alphabetically() {
        // q5 feeds adventurer, q4 planner; same value means a tie.
        let scores = compute_scores(&[statement(4, 5), statement(5, 5)]).unwrap();
        assert_eq!(scores.primary_style, StyleCategory::Adventurer);
    }

    #[test]
    fn rejects_out_of_range_likert() {
        let err = compute_scores(&[statement(1, 6)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_unknown_question() {
        let err = compute_scores(&[statement(99, 3)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_out_of_range_scenario_choice() {
        let err = compute_scores(&[statement(17, 4)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_duplicate_question_ids_before_scoring() {
        // a double-submitted answer must fail validation, not double-count
        let err = compute_scores(&[statement(1, 5), statement(1, 5)]).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidResponse(_)));
    }

    #[test]
    fn fallback_fills_every_field_for_every_style() {
        let intake = MicroIntake::default();
        for style in StyleCategory::iter() {
            let scores = StyleScores {
                initiator: 10,
                planner: 10,
                adventurer: 10,
                selector: 10,
                pleaser: 10,
                distant: 10,
                over_sharer: 10,
                ghost_prone: 10,
                primary_style: style,
            };
            let analysis = fallback_analysis(&scores, &intake);
            assert!(!analysis.stijl_profiel.is_empty());
            assert!(!analysis.moderne_dating_analyse.is_empty());
            assert!(!analysis.sterke_punten.is_empty());
            assert!(!analysis.aandachtspunten.is_empty());
            assert!(!analysis.date_voorkeuren.is_empty());
            assert!(!analysis.vermijd_dates.is_empty());
            assert!(!analysis.chat_scripts.eerste_bericht.is_empty());
            assert!(!analysis.micro_exercises.stijl_bewustzijn.stappen.is_empty());
            assert!(!analysis.match_filters.relatie_doelen.is_empty());
        }
    }

    #[test]
    fn fallback_profile_names_the_primary_style() {
        let scores = compute_scores(&[statement(1, 5)]).unwrap();
        assert_eq!(scores.primary_style, StyleCategory::Initiator);
        let analysis = fallback_analysis(&scores, &MicroIntake::default());
        assert!(analysis.stijl_profiel.contains("Initiator"));
    }
}
