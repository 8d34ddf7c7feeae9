//! Guided run through the 36 connection questions (Aron et al.), three
//! sets of twelve with a forward-only cursor per session.

use db::{
    DBService,
    models::connection::{
        ConnectionAnswer, ConnectionSession, ConnectionSessionWithCount,
    },
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use utils::auth::AuthUser;
use uuid::Uuid;

use super::AssessmentError;

pub const QUESTIONS_PER_SET: i32 = 12;
pub const TOTAL_SETS: i32 = 3;
pub const TOTAL_QUESTIONS: i32 = QUESTIONS_PER_SET * TOTAL_SETS;

const SESSION_LIST_LIMIT: i64 = 10;
const INFO_SESSION_LIMIT: i64 = 5;

struct QuestionSet {
    title: &'static str,
    focus: &'static str,
    questions: [&'static str; 12],
}

const QUESTION_SETS: [QuestionSet; 3] = [
    QuestionSet {
        title: "Set 1: Oppervlakkige Verkenning",
        focus: "Kennismaken en oppervlakkige uitwisseling",
        questions: [
            "Als je iedereen ter wereld zou kunnen kiezen, wie zou je dan als diner gast willen hebben?",
            "Zou je beroemd willen zijn? Op welke manier?",
            "Voordat je een telefoontje pleegt, repeteer je soms wat je gaat zeggen? Waarom?",
            "Wat zou voor jou een \"perfecte\" dag zijn?",
            "Wanneer heb je voor het laatst voor jezelf gezongen? En voor iemand anders?",
            "Als je 90 zou worden en je kon vanaf je 30e het lichaam of de geest van een 30-jarige behouden, welke zou je kiezen?",
            "Heb je een geheim voorgevoel over hoe je zult sterven?",
            "Noem drie dingen die jij en je gesprekspartner gemeen lijken te hebben.",
            "Waar in je leven ben je het meest dankbaar voor?",
            "Als je iets zou kunnen veranderen aan hoe je bent opgevoed, wat zou dat zijn?",
            "Neem vier minuten en vertel je levensverhaal met zoveel mogelijk detail.",
            "Als je morgen wakker zou worden met één nieuwe kwaliteit of vaardigheid, welke zou je willen hebben?",
        ],
    },
    QuestionSet {
        title: "Set 2: Persoonlijke Verdieping",
        focus: "Persoonlijke waarden en ervaringen delen",
        questions: [
            "Als een kristallen bol je de waarheid zou kunnen vertellen over jezelf, je leven, de toekomst, of wat dan ook, wat zou je willen weten?",
            "Is er iets wat je al lang wilt doen? Waarom heb je het nog niet gedaan?",
            "Wat is de grootste prestatie in je leven?",
            "Wat waardeer je het meest in een vriendschap?",
            "Wat is je meest gekoesterde herinnering?",
            "Wat is je meest vreselijke herinnering?",
            "Als je wist dat je over een jaar plotseling zou sterven, zou je dan iets veranderen aan de manier waarop je nu leeft? Waarom?",
            "Wat betekent vriendschap voor jou?",
            "Welke rol spelen liefde en genegenheid in je leven?",
            "Deel afwisselend iets wat je als een positieve eigenschap van je gesprekspartner beschouwt. Deel in totaal vijf dingen.",
            "Hoe hecht is je familie? Denk je dat je jeugd gelukkiger was dan die van anderen?",
            "Hoe voel je je over je relatie met je moeder?",
        ],
    },
    QuestionSet {
        title: "Set 3: Wederzijdse Kwetsbaarheid",
        focus: "Diepe kwetsbaarheid en wederzijdse reflectie",
        questions: [
            "Maak drie \"wij\" uitspraken. Bijvoorbeeld: \"Wij zijn allebei in deze kamer en voelen...\"",
            "Maak de zin af: \"Ik zou willen dat ik iemand had met wie ik ... kon delen.\"",
            "Als je een hechte vriend zou worden met je gesprekspartner, deel dan wat belangrijk voor hem/haar zou zijn om te weten.",
            "Vertel je gesprekspartner wat je leuk aan hem/haar vindt. Wees heel eerlijk en zeg dingen die je normaal niet zou zeggen tegen iemand die je net hebt ontmoet.",
            "Deel een gênant moment uit je leven met je gesprekspartner.",
            "Wanneer heb je voor het laatst gehuild in het bijzijn van een ander? En alleen?",
            "Vertel je gesprekspartner iets wat je nu al leuk aan hem/haar vindt.",
            "Wat, als er iets is, is te serieus om grappen over te maken?",
            "Als je vanavond zou sterven zonder de mogelijkheid om met iemand te communiceren, wat zou je het meest betreuren niet te hebben gezegd? Waarom heb je het nog niet gezegd?",
            "Je huis met alles wat je bezit vat vlam. Nadat je je geliefden en huisdieren hebt gered, heb je tijd om één ding veilig op te halen. Wat zou dat zijn? Waarom?",
            "Van alle mensen in je familie, wiens dood zou je het meest verontrustend vinden? Waarom?",
            "Deel een persoonlijk probleem en vraag je gesprekspartner om advies. Vraag hem/haar ook om te reflecteren op hoe je lijkt te voelen over het probleem.",
        ],
    },
];

const START_TIP: &str = "Neem de tijd voor deze vraag. Luister echt naar het antwoord van de ander voordat je zelf antwoordt.";

const COMPLETION_TIP: &str = "Gefeliciteerd! Jullie hebben alle 36 vragen doorlopen. Neem nu 4 minuten om in elkaars ogen te kijken zonder te praten.";

const SET_TIPS: [[&str; 6]; 3] = [
    [
        "Begin rustig. Deze vragen helpen je de ander beter te leren kennen.",
        "Luister actief - stel vervolgvragen over het antwoord.",
        "Wees eerlijk, ook als het antwoord simpel lijkt.",
        "Neem de tijd om na te denken voordat je antwoordt.",
        "Kijk de ander aan tijdens het luisteren.",
        "Deel ook je eigen antwoord - dit is een tweerichtingsproces.",
    ],
    [
        "Nu wordt het persoonlijker. Wees open voor wat komt.",
        "Oordeel niet over de antwoorden van de ander.",
        "Het is OK om even stil te zijn en na te denken.",
        "Vraag door als iets je nieuwsgierig maakt.",
        "Deel je echte gevoelens, niet wat je denkt dat \"goed\" klinkt.",
        "Herinner je dat kwetsbaarheid verbinding creëert.",
    ],
    [
        "Dit is het diepste niveau. Neem alle tijd die je nodig hebt.",
        "Wees moedig - echte verbinding vraagt echte eerlijkheid.",
        "Het is normaal om je ongemakkelijk te voelen.",
        "Bedank de ander voor het delen.",
        "Houd oogcontact - het verdiept de connectie.",
        "Na vraag 36: kijk 4 minuten in stilte in elkaars ogen.",
    ],
];

fn random_tip(set: i32) -> String {
    let idx = (set.clamp(1, TOTAL_SETS) - 1) as usize;
    let tips = &SET_TIPS[idx];
    tips[rand::thread_rng().gen_range(0..tips.len())].to_string()
}

/// 1-based (set, question) position within the 36 questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub set: i32,
    pub question: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(Cursor),
    Complete,
}

impl Cursor {
    pub fn new(set: i32, question: i32) -> Option<Self> {
        ((1..=TOTAL_SETS).contains(&set) && (1..=QUESTIONS_PER_SET).contains(&question))
            .then_some(Self { set, question })
    }

    pub fn global_number(self) -> i32 {
        (self.set - 1) * QUESTIONS_PER_SET + self.question
    }

    pub fn percentage(self) -> i32 {
        ((self.global_number() as f64 / TOTAL_QUESTIONS as f64) * 100.0).round() as i32
    }

    /// Position after answering the current question.
    pub fn advance(self) -> Advance {
        if self.question < QUESTIONS_PER_SET {
            Advance::Next(Self {
                set: self.set,
                question: self.question + 1,
            })
        } else if self.set < TOTAL_SETS {
            Advance::Next(Self {
                set: self.set + 1,
                question: 1,
            })
        } else {
            Advance::Complete
        }
    }

    fn text(self) -> &'static str {
        QUESTION_SETS[(self.set - 1) as usize].questions[(self.question - 1) as usize]
    }

    fn set_title(self) -> &'static str {
        QUESTION_SETS[(self.set - 1) as usize].title
    }
}

fn session_cursor(session: &ConnectionSession) -> Result<Cursor, AssessmentError> {
    Cursor::new(session.current_set, session.current_question).ok_or_else(|| {
        AssessmentError::InvalidResponse(format!(
            "session {} has corrupt cursor ({}, {})",
            session.id, session.current_set, session.current_question
        ))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInfo {
    pub number: i32,
    pub text: String,
    pub set: String,
    pub set_number: i32,
    pub question_in_set: i32,
    pub total_in_set: i32,
    pub is_last_in_set: bool,
    pub is_complete: bool,
}

impl QuestionInfo {
    fn at(cursor: Cursor) -> Self {
        Self {
            number: cursor.global_number(),
            text: cursor.text().to_string(),
            set: cursor.set_title().to_string(),
            set_number: cursor.set,
            question_in_set: cursor.question,
            total_in_set: QUESTIONS_PER_SET,
            is_last_in_set: cursor.question == QUESTIONS_PER_SET,
            is_complete: cursor.set == TOTAL_SETS && cursor.question == QUESTIONS_PER_SET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_question: i32,
    pub total_questions: i32,
    pub percentage: i32,
}

impl Progress {
    fn at(cursor: Cursor) -> Self {
        Self {
            current_question: cursor.global_number(),
            total_questions: TOTAL_QUESTIONS,
            percentage: cursor.percentage(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    pub session: ConnectionSession,
    pub question: QuestionInfo,
    pub tip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub is_complete: bool,
    pub progress: Progress,
    pub next_question: Option<QuestionInfo>,
    pub tip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub partner_name: String,
    pub status: db::models::AssessmentStatus,
    pub progress: Progress,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl SessionSummary {
    fn from_row(row: &ConnectionSessionWithCount) -> Result<Self, AssessmentError> {
        let cursor = Cursor::new(row.current_set, row.current_question).ok_or_else(|| {
            AssessmentError::InvalidResponse(format!(
                "session {} has corrupt cursor ({}, {})",
                row.id, row.current_set, row.current_question
            ))
        })?;
        Ok(Self {
            id: row.id,
            partner_name: row.partner_name.clone(),
            status: row.status,
            progress: Progress::at(cursor),
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SetInfo {
    pub number: i32,
    pub title: String,
    pub question_count: i32,
    pub focus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireInfo {
    pub title: String,
    pub description: String,
    pub sets: Vec<SetInfo>,
    pub total_questions: i32,
    pub estimated_time: String,
}

pub fn questionnaire_info() -> QuestionnaireInfo {
    QuestionnaireInfo {
        title: "36 Vragen om Dieper te Verbinden".to_string(),
        description: "Gebaseerd op het psychologische onderzoek van Dr. Arthur Aron. Deze vragen zijn ontworpen om intimiteit en verbinding op te bouwen tussen twee mensen.".to_string(),
        sets: QUESTION_SETS
            .iter()
            .enumerate()
            .map(|(i, set)| SetInfo {
                number: i as i32 + 1,
                title: set.title.to_string(),
                question_count: QUESTIONS_PER_SET,
                focus: set.focus.to_string(),
            })
            .collect(),
        total_questions: TOTAL_QUESTIONS,
        estimated_time: "45-90 minuten".to_string(),
    }
}

#[derive(Clone)]
pub struct ConnectionQuestionsService {
    db: DBService,
}

impl ConnectionQuestionsService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub async fn start_session(
        &self,
        user: &AuthUser,
        partner_name: Option<&str>,
    ) -> Result<StartedSession, AssessmentError> {
        let partner_name = partner_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Partner");
        let session =
            ConnectionSession::create(&self.db.pool, Uuid::new_v4(), user.id, partner_name)
                .await?;
        info!(session_id = %session.id, user_id = %user.id, "connection session started");

        let cursor = session_cursor(&session)?;
        Ok(StartedSession {
            session,
            question: QuestionInfo::at(cursor),
            tip: START_TIP.to_string(),
        })
    }

    pub async fn get_question(
        &self,
        user: &AuthUser,
        session_id: Uuid,
    ) -> Result<QuestionInfo, AssessmentError> {
        let session = ConnectionSession::find_owned(&self.db.pool, session_id, user.id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        Ok(QuestionInfo::at(session_cursor(&session)?))
    }

    /// Store the answer for the question under the cursor and advance it.
    /// Runs in one transaction with the session row locked, so concurrent
    /// answers for the same session serialize cleanly.
    pub async fn answer_question(
        &self,
        user: &AuthUser,
        session_id: Uuid,
        answer: &str,
    ) -> Result<AnswerOutcome, AssessmentError> {
        if answer.trim().is_empty() {
            return Err(AssessmentError::InvalidResponse(
                "answer must not be empty".to_string(),
            ));
        }

        let mut tx = self.db.pool.begin().await?;

        let session = ConnectionSession::find_owned_for_update(&mut tx, session_id, user.id)
            .await?
            .ok_or(AssessmentError::NotFound)?;
        if session.completed_at.is_some() {
            return Err(AssessmentError::AlreadyCompleted);
        }

        let cursor = session_cursor(&session)?;
        ConnectionAnswer::create(&mut *tx, session_id, cursor.global_number(), answer).await?;

        let advance = cursor.advance();
        match advance {
            Advance::Next(next) => {
                ConnectionSession::advance_cursor(&mut *tx, session_id, next.set, next.question)
                    .await?;
            }
            Advance::Complete => {
                ConnectionSession::mark_completed(&mut *tx, session_id).await?;
            }
        }
        tx.commit().await?;

        Ok(match advance {
            Advance::Next(next) => AnswerOutcome {
                is_complete: false,
                progress: Progress::at(cursor),
                next_question: Some(QuestionInfo::at(next)),
                tip: random_tip(next.set),
            },
            Advance::Complete => {
                info!(session_id = %session_id, "connection session completed");
                AnswerOutcome {
                    is_complete: true,
                    progress: Progress::at(cursor),
                    next_question: None,
                    tip: COMPLETION_TIP.to_string(),
                }
            }
        })
    }

    pub async fn get_progress(
        &self,
        user: &AuthUser,
        session_id: Uuid,
    ) -> Result<ConnectionSessionWithCount, AssessmentError> {
        ConnectionSession::find_owned_with_count(&self.db.pool, session_id, user.id)
            .await?
            .ok_or(AssessmentError::NotFound)
    }

    pub async fn get_sessions(
        &self,
        user: &AuthUser,
    ) -> Result<Vec<SessionSummary>, AssessmentError> {
        let rows =
            ConnectionSession::list_by_user(&self.db.pool, user.id, SESSION_LIST_LIMIT).await?;
        rows.iter().map(SessionSummary::from_row).collect()
    }

    /// Static questionnaire description, plus recent sessions when a user
    /// is known. The description itself is public.
    pub async fn info(
        &self,
        user: Option<&AuthUser>,
    ) -> Result<(QuestionnaireInfo, Option<Vec<SessionSummary>>), AssessmentError> {
        let info = questionnaire_info();
        let sessions = match user {
            Some(user) => {
                let rows =
                    ConnectionSession::list_by_user(&self.db.pool, user.id, INFO_SESSION_LIMIT)
                        .await?;
                Some(
                    rows.iter()
                        .map(SessionSummary::from_row)
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            None => None,
        };
        Ok((info, sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_set_holds_twelve_questions() {
        for set in &QUESTION_SETS {
            assert_eq!(set.questions.len(), 12);
        }
    }

    #[test]
    fn cursor_advances_within_a_set() {
        let cursor = Cursor::new(1, 5).unwrap();
        assert_eq!(cursor.advance(), Advance::Next(Cursor::new(1, 6).unwrap()));
    }

    #[test]
    fn twelfth_answer_rolls_into_the_next_set() {
        let cursor = Cursor::new(1, 12).unwrap();
        assert_eq!(cursor.advance(), Advance::Next(Cursor::new(2, 1).unwrap()));
        let cursor = Cursor::new(2, 12).unwrap();
        assert_eq!(cursor.advance(), Advance::Next(Cursor::new(3, 1).unwrap()));
    }

    #[test]
    fn final_question_completes_the_session() {
        let cursor = Cursor::new(3, 12).unwrap();
        assert_eq!(cursor.advance(), Advance::Complete);
    }

    #[test]
    fn global_numbering_spans_all_sets() {
        assert_eq!(Cursor::new(1, 1).unwrap().global_number(), 1);
        assert_eq!(Cursor::new(1, 12).unwrap().global_number(), 12);
        assert_eq!(Cursor::new(2, 1).unwrap().global_number(), 13);
        assert_eq!(Cursor::new(3, 12).unwrap().global_number(), 36);
    }

    #[test]
    fn percentage_rounds_to_whole_points() {
        assert_eq!(Cursor::new(1, 12).unwrap().percentage(), 33);
        assert_eq!(Cursor::new(2, 6).unwrap().percentage(), 50);
        assert_eq!(Cursor::new(3, 12).unwrap().percentage(), 100);
    }

    #[test]
    fn out_of_range_cursors_are_rejected() {
        assert!(Cursor::new(0, 1).is_none());
        assert!(Cursor::new(4, 1).is_none());
        assert!(Cursor::new(1, 0).is_none());
        assert!(Cursor::new(1, 13).is_none());
    }

    #[test]
    fn question_info_flags_set_and_run_boundaries() {
        let info = QuestionInfo::at(Cursor::new(1, 12).unwrap());
        assert!(info.is_last_in_set);
        assert!(!info.is_complete);

        let info = QuestionInfo::at(Cursor::new(3, 12).unwrap());
        assert!(info.is_last_in_set);
        assert!(info.is_complete);
    }

    #[test]
    fn tips_come_from_the_cursor_set() {
        for set in 1..=TOTAL_SETS {
            let tip = random_tip(set);
            assert!(SET_TIPS[(set - 1) as usize].contains(&tip.as_str()));
        }
    }

    #[test]
    fn info_lists_three_sets() {
        let info = questionnaire_info();
        assert_eq!(info.sets.len(), 3);
        assert_eq!(info.total_questions, 36);
        assert_eq!(info.sets[2].title, "Set 3: Wederzijdse Kwetsbaarheid");
    }
}
