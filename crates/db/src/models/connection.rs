use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, PgConnection, PgPool, Postgres};
use ts_rs::TS;
use uuid::Uuid;

use super::AssessmentStatus;

/// One run through the 36 connection questions. The (set, question) pair
/// is the progress cursor; it only ever moves forward.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ConnectionSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_name: String,
    pub current_set: i32,
    pub current_question: i32,
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Session plus the number of answers stored so far.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ConnectionSessionWithCount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_name: String,
    pub current_set: i32,
    pub current_question: i32,
    pub status: AssessmentStatus,
    pub answered_count: i64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConnectionSession {
    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        partner_name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"INSERT INTO connection_sessions (id, user_id, partner_name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, partner_name, current_set, current_question,
                      status, created_at, completed_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(partner_name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, partner_name, current_set, current_question,
                      status, created_at, completed_at
               FROM connection_sessions
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Row-locked fetch for the answer transaction. Two concurrent
    /// `answer_question` calls for the same session serialize here instead
    /// of interleaving their cursor updates.
    pub async fn find_owned_for_update(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"SELECT id, user_id, partner_name, current_set, current_question,
                      status, created_at, completed_at
               FROM connection_sessions
               WHERE id = $1 AND user_id = $2
               FOR UPDATE"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn advance_cursor<'e, E>(
        executor: E,
        id: Uuid,
        next_set: i32,
        next_question: i32,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE connection_sessions SET current_set = $2, current_question = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(next_set)
        .bind(next_question)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn mark_completed<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE connection_sessions SET status = 'completed', completed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_owned_with_count(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ConnectionSessionWithCount>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionSessionWithCount>(
            r#"SELECT s.id, s.user_id, s.partner_name, s.current_set, s.current_question,
                      s.status, COUNT(a.id) AS answered_count, s.created_at, s.completed_at
               FROM connection_sessions s
               LEFT JOIN connection_answers a ON a.session_id = s.id
               WHERE s.id = $1 AND s.user_id = $2
               GROUP BY s.id"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConnectionSessionWithCount>, sqlx::Error> {
        sqlx::query_as::<_, ConnectionSessionWithCount>(
            r#"SELECT s.id, s.user_id, s.partner_name, s.current_set, s.current_question,
                      s.status, COUNT(a.id) AS answered_count, s.created_at, s.completed_at
               FROM connection_sessions s
               LEFT JOIN connection_answers a ON a.session_id = s.id
               WHERE s.user_id = $1
               GROUP BY s.id
               ORDER BY s.created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ConnectionAnswer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_number: i32,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl ConnectionAnswer {
    /// Append-only; unique (session, question number) rejects a second
    /// answer for the same question.
    pub async fn create<'e, E>(
        executor: E,
        session_id: Uuid,
        question_number: i32,
        answer: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"INSERT INTO connection_answers (id, session_id, question_number, answer)
            VALUES ($1, $2, $3, $4)"#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(question_number)
        .bind(answer)
        .execute(executor)
        .await?;
        Ok(())
    }
}
