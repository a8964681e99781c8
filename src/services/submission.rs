// src/services/submission.rs

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::AppError,
    models::submission::{ResultAnswer, SubmissionResult},
    services::{grading::grade_quiz, quiz::load_questions},
    utils::response::messages,
};

/// What the caller learns about a freshly recorded attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedSubmission {
    pub submission_id: i64,
    pub score: i64,
    pub total_questions: usize,
}

/// Grades an attempt and persists it atomically.
///
/// Inside one transaction: create the submission with a pending score, grade
/// the quiz's current question set, write one user answer per question, then
/// set the score exactly once. Nothing is visible to other readers until the
/// commit, and any error rolls the whole attempt back.
///
/// The quiz must exist; callers check that first.
pub async fn record_submission(
    pool: &SqlitePool,
    quiz_id: i64,
    user_id: i64,
    submitted: &HashMap<String, String>,
) -> Result<RecordedSubmission, AppError> {
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Failed to open submission transaction: {:?}", e);
        AppError::from(e)
    })?;

    let submission_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO user_submissions (quiz_id, user_id, score)
        VALUES (?, ?, NULL)
        RETURNING id
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create submission: {:?}", e);
        AppError::from(e)
    })?;

    let questions = load_questions(&mut *tx, quiz_id).await?;
    let graded = grade_quiz(&questions, submitted);

    for verdict in &graded.verdicts {
        sqlx::query(
            r#"
            INSERT INTO user_answers (submission_id, question_id, answer, is_correct)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(submission_id)
        .bind(verdict.question_id)
        .bind(&verdict.recorded_answer)
        .bind(verdict.is_correct)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to record answer for question {}: {:?}",
                verdict.question_id,
                e
            );
            AppError::from(e)
        })?;
    }

    finalize_score(&mut *tx, submission_id, graded.score).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit submission {}: {:?}", submission_id, e);
        AppError::from(e)
    })?;

    tracing::info!(
        submission_id,
        quiz_id,
        user_id,
        score = graded.score,
        total = graded.total_questions(),
        "Quiz submission recorded"
    );

    Ok(RecordedSubmission {
        submission_id,
        score: graded.score,
        total_questions: graded.total_questions(),
    })
}

/// Sets the score of a pending submission. A submission that already has a
/// score is never re-scored.
async fn finalize_score(
    conn: &mut SqliteConnection,
    submission_id: i64,
    score: i64,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE user_submissions SET score = ? WHERE id = ? AND score IS NULL",
    )
    .bind(score)
    .bind(submission_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() != 1 {
        return Err(AppError::InternalServerError(format!(
            "Submission {} was already scored",
            submission_id
        )));
    }

    Ok(())
}

/// Header row of a result, joined with its quiz.
#[derive(sqlx::FromRow)]
struct ResultHeader {
    id: i64,
    quiz_title: String,
    score: i64,
    submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Loads the per-question breakdown of one of `user_id`'s submissions.
///
/// Someone else's submission is reported as not found.
pub async fn load_result(
    pool: &SqlitePool,
    submission_id: i64,
    user_id: i64,
) -> Result<SubmissionResult, AppError> {
    let header = sqlx::query_as::<_, ResultHeader>(
        r#"
        SELECT s.id, q.title AS quiz_title, s.score, s.submitted_at
        FROM user_submissions s
        JOIN quizzes q ON s.quiz_id = q.id
        WHERE s.id = ? AND s.user_id = ? AND s.score IS NOT NULL
        "#,
    )
    .bind(submission_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound(messages::SUBMISSION_NOT_FOUND.to_string()))?;

    let answers = sqlx::query_as::<_, ResultAnswer>(
        r#"
        SELECT
            qu.text AS question_text,
            ua.answer,
            ua.is_correct,
            (
                SELECT a.text FROM answers a
                WHERE a.question_id = ua.question_id AND a.is_correct = 1
                ORDER BY a.id
                LIMIT 1
            ) AS correct_answer
        FROM user_answers ua
        JOIN questions qu ON ua.question_id = qu.id
        WHERE ua.submission_id = ?
        ORDER BY ua.question_id
        "#,
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await?;

    Ok(SubmissionResult {
        id: header.id,
        quiz_title: header.quiz_title,
        score: header.score,
        total_questions: answers.len() as i64,
        submitted_at: header.submitted_at,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn seed(pool: &SqlitePool) -> (i64, i64, i64, i64) {
        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password) VALUES ('u1', 'u1@example.com', 'x') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let quiz_id: i64 =
            sqlx::query_scalar("INSERT INTO quizzes (title) VALUES ('Capitals') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let mcq_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (quiz_id, text, question_type) VALUES (?, 'Capital of France?', 'MCQ') RETURNING id",
        )
        .bind(quiz_id)
        .fetch_one(pool)
        .await
        .unwrap();
        let paris_id: i64 = sqlx::query_scalar(
            "INSERT INTO answers (question_id, text, is_correct) VALUES (?, 'Paris', 1) RETURNING id",
        )
        .bind(mcq_id)
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO answers (question_id, text, is_correct) VALUES (?, 'Rome', 0)")
            .bind(mcq_id)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO questions (quiz_id, text, question_type) VALUES (?, 'Largest animal?', 'TEXT')",
        )
        .bind(quiz_id)
        .execute(pool)
        .await
        .unwrap();
        (user_id, quiz_id, mcq_id, paris_id)
    }

    #[tokio::test]
    async fn records_one_answer_per_question_and_final_score() {
        let pool = test_pool().await;
        let (user_id, quiz_id, mcq_id, paris_id) = seed(&pool).await;

        let mut submitted = HashMap::new();
        submitted.insert(mcq_id.to_string(), paris_id.to_string());

        let recorded = record_submission(&pool, quiz_id, user_id, &submitted)
            .await
            .unwrap();
        assert_eq!(recorded.score, 1);
        assert_eq!(recorded.total_questions, 2);

        let rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_answers WHERE submission_id = ?")
                .bind(recorded.submission_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 2);

        let result = load_result(&pool, recorded.submission_id, user_id).await.unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.answers[0].answer, "Paris");
        assert_eq!(result.answers[0].correct_answer.as_deref(), Some("Paris"));
        assert_eq!(result.answers[1].answer, "");
        assert_eq!(result.answers[1].correct_answer, None);
    }

    #[tokio::test]
    async fn score_is_written_only_once() {
        let pool = test_pool().await;
        let (user_id, quiz_id, _, _) = seed(&pool).await;

        let recorded = record_submission(&pool, quiz_id, user_id, &HashMap::new())
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let rescored = finalize_score(&mut conn, recorded.submission_id, 5).await;
        assert!(matches!(rescored, Err(AppError::InternalServerError(_))));
    }

    #[tokio::test]
    async fn other_users_result_is_not_found() {
        let pool = test_pool().await;
        let (user_id, quiz_id, _, _) = seed(&pool).await;

        let recorded = record_submission(&pool, quiz_id, user_id, &HashMap::new())
            .await
            .unwrap();

        let other = load_result(&pool, recorded.submission_id, user_id + 100).await;
        assert!(matches!(other, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_attempt_leaves_no_submission_behind() {
        let pool = test_pool().await;
        let (_, quiz_id, _, _) = seed(&pool).await;

        // Unknown user violates the foreign key on insert.
        let failed = record_submission(&pool, quiz_id, 9_999, &HashMap::new()).await;
        assert!(failed.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_submissions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
