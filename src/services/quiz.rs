// src/services/quiz.rs

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::AppError,
    models::{
        question::{Answer, Question, QuestionWithAnswers},
        quiz::Quiz,
    },
    utils::response::messages,
};

/// Fetches a quiz or fails with `NotFound`.
pub async fn find_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, created_at, updated_at
        FROM quizzes
        WHERE id = ?
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz {}: {:?}", quiz_id, e);
        AppError::from(e)
    })?
    .ok_or(AppError::NotFound(messages::QUIZ_NOT_FOUND.to_string()))
}

/// Loads every question of a quiz, in id order, each with its answers.
///
/// Takes a connection so the submission recorder can read the question set
/// inside its own transaction.
pub async fn load_questions(
    conn: &mut SqliteConnection,
    quiz_id: i64,
) -> Result<Vec<QuestionWithAnswers>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, text, question_type, created_at
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        r#"
        SELECT a.id, a.question_id, a.text, a.is_correct
        FROM answers a
        JOIN questions q ON a.question_id = q.id
        WHERE q.quiz_id = ?
        ORDER BY a.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithAnswers { question, answers }
        })
        .collect())
}
