// src/handlers/quiz.rs

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        quiz::{Quiz, QuizDetail},
        submission::SubmitQuizRequest,
    },
    services::{
        quiz::{find_quiz, load_questions},
        submission::record_submission,
    },
    utils::{
        extract::ApiJson,
        jwt::Claims,
        response::{ApiResponse, messages},
    },
};

/// Lists quizzes that have at least one question, newest first.
pub async fn list_quizzes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT q.id, q.title, q.description, q.created_at, q.updated_at
        FROM quizzes q
        WHERE EXISTS (SELECT 1 FROM questions qu WHERE qu.quiz_id = q.id)
        ORDER BY q.created_at DESC, q.id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quizzes: {:?}", e);
        AppError::from(e)
    })?;

    Ok(ApiResponse::ok(messages::QUIZ_LIST_SUCCESSFULLY, quizzes))
}

/// Returns a quiz with its questions and answer options.
///
/// Correctness flags are never sent to quiz takers.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = find_quiz(&pool, quiz_id).await?;

    let mut conn = pool.acquire().await?;
    let questions = load_questions(&mut conn, quiz_id).await?;

    let detail = QuizDetail {
        id: quiz.id,
        title: quiz.title,
        description: quiz.description,
        questions: questions.iter().map(|q| q.to_public()).collect(),
    };

    Ok(ApiResponse::ok(messages::QUIZ_RETRIEVE_SUCCESSFULLY, detail))
}

/// Grades and records one attempt at a quiz.
///
/// An unknown quiz is reported before the payload is looked at.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    payload: Result<ApiJson<SubmitQuizRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    find_quiz(&pool, quiz_id).await?;

    let ApiJson(payload) = payload?;
    let answers = payload.into_answer_map();

    let recorded = record_submission(&pool, quiz_id, user_id, &answers).await?;

    Ok(
        ApiResponse::message(StatusCode::OK, messages::QUIZ_SUBMITTED_SUCCESSFULLY)
            .with_submission(recorded.score, recorded.submission_id),
    )
}
