// src/handlers/admin.rs

//! Back-office content management. Every handler here sits behind
//! `auth_middleware` and `admin_middleware`.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        event::{CreateEventRequest, UpdateEventRequest},
        log_entry::LogListParams,
        question::{
            CreateAnswerRequest, CreateQuestionRequest, UpdateAnswerRequest,
            UpdateQuestionRequest,
        },
        quiz::{CreateQuizRequest, UpdateQuizRequest},
    },
    services::{audit, quiz::find_quiz},
    utils::{
        extract::ApiJson,
        response::{ApiResponse, messages},
    },
};

const QUESTION_NOT_FOUND: &str = "Question not found.";
const ANSWER_NOT_FOUND: &str = "Answer not found.";

/// Fails with `NotFound(message)` unless `table` has a row with this id.
async fn ensure_exists(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
    message: &str,
) -> Result<(), AppError> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    found
        .map(|_| ())
        .ok_or(AppError::NotFound(message.to_string()))
}

/// Deletes one row, `NotFound(message)` if there was none.
async fn delete_row(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
    message: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete from {}: {:?}", table, e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(message.to_string()));
    }

    Ok(())
}

// ----------------------------------------------------------------------------
// Quizzes
// ----------------------------------------------------------------------------

/// Creates a new quiz.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (title, description) VALUES (?, ?) RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(quiz_id = id, "Quiz created");

    Ok(ApiResponse::created("Quiz created successfully.", json!({ "id": id })))
}

/// Updates a quiz. Always bumps `updated_at`.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("UPDATE quizzes SET updated_at = CURRENT_TIMESTAMP");

    if let Some(title) = payload.title {
        builder.push(", title = ");
        builder.push_bind(title);
    }

    if let Some(description) = payload.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update quiz: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::QUIZ_NOT_FOUND.to_string()));
    }

    Ok(ApiResponse::ok("Quiz updated successfully.", json!({})))
}

/// Deletes a quiz with its questions, answers and submissions.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    delete_row(&pool, "quizzes", id, messages::QUIZ_NOT_FOUND).await?;

    Ok(ApiResponse::ok("Quiz deleted successfully.", json!({})))
}

// ----------------------------------------------------------------------------
// Questions
// ----------------------------------------------------------------------------

/// Adds a question to a quiz, together with any inline answers.
///
/// The question and its answers are written in one transaction.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
    ApiJson(payload): ApiJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    find_quiz(&pool, quiz_id).await?;

    let mut tx = pool.begin().await?;

    let question_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO questions (quiz_id, text, question_type)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(quiz_id)
    .bind(&payload.text)
    .bind(payload.question_type.as_str())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    for answer in &payload.answers {
        sqlx::query("INSERT INTO answers (question_id, text, is_correct) VALUES (?, ?, ?)")
            .bind(question_id)
            .bind(&answer.text)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create answer: {:?}", e);
                AppError::from(e)
            })?;
    }

    tx.commit().await?;

    Ok(ApiResponse::created(
        "Question created successfully.",
        json!({ "id": question_id }),
    ))
}

/// Updates a question's text or type.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.text.is_none() && payload.question_type.is_none() {
        ensure_exists(&pool, "questions", id, QUESTION_NOT_FOUND).await?;
        return Ok(ApiResponse::ok("Question updated successfully.", json!({})));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    if let Some(text) = payload.text {
        separated.push("text = ");
        separated.push_bind_unseparated(text);
    }

    if let Some(question_type) = payload.question_type {
        separated.push("question_type = ");
        separated.push_bind_unseparated(question_type.as_str());
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(QUESTION_NOT_FOUND.to_string()));
    }

    Ok(ApiResponse::ok("Question updated successfully.", json!({})))
}

pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    delete_row(&pool, "questions", id, QUESTION_NOT_FOUND).await?;

    Ok(ApiResponse::ok("Question deleted successfully.", json!({})))
}

// ----------------------------------------------------------------------------
// Answers
// ----------------------------------------------------------------------------

/// Adds an answer option to a question.
pub async fn create_answer(
    State(pool): State<SqlitePool>,
    Path(question_id): Path<i64>,
    ApiJson(payload): ApiJson<CreateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    ensure_exists(&pool, "questions", question_id, QUESTION_NOT_FOUND).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO answers (question_id, text, is_correct) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(question_id)
    .bind(&payload.text)
    .bind(payload.is_correct)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create answer: {:?}", e);
        AppError::from(e)
    })?;

    Ok(ApiResponse::created("Answer created successfully.", json!({ "id": id })))
}

pub async fn update_answer(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.text.is_none() && payload.is_correct.is_none() {
        ensure_exists(&pool, "answers", id, ANSWER_NOT_FOUND).await?;
        return Ok(ApiResponse::ok("Answer updated successfully.", json!({})));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE answers SET ");
    let mut separated = builder.separated(", ");

    if let Some(text) = payload.text {
        separated.push("text = ");
        separated.push_bind_unseparated(text);
    }

    if let Some(is_correct) = payload.is_correct {
        separated.push("is_correct = ");
        separated.push_bind_unseparated(is_correct);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update answer: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(ANSWER_NOT_FOUND.to_string()));
    }

    Ok(ApiResponse::ok("Answer updated successfully.", json!({})))
}

pub async fn delete_answer(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    delete_row(&pool, "answers", id, ANSWER_NOT_FOUND).await?;

    Ok(ApiResponse::ok("Answer deleted successfully.", json!({})))
}

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

pub async fn create_event(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO events (event_title, event_desc, event_date, location)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.event_title)
    .bind(&payload.event_desc)
    .bind(payload.event_date)
    .bind(&payload.location)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create event: {:?}", e);
        AppError::from(e)
    })?;

    Ok(ApiResponse::created("Event created successfully.", json!({ "id": id })))
}

pub async fn update_event(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.event_title.is_none()
        && payload.event_desc.is_none()
        && payload.event_date.is_none()
        && payload.location.is_none()
    {
        ensure_exists(&pool, "events", id, messages::EVENT_NOT_FOUND).await?;
        return Ok(ApiResponse::ok("Event updated successfully.", json!({})));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE events SET ");
    let mut separated = builder.separated(", ");

    if let Some(event_title) = payload.event_title {
        separated.push("event_title = ");
        separated.push_bind_unseparated(event_title);
    }

    if let Some(event_desc) = payload.event_desc {
        separated.push("event_desc = ");
        separated.push_bind_unseparated(event_desc);
    }

    if let Some(event_date) = payload.event_date {
        separated.push("event_date = ");
        separated.push_bind_unseparated(event_date);
    }

    if let Some(location) = payload.location {
        separated.push("location = ");
        separated.push_bind_unseparated(location);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update event: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(messages::EVENT_NOT_FOUND.to_string()));
    }

    Ok(ApiResponse::ok("Event updated successfully.", json!({})))
}

pub async fn delete_event(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    delete_row(&pool, "events", id, messages::EVENT_NOT_FOUND).await?;

    Ok(ApiResponse::ok("Event deleted successfully.", json!({})))
}

// ----------------------------------------------------------------------------
// Audit log
// ----------------------------------------------------------------------------

/// Most recent audit entries, newest first. `limit` defaults to 100 and is
/// capped at 1000.
pub async fn list_logs(
    State(pool): State<SqlitePool>,
    Query(params): Query<LogListParams>,
) -> Result<impl IntoResponse, AppError> {
    let entries = audit::list_recent(&pool, params.limit).await?;

    Ok(ApiResponse::ok("Log entries fetched successfully.", entries))
}
