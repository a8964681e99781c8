// src/handlers/submission.rs

use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppError,
    models::{quiz::Quiz, submission::SubmissionListItem},
    services::submission::load_result,
    utils::{
        jwt::Claims,
        response::{ApiResponse, messages},
    },
};

#[derive(FromRow)]
struct SubmissionRow {
    id: i64,
    score: i64,
    submitted_at: chrono::DateTime<chrono::Utc>,
    total_submission: i64,
    quiz_id: i64,
    quiz_title: String,
    quiz_description: Option<String>,
    quiz_created_at: chrono::DateTime<chrono::Utc>,
    quiz_updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SubmissionRow> for SubmissionListItem {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            quiz: Quiz {
                id: row.quiz_id,
                title: row.quiz_title,
                description: row.quiz_description,
                created_at: row.quiz_created_at,
                updated_at: row.quiz_updated_at,
            },
            score: row.score,
            total_submission: row.total_submission,
            submitted_at: row.submitted_at,
        }
    }
}

/// Lists the caller's submissions, newest first.
///
/// `total_submission` is the caller's overall number of attempts.
pub async fn list_submissions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let rows = sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT
            s.id, s.score, s.submitted_at,
            (
                SELECT COUNT(*) FROM user_submissions o
                WHERE o.user_id = s.user_id AND o.score IS NOT NULL
            ) AS total_submission,
            q.id AS quiz_id, q.title AS quiz_title, q.description AS quiz_description,
            q.created_at AS quiz_created_at, q.updated_at AS quiz_updated_at
        FROM user_submissions s
        JOIN quizzes q ON s.quiz_id = q.id
        WHERE s.user_id = ? AND s.score IS NOT NULL
        ORDER BY s.submitted_at DESC, s.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list submissions for user {}: {:?}", user_id, e);
        AppError::from(e)
    })?;

    let items: Vec<SubmissionListItem> = rows.into_iter().map(SubmissionListItem::from).collect();

    Ok(ApiResponse::ok(messages::SUBMISSION_LIST_SUCCESSFULLY, items))
}

/// Per-question breakdown of one of the caller's submissions.
pub async fn get_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = load_result(&pool, submission_id, claims.user_id()?).await?;

    Ok(ApiResponse::ok(messages::RESULT_RETRIEVE_SUCCESSFULLY, result))
}
