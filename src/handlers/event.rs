// src/handlers/event.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::event::Event,
    utils::response::{ApiResponse, messages},
};

/// Upcoming events: today and later, soonest first.
pub async fn list_events(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Local::now().date_naive();

    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, event_title, event_desc, event_date, location
        FROM events
        WHERE event_date >= ?
        ORDER BY event_date, id
        "#,
    )
    .bind(today)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list events: {:?}", e);
        AppError::from(e)
    })?;

    Ok(ApiResponse::ok(messages::EVENT_FETCHED_SUCCESSFULLY, events))
}

pub async fn get_event(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let event = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, event_title, event_desc, event_date, location
        FROM events
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(messages::EVENT_NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok(messages::EVENT_FETCHED_SUCCESSFULLY, event))
}
