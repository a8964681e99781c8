// src/services/audit.rs

//! Request audit trail.
//!
//! One `log_entries` row per API call. Writing is best effort: a failed insert
//! is logged and dropped so it never changes the caller's response.

use std::collections::BTreeMap;

use axum::{
    extract::Query,
    http::{StatusCode, Uri},
};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::log_entry::{LogEntry, NewLogEntry},
};

pub const DEFAULT_LOG_LIMIT: i64 = 100;
pub const MAX_LOG_LIMIT: i64 = 1000;

/// Writes one audit entry. Never fails.
pub async fn record(pool: &SqlitePool, entry: NewLogEntry) {
    if let Err(e) = insert(pool, &entry).await {
        tracing::error!(
            api_name = %entry.api_name,
            api_type = %entry.api_type,
            status = entry.status,
            "Failed to write audit log entry: {:?}",
            e
        );
    }
}

async fn insert(pool: &SqlitePool, entry: &NewLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO log_entries
        (actor, ip_address, message, api_name, api_type, send_data, get_data, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.actor)
    .bind(&entry.ip_address)
    .bind(&entry.message)
    .bind(&entry.api_name)
    .bind(&entry.api_type)
    .bind(&entry.send_data)
    .bind(&entry.get_data)
    .bind(entry.status.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest entries first.
pub async fn list_recent(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<LogEntry>, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);

    let entries = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT id, actor, ip_address, message, api_name, api_type,
               send_data, get_data, status, date_time
        FROM log_entries
        ORDER BY date_time DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list audit log entries: {:?}", e);
        AppError::from(e)
    })?;

    Ok(entries)
}

/// Query string as a JSON object (`{}` when absent or unparsable).
pub fn query_snapshot(uri: &Uri) -> String {
    let params = Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    serde_json::to_string(&params).unwrap_or_else(|_| "{}".to_string())
}

/// Response body as JSON text.
///
/// JSON bodies are kept as they are, an empty body becomes `{}`, and any other
/// body is stored as a JSON string so the snapshot stays valid JSON.
pub fn payload_snapshot(body: &[u8]) -> String {
    if body.is_empty() {
        return "{}".to_string();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()).to_string(),
    }
}

/// Human-readable outcome: the envelope's `message`, or the status reason.
pub fn outcome_message(body: &[u8], status: StatusCode) -> String {
    let from_envelope = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").cloned());

    match from_envelope {
        Some(Value::String(message)) => message,
        Some(other) if !other.is_null() => other.to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_is_serialized_as_object() {
        let uri: Uri = "/api/admin/logs?limit=5&q=a%20b".parse().unwrap();
        let snapshot: Value = serde_json::from_str(&query_snapshot(&uri)).unwrap();
        assert_eq!(snapshot, json!({"limit": "5", "q": "a b"}));

        let bare: Uri = "/api/quiz/quiz-list".parse().unwrap();
        assert_eq!(query_snapshot(&bare), "{}");
    }

    #[test]
    fn payload_snapshot_is_lossless_json() {
        let body = br#"{"success":1,"message":"ok","data":{"id":3}}"#;
        let snapshot: Value = serde_json::from_str(&payload_snapshot(body)).unwrap();
        assert_eq!(snapshot["data"]["id"], 3);

        assert_eq!(payload_snapshot(b""), "{}");

        let text: Value = serde_json::from_str(&payload_snapshot(b"plain text")).unwrap();
        assert_eq!(text, json!("plain text"));
    }

    #[test]
    fn message_falls_back_to_status_reason() {
        let body = br#"{"success":0,"message":"Quiz not found.","data":{}}"#;
        assert_eq!(outcome_message(body, StatusCode::NOT_FOUND), "Quiz not found.");
        assert_eq!(outcome_message(b"", StatusCode::UNAUTHORIZED), "Unauthorized");
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        // No migrations: the table does not exist.
        record(
            &pool,
            NewLogEntry {
                actor: "anonymous user".to_string(),
                ip_address: None,
                message: "ok".to_string(),
                api_name: "/api/quiz/quiz-list".to_string(),
                api_type: "GET".to_string(),
                send_data: "{}".to_string(),
                get_data: "{}".to_string(),
                status: 200,
            },
        )
        .await;
    }
}
