// src/models/log_entry.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the append-only 'log_entries' table: one row per API call.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogEntry {
    pub id: i64,
    /// Username of the caller, or the anonymous marker.
    pub actor: String,
    pub ip_address: Option<String>,
    pub message: String,
    /// Request path.
    pub api_name: String,
    /// HTTP method.
    pub api_type: String,
    /// Response body, as JSON text.
    pub send_data: String,
    /// Query parameters, as a JSON object.
    pub get_data: String,
    pub status: String,
    pub date_time: chrono::DateTime<chrono::Utc>,
}

/// Everything the request logger needs to write one entry. Built by the
/// audit middleware and handed over explicitly.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub actor: String,
    pub ip_address: Option<String>,
    pub message: String,
    pub api_name: String,
    pub api_type: String,
    pub send_data: String,
    pub get_data: String,
    pub status: u16,
}

/// Query parameters for listing log entries.
#[derive(Debug, Deserialize)]
pub struct LogListParams {
    pub limit: Option<i64>,
}
