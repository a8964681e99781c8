// src/models/event.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'events' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub event_title: String,
    pub event_desc: String,
    pub event_date: NaiveDate,
    pub location: String,
}

/// DTO for creating an event. `event_date` is `YYYY-MM-DD`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 100))]
    pub event_title: String,
    #[validate(length(min = 1, max = 5000))]
    pub event_desc: String,
    pub event_date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
}

/// DTO for updating an event. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 100))]
    pub event_title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub event_desc: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
}
