// src/models/submission.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::quiz::Quiz;

/// Represents the 'user_submissions' table in the database.
///
/// `score` is NULL only while the recording transaction is still open, so
/// every row a reader can see has it set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSubmission {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub score: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'user_answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAnswer {
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    pub answer: String,
    pub is_correct: bool,
}

/// A single submitted value. Quiz takers may send strings or, for MCQ
/// answer ids, bare numbers; anything else is a malformed payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmittedValue {
    Text(String),
    Number(serde_json::Number),
}

impl SubmittedValue {
    pub fn into_string(self) -> String {
        match self {
            SubmittedValue::Text(text) => text,
            SubmittedValue::Number(number) => number.to_string(),
        }
    }
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// Key: question id (string-encoded integer). Value: the user's answer.
    pub answers: HashMap<String, SubmittedValue>,
}

impl SubmitQuizRequest {
    pub fn into_answer_map(self) -> HashMap<String, String> {
        self.answers
            .into_iter()
            .map(|(question_id, value)| (question_id, value.into_string()))
            .collect()
    }
}

/// One row of the caller's submission history.
#[derive(Debug, Serialize)]
pub struct SubmissionListItem {
    pub id: i64,
    pub quiz: Quiz,
    pub score: i64,
    pub total_submission: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Per-question breakdown row of a result.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResultAnswer {
    pub question_text: String,
    pub answer: String,
    pub is_correct: bool,
    /// Text of the first answer flagged correct, if any.
    pub correct_answer: Option<String>,
}

/// Full result of one submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub id: i64,
    pub quiz_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub answers: Vec<ResultAnswer>,
}
