// src/utils/response.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Uniform body of every JSON API response.
///
/// `success` is `1` or `0`. `score` and `submission_id` are only present on
/// quiz submission responses.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: u8,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<i64>,
}

/// A successful response: status code plus envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            body: Envelope {
                success: 1,
                message: message.into(),
                data,
                score: None,
                submission_id: None,
            },
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }

    /// Attaches the grading outcome to the top level of the envelope.
    pub fn with_submission(mut self, score: i64, submission_id: i64) -> Self {
        self.body.score = Some(score);
        self.body.submission_id = Some(submission_id);
        self
    }
}

impl ApiResponse<Value> {
    /// A response that only carries a message; `data` is an empty object.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, Value::Object(Map::new()))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// User-facing messages shared by handlers.
pub mod messages {
    pub const USER_SIGNUP_SUCCESSFULLY: &str = "Your account was created successfully.";
    pub const USER_LOGIN_SUCCESSFULLY: &str = "Login successfully.";
    pub const USER_LOGIN_FAIL: &str = "Invalid email or password. Please try again.";
    pub const TOKEN_REFRESH_SUCCESSFULLY: &str = "Access token refreshed successfully.";
    pub const TOKEN_REFRESH_FAIL: &str = "Token is invalid or expired.";
    pub const USER_PROFILE_UPDATE_SUCCESSFULLY: &str = "Your profile was updated successfully.";
    pub const USER_CHANGE_PASS_SUCCESSFULLY: &str = "Your password was changed successfully.";
    pub const USER_DETAIL_RETRIEVE_SUCCESSFULLY: &str = "Your details were retrieved successfully.";

    pub const QUIZ_LIST_SUCCESSFULLY: &str = "All quizzes have been fetched successfully.";
    pub const QUIZ_NOT_FOUND: &str = "Quiz not found.";
    pub const QUIZ_RETRIEVE_SUCCESSFULLY: &str = "Quiz fetched successfully.";
    pub const QUIZ_SUBMITTED_SUCCESSFULLY: &str = "Quiz submitted successfully.";

    pub const SUBMISSION_LIST_SUCCESSFULLY: &str = "Your submissions were retrieved successfully.";
    pub const SUBMISSION_NOT_FOUND: &str = "Submission not found.";
    pub const RESULT_RETRIEVE_SUCCESSFULLY: &str = "Quiz result fetched successfully.";

    pub const EVENT_FETCHED_SUCCESSFULLY: &str = "Upcoming events fetched successfully.";
    pub const EVENT_NOT_FOUND: &str = "Event not found.";
}
