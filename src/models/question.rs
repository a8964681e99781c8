// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// How a question's submitted value is evaluated.
///
/// Stored as `MCQ`, `TEXT` or `BOOL` in the `question_type` column. Any other
/// stored value maps to `Unsupported`, which grading scores as incorrect and
/// authoring rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[default]
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "BOOL")]
    Bool,
    #[serde(other, rename = "UNSUPPORTED")]
    Unsupported,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "MCQ" => QuestionType::Mcq,
            "TEXT" => QuestionType::Text,
            "BOOL" => QuestionType::Bool,
            _ => QuestionType::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Text => "TEXT",
            QuestionType::Bool => "BOOL",
            QuestionType::Unsupported => "UNSUPPORTED",
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,

    /// Raw stored type; see [`QuestionType::parse`].
    pub question_type: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    pub fn kind(&self) -> QuestionType {
        QuestionType::parse(&self.question_type)
    }
}

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// A question together with all of its candidate answers; the unit the
/// grading engine works on.
#[derive(Debug, Clone)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    /// Strips correctness flags for display to quiz takers.
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.question.id,
            text: self.question.text.clone(),
            question_type: self.question.question_type.clone(),
            answers: self
                .answers
                .iter()
                .map(|a| PublicAnswer {
                    id: a.id,
                    text: a.text.clone(),
                })
                .collect(),
        }
    }

    /// First answer flagged correct, if the author marked one.
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }
}

/// Answer option as shown to quiz takers (no correctness flag).
#[derive(Debug, Serialize)]
pub struct PublicAnswer {
    pub id: i64,
    pub text: String,
}

/// DTO for sending a question to the client together with its options.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub question_type: String,
    pub answers: Vec<PublicAnswer>,
}

/// DTO for creating an answer option.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for updating an answer option. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnswerRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}

/// DTO for creating a new question, optionally with its answers.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[serde(default)]
    #[validate(custom(function = validate_question_type))]
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<CreateAnswerRequest>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: Option<String>,
    #[validate(custom(function = validate_question_type))]
    pub question_type: Option<QuestionType>,
}

/// Rejects question types the grading engine cannot evaluate.
fn validate_question_type(question_type: &QuestionType) -> Result<(), validator::ValidationError> {
    if *question_type == QuestionType::Unsupported {
        return Err(validator::ValidationError::new("unsupported_question_type"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_types_parse_and_print() {
        for kind in [QuestionType::Mcq, QuestionType::Text, QuestionType::Bool] {
            assert_eq!(QuestionType::parse(kind.as_str()), kind);
        }
        assert_eq!(QuestionType::parse("ESSAY"), QuestionType::Unsupported);
    }

    #[test]
    fn unknown_type_fails_authoring_validation() {
        let req: CreateQuestionRequest =
            serde_json::from_value(serde_json::json!({"text": "Why?", "question_type": "ESSAY"}))
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn question_type_defaults_to_text() {
        let req: CreateQuestionRequest =
            serde_json::from_value(serde_json::json!({"text": "Name a colour"})).unwrap();
        assert_eq!(req.question_type, QuestionType::Text);
        assert!(req.validate().is_ok());
    }
}
