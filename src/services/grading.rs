// src/services/grading.rs

//! Quiz grading.
//!
//! Pure functions over a quiz's questions and a submitted answer map. Both the
//! JSON API and the form-based pages go through [`grade_quiz`].

use std::collections::HashMap;

use serde::Serialize;

use crate::models::question::{QuestionType, QuestionWithAnswers};

/// Outcome for one question of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub question_id: i64,
    /// Raw value as submitted, `None` when the question was not answered.
    pub submitted_value: Option<String>,
    pub is_correct: bool,
    /// Text stored on the user answer row: the selected option's text for
    /// MCQ, the submitted value otherwise, `""` when unanswered.
    pub recorded_answer: String,
}

/// Outcome for a whole submission. One verdict per question, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradedQuiz {
    pub verdicts: Vec<Verdict>,
    pub score: i64,
}

impl GradedQuiz {
    pub fn total_questions(&self) -> usize {
        self.verdicts.len()
    }
}

/// Grades every question of a quiz against the submitted map.
///
/// `submitted` is keyed by the string form of the question id. The score is
/// the number of correct verdicts.
pub fn grade_quiz(questions: &[QuestionWithAnswers], submitted: &HashMap<String, String>) -> GradedQuiz {
    let verdicts: Vec<Verdict> = questions
        .iter()
        .map(|q| {
            let value = submitted.get(&q.question.id.to_string()).map(String::as_str);
            grade_question(q, value)
        })
        .collect();

    let score = verdicts.iter().filter(|v| v.is_correct).count() as i64;

    GradedQuiz { verdicts, score }
}

/// Grades a single question.
pub fn grade_question(q: &QuestionWithAnswers, submitted: Option<&str>) -> Verdict {
    let question_id = q.question.id;

    let value = match submitted {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Verdict {
                question_id,
                submitted_value: submitted.map(str::to_owned),
                is_correct: false,
                recorded_answer: String::new(),
            };
        }
    };

    let (is_correct, recorded_answer) = match q.question.kind() {
        QuestionType::Mcq => grade_choice(q, value),
        QuestionType::Bool => (matches_correct(q, value, false), value.to_owned()),
        QuestionType::Text => (matches_correct(q, value, true), value.to_owned()),
        QuestionType::Unsupported => {
            tracing::warn!(
                question_id,
                question_type = %q.question.question_type,
                "Question has an unsupported type, scoring as incorrect"
            );
            (false, value.to_owned())
        }
    };

    Verdict {
        question_id,
        submitted_value: Some(value.to_owned()),
        is_correct,
        recorded_answer,
    }
}

/// MCQ: the value names one of this question's answers by id.
fn grade_choice(q: &QuestionWithAnswers, value: &str) -> (bool, String) {
    let selected = value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| q.answers.iter().find(|a| a.id == id));

    match selected {
        Some(answer) => (answer.is_correct, answer.text.clone()),
        None => (false, String::new()),
    }
}

/// BOOL/TEXT: case-insensitive comparison with the first correct answer.
/// Only TEXT trims surrounding whitespace. No correct answer means incorrect.
fn matches_correct(q: &QuestionWithAnswers, value: &str, trim: bool) -> bool {
    let Some(correct) = q.correct_answer() else {
        return false;
    };

    let (expected, given) = if trim {
        (correct.text.trim(), value.trim())
    } else {
        (correct.text.as_str(), value)
    };

    expected.to_lowercase() == given.to_lowercase()
}
