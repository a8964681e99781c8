// src/handlers/pages.rs

//! Server-rendered quiz pages: the quiz form, its submission and the result.
//! These share grading and recording with the JSON API and differ only in
//! how answers arrive and how results leave.

use std::{collections::HashMap, fmt::Write};

use axum::{
    Extension,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        question::{PublicQuestion, QuestionType},
        quiz::Quiz,
        submission::SubmissionResult,
    },
    services::{
        quiz::{find_quiz, load_questions},
        submission::{load_result, record_submission},
    },
    utils::{extract::ApiForm, html::escape_text, jwt::Claims},
};

/// Form fields carrying answers are named `question_<id>`.
const FIELD_PREFIX: &str = "question_";

/// Keeps only answer fields, keyed by question id.
fn answers_from_form(form: HashMap<String, String>) -> HashMap<String, String> {
    form.into_iter()
        .filter_map(|(name, value)| {
            name.strip_prefix(FIELD_PREFIX)
                .map(|question_id| (question_id.to_string(), value))
        })
        .collect()
}

/// Renders the quiz as a form that posts back to the same path.
pub async fn quiz_form(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = find_quiz(&pool, quiz_id).await?;

    let mut conn = pool.acquire().await?;
    let questions: Vec<PublicQuestion> = load_questions(&mut conn, quiz_id)
        .await?
        .iter()
        .map(|q| q.to_public())
        .collect();

    Ok(Html(render_form(&quiz, &questions)))
}

/// Handles the quiz form and redirects to the result page.
pub async fn submit_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    ApiForm(form): ApiForm<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    find_quiz(&pool, quiz_id).await?;

    let recorded = record_submission(&pool, quiz_id, user_id, &answers_from_form(form)).await?;

    Ok(Redirect::to(&format!("/quiz/result/{}", recorded.submission_id)))
}

/// Renders one of the caller's results as an HTML table.
pub async fn result_page(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = load_result(&pool, submission_id, claims.user_id()?).await?;

    Ok(Html(render_result(&result)))
}

fn render_form(quiz: &Quiz, questions: &[PublicQuestion]) -> String {
    let title = escape_text(&quiz.title);
    let mut page = String::new();

    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <h1>{title}</h1>\n<form method=\"post\" action=\"/quiz/{id}/start\">\n",
        title = title,
        id = quiz.id,
    );

    if let Some(description) = &quiz.description {
        let _ = writeln!(page, "<p>{}</p>", escape_text(description));
    }

    for question in questions {
        let field = format!("{}{}", FIELD_PREFIX, question.id);
        let _ = writeln!(
            page,
            "<fieldset>\n<legend>{}</legend>",
            escape_text(&question.text)
        );

        match QuestionType::parse(&question.question_type) {
            QuestionType::Mcq => {
                for answer in &question.answers {
                    let _ = writeln!(
                        page,
                        "<label><input type=\"radio\" name=\"{field}\" value=\"{value}\"> {text}</label><br>",
                        field = field,
                        value = answer.id,
                        text = escape_text(&answer.text),
                    );
                }
            }
            _ => {
                let _ = writeln!(page, "<input type=\"text\" name=\"{}\">", field);
            }
        }

        page.push_str("</fieldset>\n");
    }

    page.push_str("<button type=\"submit\">Submit</button>\n</form>\n</body>\n</html>\n");
    page
}

fn render_result(result: &SubmissionResult) -> String {
    let title = escape_text(&result.quiz_title);
    let mut page = String::new();

    // Writing to a String cannot fail.
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <h1>{title}</h1>\n<p>Score: {score} / {total}</p>\n<table>\n\
         <tr><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Result</th></tr>\n",
        title = title,
        score = result.score,
        total = result.total_questions,
    );

    for answer in &result.answers {
        let _ = writeln!(
            page,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_text(&answer.question_text),
            escape_text(&answer.answer),
            escape_text(answer.correct_answer.as_deref().unwrap_or("")),
            if answer.is_correct { "Correct" } else { "Incorrect" },
        );
    }

    page.push_str("</table>\n</body>\n</html>\n");
    page
}
