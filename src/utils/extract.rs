// src/utils/extract.rs

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` extractor whose rejections use the failure envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Form` extractor whose rejections use the failure envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);
