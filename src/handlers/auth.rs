// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, conflict_or_internal},
    models::user::{LoginRequest, RefreshRequest, SignupRequest, User},
    utils::{
        extract::ApiJson,
        hash::{hash_password, verify_password},
        jwt::{TOKEN_ACCESS, TOKEN_REFRESH, sign_jwt, verify_jwt_of},
        response::{ApiResponse, messages},
    },
};

const PASSWORD_MISMATCH: &str =
    "The confirmation password does not match the password. Please try again.";

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created; duplicate username or email is a 409.
pub async fn signup(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest(PASSWORD_MISMATCH.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (first_name, last_name, username, email, password)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.username)
    .bind(payload.email.to_lowercase())
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        conflict_or_internal(
            e,
            "A user with this username or email already exists.".to_string(),
        )
    })?;

    tracing::info!(user_id, "User registered");

    Ok(ApiResponse::created(
        messages::USER_SIGNUP_SUCCESSFULLY,
        json!({}),
    ))
}

/// Authenticates a user by email and returns an access and a refresh token.
///
/// Unknown email, wrong password and inactive accounts all produce the same
/// 400 so callers cannot probe which emails exist.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, username, email, password,
               profile_pic, is_active, is_staff, date_joined
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(payload.email.to_lowercase())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?;

    let invalid = || AppError::BadRequest(messages::USER_LOGIN_FAIL.to_string());

    let user = user.ok_or_else(invalid)?;

    if !user.is_active || !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let access = sign_jwt(
        user.id,
        &user.username,
        user.role(),
        TOKEN_ACCESS,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;
    let refresh = sign_jwt(
        user.id,
        &user.username,
        user.role(),
        TOKEN_REFRESH,
        &config.jwt_secret,
        config.jwt_refresh_expiration,
    )?;

    Ok(ApiResponse::new(
        StatusCode::OK,
        messages::USER_LOGIN_SUCCESSFULLY,
        json!({
            "refresh": refresh,
            "access": access,
            "token_type": "Bearer",
            "expires_in": config.jwt_expiration,
        }),
    ))
}

/// Exchanges a refresh token for a new access token.
///
/// The account is looked up again so a deactivated user, or a role change,
/// takes effect on the next refresh. Any failure is a 401.
pub async fn refresh_token(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let rejected = || AppError::AuthError(messages::TOKEN_REFRESH_FAIL.to_string());

    let claims =
        verify_jwt_of(&payload.refresh, &config.jwt_secret, TOKEN_REFRESH).map_err(|_| rejected())?;
    let user_id = claims.user_id().map_err(|_| rejected())?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, username, email, password,
               profile_pic, is_active, is_staff, date_joined
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .filter(|user| user.is_active)
    .ok_or_else(rejected)?;

    let access = sign_jwt(
        user.id,
        &user.username,
        user.role(),
        TOKEN_ACCESS,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    tracing::debug!(user_id = user.id, "Access token refreshed");

    Ok(ApiResponse::ok(
        messages::TOKEN_REFRESH_SUCCESSFULLY,
        json!({
            "access": access,
            "token_type": "Bearer",
            "expires_in": config.jwt_expiration,
        }),
    ))
}
