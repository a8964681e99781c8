// src/handlers/profile.rs

use axum::{Extension, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{ChangePasswordRequest, ProfileUpdateRequest, User, UserDetail},
    utils::{
        extract::ApiJson,
        hash::{hash_password, verify_password},
        jwt::Claims,
        response::{ApiResponse, messages},
    },
};

async fn fetch_user(pool: &SqlitePool, user_id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, username, email, password,
               profile_pic, is_active, is_staff, date_joined
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Get current user's profile.
pub async fn get_user_detail(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, claims.user_id()?).await?;

    Ok(ApiResponse::ok(
        messages::USER_DETAIL_RETRIEVE_SUCCESSFULLY,
        UserDetail::from(user),
    ))
}

/// Partially updates the current user's profile.
/// Username and email cannot be changed here.
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    if payload.first_name.is_some() || payload.last_name.is_some() || payload.profile_pic.is_some()
    {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = builder.separated(", ");

        if let Some(first_name) = payload.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name);
        }

        if let Some(last_name) = payload.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name);
        }

        if let Some(profile_pic) = payload.profile_pic {
            separated.push("profile_pic = ");
            separated.push_bind_unseparated(profile_pic);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(user_id);

        let result = builder.build().execute(&pool).await.map_err(|e| {
            tracing::error!("Failed to update profile: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
    }

    Ok(ApiResponse::ok(
        messages::USER_PROFILE_UPDATE_SUCCESSFULLY,
        json!({}),
    ))
}

/// Changes the current user's password after checking the current one.
pub async fn change_password(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = fetch_user(&pool, claims.user_id()?).await?;

    if !verify_password(&payload.current_password, &user.password)? {
        return Err(AppError::BadRequest(
            "Current password is incorrect.".to_string(),
        ));
    }

    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest(
            "The confirmation password does not match the password. Please try again.".to_string(),
        ));
    }

    let hashed = hash_password(&payload.password)?;
    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(hashed)
        .bind(user.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to change password: {:?}", e);
            AppError::from(e)
        })?;

    Ok(ApiResponse::ok(
        messages::USER_CHANGE_PASS_SUCCESSFULLY,
        json!({}),
    ))
}
