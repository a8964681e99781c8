// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Unique username.
    pub username: String,

    /// Unique email, used to log in.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub profile_pic: Option<String>,
    pub is_active: bool,

    /// Staff accounts may use the back-office routes.
    pub is_staff: bool,

    pub date_joined: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn role(&self) -> &'static str {
        if self.is_staff {
            crate::utils::jwt::ROLE_ADMIN
        } else {
            crate::utils::jwt::ROLE_USER
        }
    }
}

/// Profile data of the current user.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub profile_pic: Option<String>,
}

impl From<User> for UserDetail {
    fn from(user: User) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            profile_pic: user.profile_pic,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(max = 100))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(
        min = 3,
        max = 100,
        message = "Username length must be between 3 and 100 characters."
    ))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 100,
        message = "Password length must be between 4 and 100 characters."
    ))]
    pub password: String,
    pub confirm_password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

/// DTO for exchanging a refresh token for a new access token.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

/// DTO for a partial profile update. Username and email are read-only.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 500))]
    pub profile_pic: Option<String>,
}

/// DTO for changing the current user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 100))]
    pub current_password: String,
    #[validate(length(
        min = 4,
        max = 100,
        message = "Password length must be between 4 and 100 characters."
    ))]
    pub password: String,
    pub confirm_password: String,
}
