// src/config.rs

use std::{env, fmt};

use dotenvy::dotenv;

/// Default lifetime of an access token, in seconds (one day).
pub const DEFAULT_JWT_EXPIRATION: u64 = 86_400;

/// Default lifetime of a refresh token, in seconds (seven days).
pub const DEFAULT_JWT_REFRESH_EXPIRATION: u64 = 604_800;

/// Label recorded as the actor of audit entries for unauthenticated calls.
pub const ANONYMOUS_ACTOR: &str = "anonymous user";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub jwt_refresh_expiration: u64,
    pub server_address: String,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

/// Raised when the environment does not describe a usable configuration.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid(name, reason) => write!(f, "Invalid value for {}: {}", name, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = seconds("JWT_EXPIRATION", DEFAULT_JWT_EXPIRATION)?;
        let jwt_refresh_expiration =
            seconds("JWT_REFRESH_EXPIRATION", DEFAULT_JWT_REFRESH_EXPIRATION)?;

        let server_address =
            env::var("SERVER_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            jwt_refresh_expiration,
            server_address,
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

fn seconds(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid(name, e.to_string())),
        Err(_) => Ok(default),
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
