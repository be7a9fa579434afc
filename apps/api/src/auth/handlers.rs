use axum::{extract::State, http::StatusCode};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::issue_token;
use crate::auth::CurrentUser;
use crate::config::Config;
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::user::{Role, User};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/v1/auth/register
/// Self-service sign-up always yields an employee account.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = insert_user(
        &state.db,
        NewUser {
            email: &req.email,
            password: &req.password,
            full_name: req.full_name.as_deref(),
            role: Role::Employee,
        },
    )
    .await?;
    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&req.email);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
        .filter(|u| verify_password(&req.password, &u.hashed_password))
        .ok_or(AppError::Unauthorized)?;

    if !user.is_active {
        return Err(AppError::InactiveUser);
    }

    Ok(Json(token_response(user, &state.config)?))
}

/// GET /api/v1/auth/me
pub async fn handle_me(user: CurrentUser) -> Json<User> {
    Json(user.0)
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: Option<&'a str>,
    pub role: Role,
}

/// Validates and inserts a user. Duplicate emails are a conflict.
pub async fn insert_user(pool: &PgPool, new: NewUser<'_>) -> Result<User, AppError> {
    let email = normalize_email(new.email);
    validate_email(&email)?;
    if new.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, hashed_password, full_name, role, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(hash_password(new.password))
    .bind(new.full_name.map(str::trim).filter(|n| !n.is_empty()))
    .bind(new.role.as_str())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Creates the configured admin account on first start.
pub async fn bootstrap_admin(pool: &PgPool, config: &Config) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(normalize_email(email))
        .fetch_one(pool)
        .await?;
    if exists {
        return Ok(());
    }

    let admin = insert_user(
        pool,
        NewUser {
            email,
            password,
            full_name: Some("Administrator"),
            role: Role::Admin,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {e}"))?;
    info!("Created bootstrap admin {}", admin.email);
    Ok(())
}

fn token_response(user: User, config: &Config) -> Result<TokenResponse, AppError> {
    let ttl = Duration::minutes(config.access_token_expire_minutes);
    let access_token = issue_token(user.id, user.role(), &config.jwt_secret, ttl)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {e}")))?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: ttl.num_seconds(),
        user,
    })
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid email address: {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("ana@.com").is_err());
    }
}
