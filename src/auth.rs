//! Authentication: registration, login and bearer-token validation.
//!
//! Passwords are stored as Argon2 hashes. Session tokens are random UUIDs
//! held in a server-side store mapping token to user id; a restart clears
//! all sessions.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::db::queries::users;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, PublicUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub user: PublicUser,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> AppResult<(axum::http::StatusCode, Json<AuthResponse>)> {
    if new_user.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if new_user.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if new_user.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let conn = state.db.get()?;

    if users::email_exists(&conn, &new_user.email)? {
        return Err(AppError::Conflict("Email already in use".into()));
    }
    if users::username_exists(&conn, &new_user.username)? {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let password_hash = hash_password(&new_user.password)?;
    let user_id = users::create_user(
        &conn,
        &new_user.username,
        &new_user.email,
        &password_hash,
        new_user.phone_number.as_deref(),
    )?;

    let user = users::get_user(&conn, user_id)?
        .ok_or_else(|| AppError::Internal("User vanished after insert".into()))?;

    let token = issue_token(&state, user_id);
    tracing::info!(user_id, username = %user.username, "Registered user");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AuthResponse {
            status: "success",
            token,
            user: user.public(),
        }),
    ))
}

#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let conn = state.db.get()?;

    let user = users::get_user_by_email(&conn, &login.email)?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = issue_token(&state, user.id);
    tracing::debug!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        status: "success",
        token,
        user: user.public(),
    }))
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub user: PublicUser,
}

/// GET /api/auth/user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let conn = state.db.get()?;
    let user =
        users::get_user(&conn, id)?.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse {
        status: "success",
        user: user.public(),
    }))
}

/// Resolve the user behind an `Authorization: Bearer` header.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<i64> {
    let header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("No token provided or invalid format".into())
        })?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("No token provided or invalid format".into()))?;

    state
        .session_user(token)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))
}

fn issue_token(state: &AppState, user_id: i64) -> String {
    let token = Uuid::new_v4().to_string();
    state.insert_session(token.clone(), user_id);
    token
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash in database");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
