//! Demo sign-in. Any non-empty credentials are accepted and a fresh session id
//! is issued; nothing is stored or verified.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub name: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    fn issue(name: String, email: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            name,
            email,
            issued_at: Utc::now(),
        }
    }
}

fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

pub fn login(req: &LoginRequest) -> Result<Session, AppError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(Session::issue(
        display_name_from_email(email),
        email.to_string(),
    ))
}

pub fn register(req: &RegisterRequest) -> Result<Session, AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required");
    }
    if req.email.trim().is_empty() {
        errors.push("email is required");
    }
    if req.password.is_empty() {
        errors.push("password is required");
    } else if req.password != req.confirm_password {
        errors.push("passwords do not match");
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }
    Ok(Session::issue(
        req.name.trim().to_string(),
        req.email.trim().to_string(),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(Json(req): Json<LoginRequest>) -> Result<Json<Session>, AppError> {
    login(&req).map(Json)
}

/// POST /api/v1/auth/register
pub async fn handle_register(Json(req): Json<RegisterRequest>) -> Result<Json<Session>, AppError> {
    register(&req).map(Json)
}
