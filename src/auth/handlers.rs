use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginRequest, LoginResponse},
    password::{verify_against_dummy, verify_password},
};
use crate::{
    error::{ApiError, ValidationError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ValidationError::single("email", "must be a valid email address").into());
    }

    let found = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::internal("Login failed", e))?;
    let Some(user) = found else {
        verify_against_dummy(&payload.password);
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal("Login failed", e))?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .keys
        .issue(user.id, user.role)
        .map_err(|e| ApiError::internal("Login failed", e))?;

    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
