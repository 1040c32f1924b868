use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PasswordCheck {
    password: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/check-password", post(check_password))
}

/// Compares in time independent of where the first mismatch is.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// POST /api/check-password
async fn check_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<PasswordCheck>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let password = req
        .password
        .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

    if secrets_match(password.as_bytes(), state.auth.dashboard_password.as_bytes()) {
        Ok((StatusCode::OK, Json(json!({ "success": true }))))
    } else {
        warn!("Dashboard password check failed");
        Ok((StatusCode::UNAUTHORIZED, Json(json!({ "success": false }))))
    }
}
