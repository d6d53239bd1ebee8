//! Admin login flow: emailed one-time code, opaque bearer session token.

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub success: bool,
    /// Masked recipient address, e.g. `co*****@example.com`.
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub valid: bool,
}

/// POST /api/auth/send-code
pub async fn send_code(State(state): State<AppState>) -> Result<Json<SendCodeResponse>, AppError> {
    let masked = state.auth.issue_code().await?;
    Ok(Json(SendCodeResponse {
        success: true,
        email: masked,
    }))
}

/// POST /api/auth/verify-code
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AppError> {
    let token = state.auth.verify_code(&req.code).await?;
    Ok(Json(VerifyCodeResponse {
        success: true,
        token,
    }))
}

/// POST /api/auth/verify-token
pub async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenStatus>, (StatusCode, Json<TokenStatus>)> {
    let valid = req
        .token
        .as_deref()
        .map(|token| state.auth.is_valid(token))
        .unwrap_or(false);

    if valid {
        Ok(Json(TokenStatus { valid: true }))
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(TokenStatus { valid: false })))
    }
}

/// POST /api/auth/logout — idempotent, always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Json<serde_json::Value> {
    if let Some(token) = req.token.as_deref() {
        state.auth.revoke(token);
    }
    Json(serde_json::json!({ "success": true }))
}
