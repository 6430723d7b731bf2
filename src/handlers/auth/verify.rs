// handlers/auth/verify.rs - GET /api/auth/verify/:verification_token and
// POST /api/auth/verify (resend) handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate;

/// Claim a verification token from the emailed link. Tokens are single-use;
/// a replay lands on the 404 branch inside the service.
pub async fn verify_get(
    State(state): State<AppState>,
    Path(verification_token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.account().verify_email(&verification_token).await?;

    Ok(Json(json!({ "message": "Verification successful" })))
}

/// Re-send the outstanding verification link for a not-yet-verified account.
pub async fn verify_post(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let email = validate::email_only(&body)?;
    state.account().resend_verification(&email).await?;

    Ok(Json(json!({ "message": "Verification email sent" })))
}
