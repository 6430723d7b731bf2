// handlers/auth/register.rs - POST /api/auth/register handler

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate;

/// Create an unverified account and send the verification link.
/// Responds 201 with the public profile; the password hash and the
/// verification token never leave the service.
pub async fn register_post(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let credentials = validate::credentials(&body)?;
    let profile = state.account().register(credentials).await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": profile }))))
}
