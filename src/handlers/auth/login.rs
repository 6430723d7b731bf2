// handlers/auth/login.rs - POST /api/auth/login handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate;

/// Exchange credentials for a bearer token. The service keeps unknown-email
/// and wrong-password failures identical on purpose.
pub async fn login_post(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let credentials = validate::credentials(&body)?;
    let (token, profile) = state.account().login(credentials).await?;

    Ok(Json(json!({ "token": token, "user": profile })))
}
