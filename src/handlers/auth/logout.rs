// handlers/auth/logout.rs - POST /api/auth/logout handler

use axum::{extract::State, http::StatusCode, Extension};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Clear the stored session token. The cryptographically-valid bearer token
/// the client still holds stops matching and the guard rejects it from here
/// on. Repeat calls are harmless.
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state.account().logout(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
