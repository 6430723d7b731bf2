// handlers/auth/subscription.rs - PATCH /api/auth/subscription handler

use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::validate;

pub async fn subscription_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let tier = validate::subscription(&body)?;
    state.account().update_subscription(user.id, tier).await?;

    Ok(Json(
        json!({ "message": "The subscription was updated successfully" }),
    ))
}
