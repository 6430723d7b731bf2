// handlers/contacts/favorite.rs - PATCH /api/contacts/:id/favorite handler

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::validate;

pub async fn favorite_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let favorite = validate::favorite(&body)?;
    let contact = state.contact().set_favorite(user.id, id, favorite).await?;

    Ok(Json(json!(contact)))
}
