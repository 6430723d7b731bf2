// handlers/contacts/record.rs - GET/PUT/DELETE /api/contacts/:id handlers

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

pub async fn contact_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let contact = state.contact().get(user.id, id).await?;

    Ok(Json(json!(contact)))
}

pub async fn contact_put(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let patch = validate::contact_update(&body)?;
    let contact = state.contact().update(user.id, id, patch).await?;

    Ok(Json(json!(contact)))
}

pub async fn contact_delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.contact().delete(user.id, id).await?;

    Ok(Json(json!({ "message": "Delete success" })))
}
