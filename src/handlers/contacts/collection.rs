// handlers/contacts/collection.rs - GET and POST /api/contacts handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub favorite: Option<bool>,
}

/// List the caller's contacts, paginated, optionally narrowed to favorites.
/// The response is a bare array in insertion order.
pub async fn contacts_get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let contacts = state
        .contact()
        .list(user.id, query.page, query.limit, query.favorite)
        .await?;

    Ok(Json(json!(contacts)))
}

pub async fn contacts_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let fields = validate::new_contact(&body)?;
    let contact = state.contact().create(user.id, fields).await?;

    Ok((StatusCode::CREATED, Json(json!(contact))))
}
