// handlers/auth/current.rs - GET /api/auth/current handler

use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::middleware::CurrentUser;
use crate::models::PublicProfile;

/// The guard already resolved the user; this just projects the public fields.
pub async fn current_get(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<Value> {
    Json(json!(PublicProfile::from(&user)))
}
