// handlers/auth/avatars.rs - PATCH /api/auth/avatars handler

use axum::{
    extract::{Multipart, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Replace the account avatar from a multipart form. Only the `avatar` file
/// field is read; anything else in the form is ignored.
pub async fn avatars_patch(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("File is not transferred"))?
    {
        if field.name() == Some("avatar") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| ApiError::bad_request("File is not transferred"))?;
            upload = Some(bytes.to_vec());
            break;
        }
    }

    let Some(bytes) = upload else {
        return Err(ApiError::bad_request("File is not transferred"));
    };

    let avatar_url = state.account().replace_avatar(user.id, bytes).await?;

    Ok(Json(json!({ "avatarURL": avatar_url })))
}
