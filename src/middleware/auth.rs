use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// Authenticated account attached to the request by `require_auth`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Bearer-token gate for protected routes.
///
/// A token is accepted only when it decodes, the account still exists and
/// the account's stored `session_token` is the very token presented. A
/// token from before a logout therefore fails step three even though its
/// signature and expiry are still fine. Every rejection is the same 401;
/// callers learn nothing about which step failed.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Not authorized"))?;

    let user_id = state
        .tokens
        .resolve(token)
        .map_err(|_| ApiError::unauthorized("Not authorized"))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized"))?;

    if user.session_token.as_deref() != Some(token) {
        tracing::warn!(user_id = %user.id, "Rejected stale or revoked session token");
        return Err(ApiError::unauthorized("Not authorized"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Bearer ...` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    if token.trim().is_empty() {
        return None;
    }
    Some(token)
}
