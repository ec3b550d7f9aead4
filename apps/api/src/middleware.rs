use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use cmms_core::AppError;
use cmms_domain::{Actor, UserId};

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Resolves the acting user through the directory and stores it as an
/// [`Actor`] request extension.
pub async fn require_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let actor = resolve_actor(&state, request.headers()).await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// The role always comes from the directory record.
pub async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> ApiResult<Actor> {
    let raw_user_id = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("{ACTOR_HEADER} header is required")))?;

    let user_id = UserId::from_str(raw_user_id)
        .map_err(|_| AppError::Unauthorized(format!("{ACTOR_HEADER} is not a valid user id")))?;

    let user = state
        .directory
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("unknown user '{user_id}'")))?;

    Ok(user.actor())
}
