use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use chapterdesk_core::{AppError, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

/// Raw bearer token of the current request, kept for logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Resolves the `Authorization: Bearer` token into a [`UserIdentity`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?;
    let identity = state.user_service.authenticate(&token).await?;

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

/// Rejects callers whose account is not approved. Runs after [`require_auth`].
pub async fn require_approved(request: Request, next: Next) -> ApiResult<Response> {
    let identity = request
        .extensions()
        .get::<UserIdentity>()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    ensure_approved(identity)?;

    Ok(next.run(request).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_owned()))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthorized(
            "malformed authorization header".to_owned(),
        ));
    }

    Ok(token.to_owned())
}

pub(crate) fn ensure_approved(identity: &UserIdentity) -> Result<(), AppError> {
    if identity.is_approved() {
        Ok(())
    } else {
        Err(AppError::Forbidden("account not approved".to_owned()))
    }
}
