/**
 * Authentication Middleware
 *
 * Protects routes that need a signed-in user. The middleware verifies the
 * bearer token from the `Authorization` header and stores the caller's
 * [`Identity`] in the request extensions; handlers take it back out with
 * the [`AuthUser`] extractor.
 *
 * Missing, malformed, forged and expired tokens are all rejected with the
 * same 401 body.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::Identity;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("[Auth] Missing or malformed Authorization header");
        BackendError::authentication("Missing bearer token")
    })?;

    let claims = state.sessions.verify_token(token)?;
    request.extensions_mut().insert(claims.identity());

    Ok(next.run(request).await)
}

/// The authenticated caller of a protected route
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] Identity not found in request extensions");
                BackendError::authentication("Not authenticated")
            })
    }
}
