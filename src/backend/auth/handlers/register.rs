/**
 * Register Handler
 *
 * `POST /api/auth/register`
 *
 * 1. Validate username (3-30 chars, letters/digits/underscore) and
 *    password (at least 6 chars)
 * 2. Reject taken usernames with 409
 * 3. Hash the password with the configured bcrypt cost
 * 4. Store the user with the default avatar and status line
 * 5. Return a session token and the public profile
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, CredentialsRequest};
use crate::backend::auth::users::register_user;
use crate::backend::error::BackendResult;
use crate::backend::server::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> BackendResult<(StatusCode, Json<AuthResponse>)> {
    tracing::info!("[Auth] Register request for {}", request.username);

    let user = register_user(
        &state.db_pool,
        &request.username,
        &request.password,
        state.config.bcrypt_cost,
    )
    .await?;

    let token = state.sessions.create_token(&user.identity())?;

    tracing::info!("[Auth] User created: {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}
