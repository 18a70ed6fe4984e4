/**
 * Login Handler
 *
 * `POST /api/auth/login`
 *
 * Unknown usernames and wrong passwords both answer 401 with the same
 * message.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{AuthResponse, CredentialsRequest};
use crate::backend::auth::users::verify_credentials;
use crate::backend::error::BackendResult;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> BackendResult<Json<AuthResponse>> {
    tracing::info!("[Auth] Login request for {}", request.username);

    let user = verify_credentials(&state.db_pool, &request.username, &request.password).await?;
    let token = state.sessions.create_token(&user.identity())?;

    tracing::info!("[Auth] User logged in: {} ({})", user.username, user.id);

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}
