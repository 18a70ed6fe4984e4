//! `GET /api/auth/me` - profile of the authenticated caller

use axum::{extract::State, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::shared::Profile;

pub async fn get_me(
    State(pool): State<SqlitePool>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<Profile>> {
    let user = get_user_by_id(&pool, identity.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("[Auth] Token for missing user {}", identity.user_id);
            BackendError::not_found("User not found")
        })?;

    Ok(Json(user.profile()))
}
