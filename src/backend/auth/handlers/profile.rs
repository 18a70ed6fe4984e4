//! `PUT /api/profile` - edit the caller's status line and avatar

use axum::{extract::State, response::Json};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::ProfileUpdate;
use crate::backend::auth::users::update_profile;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::shared::Profile;

const MAX_ABOUT_LEN: usize = 140;

pub async fn put_profile(
    State(pool): State<SqlitePool>,
    AuthUser(identity): AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> BackendResult<Json<Profile>> {
    if let Some(about) = &update.about {
        if about.chars().count() > MAX_ABOUT_LEN {
            return Err(BackendError::validation(
                "about",
                format!("Status must be at most {} characters", MAX_ABOUT_LEN),
            ));
        }
    }

    let user = update_profile(
        &pool,
        identity.user_id,
        update.about.as_deref(),
        update.avatar_url.as_deref(),
    )
    .await?
    .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!("[Auth] Profile updated for {}", user.username);
    Ok(Json(user.profile()))
}
