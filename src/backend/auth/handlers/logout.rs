//! `POST /api/auth/logout`
//!
//! Drops the caller's presence binding so nothing more is pushed to their
//! socket. The socket itself stays open, and the token stays valid until it
//! expires; the client is expected to discard it.

use axum::{extract::State, http::StatusCode};

use crate::backend::middleware::AuthUser;
use crate::backend::realtime::presence::PresenceRegistry;

pub async fn logout(
    State(presence): State<PresenceRegistry>,
    AuthUser(identity): AuthUser,
) -> StatusCode {
    if presence.evict(identity.user_id).is_none() {
        tracing::debug!("[Auth] Logout for {} with no live connection", identity.user_id);
    }
    StatusCode::NO_CONTENT
}
