//! HTTP handlers for the roster and conversation history
//!
//! - `GET /api/users` - every other user with their unread count
//! - `GET /api/messages/{peer_id}` - history with one peer; marks the
//!   peer's messages to the caller as read

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::backend::error::BackendResult;
use crate::backend::messaging::conversation::ConversationService;
use crate::backend::middleware::AuthUser;
use crate::shared::{Message, Peer, UserId};

pub async fn list_users(
    State(conversations): State<ConversationService>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<Vec<Peer>>> {
    let peers = conversations.list_peers(identity.user_id).await?;
    Ok(Json(peers))
}

pub async fn get_messages(
    State(conversations): State<ConversationService>,
    AuthUser(identity): AuthUser,
    Path(peer_id): Path<UserId>,
) -> BackendResult<Json<Vec<Message>>> {
    let messages = conversations
        .fetch_conversation(identity.user_id, peer_id)
        .await?;
    Ok(Json(messages))
}
