//! User-facing identity and profile types.

use serde::{Deserialize, Serialize};

/// Opaque, stable user identifier
pub type UserId = i64;

/// The authenticated identity a connection or request acts as
///
/// This is the cached projection of a user that the real-time core carries
/// around: enough to address the user and to label event payloads, nothing
/// more. It is built from verified session claims, so holding one implies
/// the credentials were checked at some point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Public profile of a user (never contains the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: String,
    pub about: String,
}

/// A roster entry: another user plus how many of their messages are unread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    #[serde(flatten)]
    pub profile: Profile,
    pub unread: i64,
}
