/**
 * Message Data Structure
 *
 * This module defines the direct message exchanged between two users, in the
 * exact shape clients receive it: both as the `message-received` real-time
 * payload and as an element of the conversation history endpoint.
 *
 * Messages are immutable once written. The only field that ever changes is
 * `is_read`, and only from `false` to `true`.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::user::UserId;

/// Upper bound on message content, counted in characters
pub const MAX_CONTENT_LEN: usize = 500;

/// A persisted direct message
///
/// # Fields
/// * `id` - Assigned by the message log in insertion order
/// * `sender_id` / `receiver_id` - The two participants
/// * `content` - Text body, 1..=500 characters
/// * `timestamp` - Server-assigned creation time (serialized as RFC 3339)
/// * `sender_username` - Display name of the sender at read time
/// * `is_read` - Whether the receiver has consumed the message
///
/// # Example
/// ```json
/// {
///   "id": 7,
///   "sender_id": 1,
///   "receiver_id": 2,
///   "content": "hi",
///   "timestamp": "2025-01-01T12:00:00.000001Z",
///   "sender_username": "alice",
///   "is_read": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender_username: String,
    pub is_read: bool,
}

/// Check that message content is sendable
///
/// Content must contain something other than whitespace and be at most
/// [`MAX_CONTENT_LEN`] characters long. The content is stored as given;
/// trimming only applies to the emptiness check.
pub fn validate_content(content: &str) -> Result<(), SharedError> {
    if content.trim().is_empty() {
        return Err(SharedError::validation(
            "content",
            "Message content cannot be empty",
        ));
    }

    let len = content.chars().count();
    if len > MAX_CONTENT_LEN {
        return Err(SharedError::validation(
            "content",
            format!(
                "Message content is {} characters, the limit is {}",
                len, MAX_CONTENT_LEN
            ),
        ));
    }

    Ok(())
}
