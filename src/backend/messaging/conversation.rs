/**
 * Conversation Service
 *
 * Message creation and read receipts. Each operation is two steps: change
 * the message log, then push events through the delivery router. A storage
 * failure in the first step returns before anything is pushed.
 *
 * # Events
 *
 * - `send_message` → `message-received` to the receiver, then to the sender
 * - `mark_read` → `messages-read {reader_id, sender_id}` to the original sender
 *
 * `fetch_conversation` marks read as a side effect but emits nothing; the
 * explicit `mark-read` event is how a client tells the sender.
 */

use chrono::Utc;
use sqlx::SqlitePool;

use crate::backend::auth::users::user_exists;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::messaging::db;
use crate::backend::realtime::delivery::DeliveryRouter;
use crate::shared::message::validate_content;
use crate::shared::{Identity, Message, Peer, RealtimeEvent, SharedError, UserId};

#[derive(Debug, Clone)]
pub struct ConversationService {
    pool: SqlitePool,
    delivery: DeliveryRouter,
}

impl ConversationService {
    pub fn new(pool: SqlitePool, delivery: DeliveryRouter) -> Self {
        Self { pool, delivery }
    }

    /// Persist a message from `sender` to `receiver_id`, then deliver it
    ///
    /// The returned message is the persisted row, whatever happened to the
    /// deliveries.
    ///
    /// # Errors
    /// * `ValidationError` - blank or oversized content, unknown receiver
    /// * `StorageError` - the write failed; nothing was delivered
    pub async fn send_message(
        &self,
        sender: &Identity,
        receiver_id: UserId,
        content: &str,
    ) -> BackendResult<Message> {
        validate_content(content)?;

        if !user_exists(&self.pool, receiver_id).await? {
            return Err(SharedError::validation(
                "receiver_id",
                format!("Unknown receiver {}", receiver_id),
            )
            .into());
        }

        let message =
            db::insert_message(&self.pool, sender.user_id, receiver_id, content, Utc::now()).await?;

        tracing::info!(
            "[Conversation] Message {} stored: {} -> {}",
            message.id,
            sender.user_id,
            receiver_id
        );

        let event = RealtimeEvent::message_received(&message);
        self.delivery.deliver(receiver_id, event.clone());
        self.delivery.deliver(sender.user_id, event);

        Ok(message)
    }

    /// Conversation between `requester` and `peer`, marking `peer`'s
    /// messages to `requester` as read in the same transaction
    pub async fn fetch_conversation(
        &self,
        requester: UserId,
        peer: UserId,
    ) -> BackendResult<Vec<Message>> {
        let (updated, messages) = db::fetch_conversation(&self.pool, requester, peer).await?;

        tracing::debug!(
            "[Conversation] {} fetched conversation with {}: {} messages, {} newly read",
            requester,
            peer,
            messages.len(),
            updated
        );

        Ok(messages)
    }

    /// Mark `original_sender`'s messages to `reader` read and notify the
    /// original sender
    ///
    /// `messages-read` is sent even when nothing changed. Returns how many
    /// messages changed.
    pub async fn mark_read(
        &self,
        reader: Option<UserId>,
        original_sender: Option<UserId>,
    ) -> BackendResult<u64> {
        let reader = reader.ok_or_else(|| SharedError::missing("reader_id"))?;
        let original_sender = original_sender.ok_or_else(|| SharedError::missing("sender_id"))?;

        let updated = db::mark_read_from(&self.pool, reader, original_sender).await?;

        tracing::debug!(
            "[Conversation] {} read {} messages from {}",
            reader,
            updated,
            original_sender
        );

        self.delivery
            .deliver(original_sender, RealtimeEvent::messages_read(reader, original_sender));

        Ok(updated)
    }

    /// Everyone except `current`, with unread counts, in id order
    pub async fn list_peers(&self, current: UserId) -> BackendResult<Vec<Peer>> {
        db::list_peers_with_unread(&self.pool, current)
            .await
            .map_err(BackendError::from)
    }
}
