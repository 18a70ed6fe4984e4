/**
 * Delivery Router
 *
 * Pushes one event to one user's live connection, if they have one.
 *
 * Delivery is best-effort and at-most-once. The durable copy of anything
 * that matters lives in the message log; a client that was offline replays
 * its conversations over HTTP on the next connect.
 *
 * # Outcomes
 *
 * - target has no live connection → dropped (`Delivery::Offline`)
 * - connection closed between lookup and push → same as offline
 * - connection queue full → dropped (`Delivery::Dropped`); one slow client
 *   never stalls the sender
 *
 * Nothing is retried and no outcome is an error for the caller.
 */

use crate::backend::realtime::presence::{PresenceRegistry, PushError};
use crate::shared::{RealtimeEvent, UserId};

/// What happened to a delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the target's live connection
    Delivered,
    /// The target has no live connection
    Offline,
    /// The target's queue was full
    Dropped,
}

/// Resolves identities to live connections and pushes events
#[derive(Debug, Clone)]
pub struct DeliveryRouter {
    presence: PresenceRegistry,
}

impl DeliveryRouter {
    pub fn new(presence: PresenceRegistry) -> Self {
        Self { presence }
    }

    /// Push `event` to `target`'s live connection without waiting
    pub fn deliver(&self, target: UserId, event: RealtimeEvent) -> Delivery {
        let event_name = event.event_type.as_str();

        let Some(handle) = self.presence.lookup(target) else {
            tracing::debug!("[Delivery] {} for user {} dropped: offline", event_name, target);
            return Delivery::Offline;
        };

        match handle.try_push(event) {
            Ok(()) => {
                tracing::debug!(
                    "[Delivery] {} queued for user {} on connection {}",
                    event_name,
                    target,
                    handle.id()
                );
                Delivery::Delivered
            }
            Err(PushError::Closed) => {
                tracing::debug!(
                    "[Delivery] {} for user {} dropped: connection {} closed",
                    event_name,
                    target,
                    handle.id()
                );
                Delivery::Offline
            }
            Err(PushError::Full) => {
                tracing::warn!(
                    "[Delivery] {} for user {} dropped: connection {} is not keeping up",
                    event_name,
                    target,
                    handle.id()
                );
                Delivery::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::realtime::presence::ConnectionHandle;
    use crate::shared::EventType;

    fn router() -> (DeliveryRouter, PresenceRegistry) {
        let presence = PresenceRegistry::new();
        (DeliveryRouter::new(presence.clone()), presence)
    }

    #[test]
    fn test_deliver_to_online_user() {
        let (router, presence) = router();
        let (handle, mut rx) = ConnectionHandle::channel(4);
        presence.register(1, handle);

        let outcome = router.deliver(1, RealtimeEvent::messages_read(1, 2));

        assert_eq!(outcome, Delivery::Delivered);
        let received = rx.try_recv().unwrap();
        assert_eq!(received.event_type, EventType::MessagesRead);
    }

    #[test]
    fn test_deliver_to_offline_user() {
        let (router, _) = router();
        assert_eq!(
            router.deliver(7, RealtimeEvent::messages_read(7, 2)),
            Delivery::Offline
        );
    }

    #[test]
    fn test_deliver_after_connection_closed() {
        let (router, presence) = router();
        let (handle, rx) = ConnectionHandle::channel(4);
        presence.register(1, handle);
        drop(rx);

        assert_eq!(
            router.deliver(1, RealtimeEvent::messages_read(1, 2)),
            Delivery::Offline
        );
    }

    #[test]
    fn test_deliver_to_full_queue_drops() {
        let (router, presence) = router();
        let (handle, mut rx) = ConnectionHandle::channel(1);
        presence.register(1, handle);

        assert_eq!(
            router.deliver(1, RealtimeEvent::messages_read(1, 2)),
            Delivery::Delivered
        );
        assert_eq!(
            router.deliver(1, RealtimeEvent::messages_read(1, 3)),
            Delivery::Dropped
        );

        // Only the first event made it
        assert_eq!(rx.try_recv().unwrap().payload["sender_id"], 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_deliver_follows_latest_registration() {
        let (router, presence) = router();
        let (old, mut old_rx) = ConnectionHandle::channel(4);
        let (new, mut new_rx) = ConnectionHandle::channel(4);
        presence.register(1, old);
        presence.register(1, new);

        router.deliver(1, RealtimeEvent::messages_read(1, 2));

        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
    }
}
