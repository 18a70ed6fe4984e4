/**
 * Presence Registry
 *
 * Maps each authenticated user to at most one live connection. A connection
 * is represented by a [`ConnectionHandle`]: an id plus the sending half of
 * that connection's bounded outbound queue. The socket task owns the
 * receiving half and writes whatever arrives to the WebSocket.
 *
 * # Rules
 *
 * - `register` is last-writer-wins: a second connection for the same user
 *   replaces the first. The first connection stays open but is no longer
 *   addressable.
 * - `unregister` only removes a binding if the handle passed in is the one
 *   currently registered. A disconnect that races with a newer login for the
 *   same user therefore cannot knock the newer connection offline.
 * - A connection is bound to at most one user.
 *
 * # Thread Safety
 *
 * One `std::sync::Mutex` guards both maps. It is held only for map updates,
 * never across an `.await`, and no operation takes it twice, so there is no
 * lock ordering to get wrong.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{RealtimeEvent, UserId};

/// Unique id of one live transport connection
pub type ConnectionId = Uuid;

/// Why a push onto a connection's queue failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// The queue is at capacity; the consumer is too slow
    Full,
    /// The connection's socket task has gone away
    Closed,
}

/// Addressable reference to one live connection
///
/// Cloning is cheap; all clones address the same connection. Equality is by
/// connection id.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<RealtimeEvent>,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its outbound queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RealtimeEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            tx,
        };
        (handle, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event without waiting
    pub fn try_push(&self, event: RealtimeEvent) -> Result<(), PushError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
        })
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

#[derive(Debug, Default)]
struct Bindings {
    by_user: HashMap<UserId, ConnectionHandle>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// Thread-safe identity → connection map
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<Mutex<Bindings>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bindings(&self) -> MutexGuard<'_, Bindings> {
        // The maps are always left consistent between statements, so a panic
        // elsewhere while holding the lock does not invalidate them.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `user_id` to `handle`, superseding any earlier binding
    ///
    /// Returns the handle that was superseded, if any.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut bindings = self.bindings();

        // A connection belongs to one user at a time
        if let Some(previous_user) = bindings.by_connection.remove(&handle.id) {
            if previous_user != user_id {
                bindings.by_user.remove(&previous_user);
            }
        }

        bindings.by_connection.insert(handle.id, user_id);
        let superseded = bindings.by_user.insert(user_id, handle.clone());

        let superseded = superseded.filter(|old| old.id != handle.id);
        if let Some(old) = &superseded {
            bindings.by_connection.remove(&old.id);
        }
        drop(bindings);

        match &superseded {
            Some(old) => tracing::info!(
                "[Presence] User {} re-registered on connection {} (superseding {})",
                user_id,
                handle.id,
                old.id
            ),
            None => tracing::info!(
                "[Presence] User {} registered on connection {}",
                user_id,
                handle.id
            ),
        }

        superseded
    }

    /// Remove the binding held by `handle`, if it is still current
    ///
    /// Returns the user that went offline, or `None` when the handle had
    /// already been superseded or was never registered.
    pub fn unregister(&self, handle: &ConnectionHandle) -> Option<UserId> {
        let mut bindings = self.bindings();

        let user_id = bindings.by_connection.remove(&handle.id)?;
        let is_current = bindings
            .by_user
            .get(&user_id)
            .is_some_and(|current| current.id == handle.id);
        if is_current {
            bindings.by_user.remove(&user_id);
        }
        drop(bindings);

        if is_current {
            tracing::info!(
                "[Presence] User {} unregistered from connection {}",
                user_id,
                handle.id
            );
            Some(user_id)
        } else {
            None
        }
    }

    /// Drop whatever binding `user_id` holds (explicit logout)
    pub fn evict(&self, user_id: UserId) -> Option<ConnectionHandle> {
        let mut bindings = self.bindings();
        let handle = bindings.by_user.remove(&user_id)?;
        bindings.by_connection.remove(&handle.id);
        drop(bindings);

        tracing::info!(
            "[Presence] User {} evicted from connection {}",
            user_id,
            handle.id
        );
        Some(handle)
    }

    /// Current live connection for `user_id`
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionHandle> {
        self.bindings().by_user.get(&user_id).cloned()
    }

    /// User currently bound to `handle`
    ///
    /// `None` once the connection was superseded, evicted or unregistered;
    /// only a new `register` binds it again.
    pub fn bound_user(&self, handle: &ConnectionHandle) -> Option<UserId> {
        self.bindings().by_connection.get(&handle.id).copied()
    }

    /// Number of users with a live connection
    pub fn online_count(&self) -> usize {
        self.bindings().by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ConnectionHandle {
        ConnectionHandle::channel(4).0
    }

    #[test]
    fn test_register_then_lookup() {
        let presence = PresenceRegistry::new();
        let h = handle();

        assert!(presence.register(1, h.clone()).is_none());
        assert_eq!(presence.lookup(1), Some(h));
        assert_eq!(presence.online_count(), 1);
    }

    #[test]
    fn test_lookup_unknown_user() {
        let presence = PresenceRegistry::new();
        assert!(presence.lookup(42).is_none());
        assert_eq!(presence.online_count(), 0);
    }

    #[test]
    fn test_reregister_supersedes() {
        let presence = PresenceRegistry::new();
        let first = handle();
        let second = handle();

        presence.register(1, first.clone());
        let superseded = presence.register(1, second.clone());

        assert_eq!(superseded, Some(first));
        assert_eq!(presence.lookup(1), Some(second));
        assert_eq!(presence.online_count(), 1);
    }

    #[test]
    fn test_unregister_current_handle() {
        let presence = PresenceRegistry::new();
        let h = handle();
        presence.register(1, h.clone());

        assert_eq!(presence.unregister(&h), Some(1));
        assert!(presence.lookup(1).is_none());
    }

    #[test]
    fn test_stale_unregister_is_noop() {
        let presence = PresenceRegistry::new();
        let old = handle();
        let new = handle();

        presence.register(1, old.clone());
        presence.register(1, new.clone());

        assert_eq!(presence.unregister(&old), None);
        assert_eq!(presence.lookup(1), Some(new));
    }

    #[test]
    fn test_unregister_twice() {
        let presence = PresenceRegistry::new();
        let h = handle();
        presence.register(1, h.clone());

        assert_eq!(presence.unregister(&h), Some(1));
        assert_eq!(presence.unregister(&h), None);
    }

    #[test]
    fn test_unregister_never_registered() {
        let presence = PresenceRegistry::new();
        assert_eq!(presence.unregister(&handle()), None);
    }

    #[test]
    fn test_same_handle_rebound_to_other_user() {
        let presence = PresenceRegistry::new();
        let h = handle();

        presence.register(1, h.clone());
        presence.register(2, h.clone());

        assert!(presence.lookup(1).is_none());
        assert_eq!(presence.lookup(2), Some(h.clone()));
        assert_eq!(presence.unregister(&h), Some(2));
        assert_eq!(presence.online_count(), 0);
    }

    #[test]
    fn test_register_same_handle_twice_is_idempotent() {
        let presence = PresenceRegistry::new();
        let h = handle();

        presence.register(1, h.clone());
        assert!(presence.register(1, h.clone()).is_none());
        assert_eq!(presence.unregister(&h), Some(1));
    }

    #[test]
    fn test_evict() {
        let presence = PresenceRegistry::new();
        let h = handle();
        presence.register(1, h.clone());

        assert_eq!(presence.evict(1), Some(h.clone()));
        assert!(presence.lookup(1).is_none());
        // The evicted connection disconnecting later changes nothing
        assert_eq!(presence.unregister(&h), None);
    }

    #[test]
    fn test_bound_user_follows_connection() {
        let presence = PresenceRegistry::new();
        let first = handle();
        let second = handle();

        presence.register(1, first.clone());
        assert_eq!(presence.bound_user(&first), Some(1));

        presence.register(1, second.clone());
        assert_eq!(presence.bound_user(&first), None);
        assert_eq!(presence.bound_user(&second), Some(1));

        presence.evict(1);
        assert_eq!(presence.bound_user(&second), None);

        // A later connection for the same user does not revive the old ones
        let third = handle();
        presence.register(1, third.clone());
        assert_eq!(presence.bound_user(&first), None);
        assert_eq!(presence.bound_user(&second), None);
        assert_eq!(presence.bound_user(&third), Some(1));
    }

    #[test]
    fn test_try_push_full_and_closed() {
        let (h, rx) = ConnectionHandle::channel(1);
        let event = RealtimeEvent::messages_read(1, 2);

        assert!(h.try_push(event.clone()).is_ok());
        assert_eq!(h.try_push(event.clone()), Err(PushError::Full));

        drop(rx);
        assert_eq!(h.try_push(event), Err(PushError::Closed));
    }

    #[test]
    fn test_concurrent_register_unregister() {
        let presence = PresenceRegistry::new();
        let mut threads = Vec::new();

        for user_id in 0..8 {
            let presence = presence.clone();
            threads.push(std::thread::spawn(move || {
                let mut last = None;
                for _ in 0..200 {
                    let h = handle();
                    presence.register(user_id, h.clone());
                    if let Some(previous) = last.replace(h) {
                        // Always stale by now
                        assert_eq!(presence.unregister(&previous), None);
                    }
                }
                last
            }));
        }

        for (user_id, thread) in threads.into_iter().enumerate() {
            let last = thread.join().unwrap().unwrap();
            assert_eq!(presence.lookup(user_id as UserId), Some(last));
        }
        assert_eq!(presence.online_count(), 8);
    }
}
