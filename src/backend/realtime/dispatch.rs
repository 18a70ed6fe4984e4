/**
 * Inbound Event Dispatch
 *
 * Turns a text frame from a client into a call on the conversation service
 * or the signaling relay, acting as the identity bound to that connection.
 *
 * # Rules
 *
 * - A frame that does not parse as a known event is ignored.
 * - Events are handled only while the connection itself holds the
 *   presence binding for its identity. A connection that never
 *   authenticated, was superseded by a newer connection for the same user,
 *   or was evicted by logout is unbound, and its events are ignored. A
 *   later connection for the same user does not rebind it.
 * - Identity always comes from the connection, never from the payload; the
 *   `from` field of `call-user` is ignored.
 * - A failing event is answered with an `error` event on the same
 *   connection only. The connection stays open.
 */

use crate::backend::error::BackendResult;
use crate::backend::messaging::conversation::ConversationService;
use crate::backend::realtime::presence::{ConnectionHandle, PresenceRegistry};
use crate::backend::realtime::signaling::SignalingRelay;
use crate::shared::event::{AnswerCall, CallUser, MarkRead, SendMessage};
use crate::shared::{ClientEvent, Identity, RealtimeEvent, SharedError};

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    presence: PresenceRegistry,
    conversations: ConversationService,
    signaling: SignalingRelay,
}

impl EventDispatcher {
    pub fn new(
        presence: PresenceRegistry,
        conversations: ConversationService,
        signaling: SignalingRelay,
    ) -> Self {
        Self {
            presence,
            conversations,
            signaling,
        }
    }

    /// Parse and handle one text frame, replying on `reply` if it fails
    pub async fn handle_frame(&self, identity: Option<&Identity>, reply: &ConnectionHandle, frame: &str) {
        let event: ClientEvent = match serde_json::from_str(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("[Realtime] Ignoring unparseable frame on {}: {}", reply.id(), e);
                return;
            }
        };

        let name = event.name();
        if let Err(err) = self.dispatch(identity, reply, event).await {
            if err.is_validation() {
                tracing::debug!("[Realtime] {} rejected on {}: {}", name, reply.id(), err);
            } else {
                tracing::error!("[Realtime] {} failed on {}: {}", name, reply.id(), err);
            }

            if reply.try_push(RealtimeEvent::error(name, err.message())).is_err() {
                tracing::debug!("[Realtime] Could not report error to {}", reply.id());
            }
        }
    }

    /// Handle one parsed event that arrived on `conn` on behalf of `identity`
    ///
    /// Returns `Ok` without doing anything when `conn` is unbound.
    pub async fn dispatch(
        &self,
        identity: Option<&Identity>,
        conn: &ConnectionHandle,
        event: ClientEvent,
    ) -> BackendResult<()> {
        let bound = self.presence.bound_user(conn);
        let Some(identity) = identity.filter(|id| bound == Some(id.user_id)) else {
            tracing::debug!(
                "[Realtime] Ignoring {} on unbound connection {}",
                event.name(),
                conn.id()
            );
            return Ok(());
        };

        match event {
            ClientEvent::SendMessage(SendMessage {
                receiver_id,
                content,
            }) => {
                let receiver_id = receiver_id.ok_or_else(|| SharedError::missing("receiver_id"))?;
                let content = content.ok_or_else(|| SharedError::missing("content"))?;
                self.conversations
                    .send_message(identity, receiver_id, &content)
                    .await?;
            }
            ClientEvent::MarkRead(MarkRead { sender_id }) => {
                self.conversations
                    .mark_read(Some(identity.user_id), sender_id)
                    .await?;
            }
            ClientEvent::CallUser(CallUser {
                user_to_call,
                signal_data,
                ..
            }) => {
                let callee = user_to_call.ok_or_else(|| SharedError::missing("userToCall"))?;
                self.signaling.initiate_call(identity, callee, signal_data);
            }
            ClientEvent::AnswerCall(AnswerCall { to, signal }) => {
                let caller = to.ok_or_else(|| SharedError::missing("to"))?;
                self.signaling.accept_call(identity, caller, signal);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::realtime::delivery::DeliveryRouter;
    use crate::backend::server::config::connect_in_memory;
    use crate::shared::EventType;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Fixture {
        dispatcher: EventDispatcher,
        presence: PresenceRegistry,
        alice: Identity,
        bob: Identity,
    }

    async fn fixture() -> Fixture {
        let pool = connect_in_memory().await.unwrap();
        let alice = create_user(&pool, "alice", "x").await.unwrap().identity();
        let bob = create_user(&pool, "bob", "x").await.unwrap().identity();

        let presence = PresenceRegistry::new();
        let delivery = DeliveryRouter::new(presence.clone());
        let dispatcher = EventDispatcher::new(
            presence.clone(),
            ConversationService::new(pool, delivery.clone()),
            SignalingRelay::new(delivery),
        );

        Fixture {
            dispatcher,
            presence,
            alice,
            bob,
        }
    }

    fn connect(presence: &PresenceRegistry, identity: &Identity) -> (ConnectionHandle, mpsc::Receiver<RealtimeEvent>) {
        let (handle, rx) = ConnectionHandle::channel(16);
        presence.register(identity.user_id, handle.clone());
        (handle, rx)
    }

    #[tokio::test]
    async fn test_send_message_frame() {
        let f = fixture().await;
        let (alice_conn, mut alice_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);

        let frame = json!({"event": "send_message", "data": {"receiver_id": f.bob.user_id, "content": "hi"}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &alice_conn, &frame.to_string())
            .await;

        let to_bob = bob_rx.try_recv().unwrap();
        assert_eq!(to_bob.event_type, EventType::MessageReceived);
        assert_eq!(to_bob.payload["content"], "hi");
        assert_eq!(alice_rx.try_recv().unwrap(), to_bob);
    }

    #[tokio::test]
    async fn test_validation_error_goes_back_to_sender_only() {
        let f = fixture().await;
        let (alice_conn, mut alice_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);

        let frame = json!({"event": "send-message", "data": {"receiver_id": f.bob.user_id, "content": "   "}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &alice_conn, &frame.to_string())
            .await;

        let reply = alice_rx.try_recv().unwrap();
        assert_eq!(reply.event_type, EventType::Error);
        assert_eq!(reply.payload["event"], "send-message");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let f = fixture().await;
        let (alice_conn, _alice_rx) = connect(&f.presence, &f.alice);

        for event in [
            ClientEvent::MarkRead(MarkRead { sender_id: None }),
            ClientEvent::AnswerCall(AnswerCall::default()),
            ClientEvent::CallUser(CallUser::default()),
            ClientEvent::SendMessage(SendMessage {
                receiver_id: Some(f.bob.user_id),
                content: None,
            }),
        ] {
            let err = f
                .dispatcher
                .dispatch(Some(&f.alice), &alice_conn, event)
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[tokio::test]
    async fn test_unbound_connection_is_ignored() {
        let f = fixture().await;
        let (stranger, mut stranger_rx) = ConnectionHandle::channel(4);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);

        let frame = json!({"event": "call-user", "data": {"userToCall": f.bob.user_id, "signalData": {}}});
        f.dispatcher.handle_frame(None, &stranger, &frame.to_string()).await;

        assert!(bob_rx.try_recv().is_err());
        assert!(stranger_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_logged_out_connection_is_ignored() {
        let f = fixture().await;
        let (alice_conn, mut alice_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);
        f.presence.evict(f.alice.user_id);

        let frame = json!({"event": "send-message", "data": {"receiver_id": f.bob.user_id, "content": "hi"}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &alice_conn, &frame.to_string())
            .await;

        assert!(bob_rx.try_recv().is_err());
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_logged_out_connection_stays_ignored_after_reconnect() {
        let f = fixture().await;
        let (old_conn, mut old_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);
        f.presence.evict(f.alice.user_id);
        let (_new_conn, mut new_rx) = connect(&f.presence, &f.alice);

        let frame = json!({"event": "send-message", "data": {"receiver_id": f.bob.user_id, "content": "from the old socket"}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &old_conn, &frame.to_string())
            .await;
        let call = json!({"event": "call-user", "data": {"userToCall": f.bob.user_id, "signalData": {}}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &old_conn, &call.to_string())
            .await;

        assert!(bob_rx.try_recv().is_err());
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_err());
        let history = f
            .dispatcher
            .conversations
            .fetch_conversation(f.bob.user_id, f.alice.user_id)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_connection_is_ignored() {
        let f = fixture().await;
        let (old_conn, _old_rx) = connect(&f.presence, &f.alice);
        let (_new_conn, _new_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);

        let frame = json!({"event": "call-user", "data": {"userToCall": f.bob.user_id, "signalData": {}}});
        f.dispatcher
            .handle_frame(Some(&f.alice), &old_conn, &frame.to_string())
            .await;

        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_identity_must_match_binding() {
        let f = fixture().await;
        let (alice_conn, _alice_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);
        let mallory = Identity::new(f.bob.user_id + 100, "mallory");

        let frame = json!({"event": "call-user", "data": {"userToCall": f.bob.user_id, "signalData": {}}});
        f.dispatcher
            .handle_frame(Some(&mallory), &alice_conn, &frame.to_string())
            .await;

        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_call_uses_bound_identity_not_payload() {
        let f = fixture().await;
        let (alice_conn, _alice_rx) = connect(&f.presence, &f.alice);
        let (_bob_conn, mut bob_rx) = connect(&f.presence, &f.bob);

        let frame = json!({
            "event": "call-user",
            "data": {"userToCall": f.bob.user_id, "signalData": {"type": "request_id"}, "from": 999},
        });
        f.dispatcher
            .handle_frame(Some(&f.alice), &alice_conn, &frame.to_string())
            .await;

        let event = bob_rx.try_recv().unwrap();
        assert_eq!(event.event_type, EventType::IncomingCall);
        assert_eq!(event.payload["from"], f.alice.user_id);
        assert_eq!(event.payload["from_username"], "alice");
    }

    #[tokio::test]
    async fn test_garbage_frame_is_ignored() {
        let f = fixture().await;
        let (alice_conn, mut alice_rx) = connect(&f.presence, &f.alice);

        f.dispatcher.handle_frame(Some(&f.alice), &alice_conn, "not json").await;
        f.dispatcher
            .handle_frame(Some(&f.alice), &alice_conn, r#"{"event":"join","data":{}}"#)
            .await;

        assert!(alice_rx.try_recv().is_err());
    }
}
