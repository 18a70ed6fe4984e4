/**
 * Signaling Relay
 *
 * Forwards WebRTC call setup payloads between two users. The relay does
 * not track call state (ringing, active, ended); timeouts, busy handling
 * and hangup are client concerns, carried inside the opaque signal.
 *
 * - `initiate_call` → callee receives `incoming-call {signal, from, from_username}`
 * - `accept_call` → caller receives `call-accepted` with the answer as-is
 *
 * Calling someone who is offline is not an error; the signal is dropped.
 */

use crate::backend::realtime::delivery::{Delivery, DeliveryRouter};
use crate::shared::{Identity, RealtimeEvent, UserId};

#[derive(Debug, Clone)]
pub struct SignalingRelay {
    delivery: DeliveryRouter,
}

impl SignalingRelay {
    pub fn new(delivery: DeliveryRouter) -> Self {
        Self { delivery }
    }

    /// Relay a call offer from `caller` to `callee_id`
    pub fn initiate_call(
        &self,
        caller: &Identity,
        callee_id: UserId,
        signal: serde_json::Value,
    ) -> Delivery {
        tracing::debug!(
            "[Signaling] {} ({}) calling user {}",
            caller.username,
            caller.user_id,
            callee_id
        );
        self.delivery
            .deliver(callee_id, RealtimeEvent::incoming_call(caller, signal))
    }

    /// Relay the answer from `callee` back to `caller_id`
    pub fn accept_call(
        &self,
        callee: &Identity,
        caller_id: UserId,
        answer: serde_json::Value,
    ) -> Delivery {
        tracing::debug!(
            "[Signaling] {} ({}) answered user {}",
            callee.username,
            callee.user_id,
            caller_id
        );
        self.delivery
            .deliver(caller_id, RealtimeEvent::call_accepted(answer))
    }
}
