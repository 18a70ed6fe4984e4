/**
 * Real-time Event System
 *
 * This module defines the frames exchanged over a WebSocket connection.
 * Every frame, in both directions, is a JSON object of the form
 * `{"event": <name>, "data": <payload>}`.
 *
 * # Inbound (client → server)
 *
 * - `send-message` `{receiver_id, content}`
 * - `mark-read` `{sender_id}`
 * - `call-user` `{userToCall, signalData, from}`
 * - `answer-call` `{to, signal}`
 *
 * The underscore spellings (`send_message`, ...) are accepted as aliases.
 *
 * # Outbound (server → client)
 *
 * - `message-received` - full message representation
 * - `messages-read` `{reader_id, sender_id}`
 * - `incoming-call` `{signal, from, from_username}`
 * - `call-accepted` - the raw answer signal, unwrapped
 * - `error` `{event, message}` - sent only to the connection that caused it
 */
use serde::{Deserialize, Serialize};

use crate::shared::message::Message;
use crate::shared::user::{Identity, UserId};

/// Name of an outbound real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// A message was persisted; sent to both participants
    MessageReceived,
    /// The receiver consumed the sender's messages
    MessagesRead,
    /// Someone is calling; carries the caller's signal
    IncomingCall,
    /// The callee answered; carries the answer signal
    CallAccepted,
    /// An inbound frame was rejected
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::MessageReceived => "message-received",
            EventType::MessagesRead => "messages-read",
            EventType::IncomingCall => "incoming-call",
            EventType::CallAccepted => "call-accepted",
            EventType::Error => "error",
        }
    }
}

/// Outbound real-time event pushed to one connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeEvent {
    /// Type of event
    #[serde(rename = "event")]
    pub event_type: EventType,
    /// Event payload
    #[serde(rename = "data")]
    pub payload: serde_json::Value,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// `message-received` carrying the full message
    pub fn message_received(message: &Message) -> Self {
        Self::new(EventType::MessageReceived, serde_json::json!(message))
    }

    /// `messages-read`, addressed to the original sender
    pub fn messages_read(reader_id: UserId, sender_id: UserId) -> Self {
        Self::new(
            EventType::MessagesRead,
            serde_json::json!({
                "reader_id": reader_id,
                "sender_id": sender_id,
            }),
        )
    }

    /// `incoming-call`, addressed to the callee
    pub fn incoming_call(caller: &Identity, signal: serde_json::Value) -> Self {
        Self::new(
            EventType::IncomingCall,
            serde_json::json!({
                "signal": signal,
                "from": caller.user_id,
                "from_username": caller.username,
            }),
        )
    }

    /// `call-accepted`; the answer is forwarded as-is
    pub fn call_accepted(answer: serde_json::Value) -> Self {
        Self::new(EventType::CallAccepted, answer)
    }

    /// `error`, naming the inbound event that was rejected
    pub fn error(event: &str, message: impl Into<String>) -> Self {
        Self::new(
            EventType::Error,
            serde_json::json!({
                "event": event,
                "message": message.into(),
            }),
        )
    }
}

/// `send-message` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SendMessage {
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    #[serde(default)]
    pub content: Option<String>,
}

/// `mark-read` payload: the peer whose messages are being acknowledged
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkRead {
    #[serde(default)]
    pub sender_id: Option<UserId>,
}

/// `call-user` payload
///
/// `from` is what the client claims; the server always uses the identity
/// bound to the connection instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallUser {
    #[serde(rename = "userToCall", default)]
    pub user_to_call: Option<UserId>,
    #[serde(rename = "signalData", default)]
    pub signal_data: serde_json::Value,
    #[serde(default)]
    pub from: Option<UserId>,
}

/// `answer-call` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnswerCall {
    #[serde(default)]
    pub to: Option<UserId>,
    #[serde(default)]
    pub signal: serde_json::Value,
}

/// Inbound real-time event received from a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "send-message", alias = "send_message")]
    SendMessage(SendMessage),
    #[serde(rename = "mark-read", alias = "mark_read")]
    MarkRead(MarkRead),
    #[serde(rename = "call-user", alias = "call_user")]
    CallUser(CallUser),
    #[serde(rename = "answer-call", alias = "answer_call")]
    AnswerCall(AnswerCall),
}

impl ClientEvent {
    /// Wire name of the event, used when reporting errors back
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::SendMessage(_) => "send-message",
            ClientEvent::MarkRead(_) => "mark-read",
            ClientEvent::CallUser(_) => "call-user",
            ClientEvent::AnswerCall(_) => "answer-call",
        }
    }
}
