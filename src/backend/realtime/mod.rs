//! Real-time Delivery Module
//!
//! Presence, delivery and signaling over WebSocket connections.
//!
//! - **`presence`** - user → live connection registry
//! - **`delivery`** - best-effort push of one event to one user
//! - **`signaling`** - WebRTC call setup relay
//! - **`dispatch`** - inbound frame → service call
//! - **`socket`** - the `/ws` endpoint and per-connection tasks
//!
//! # Event Flow
//!
//! ```text
//! client frame ─► socket reader ─► EventDispatcher
//!                                      │
//!                  ConversationService / SignalingRelay
//!                                      │
//!                  DeliveryRouter ─► PresenceRegistry lookup
//!                                      │
//!                  target's outbound queue ─► socket writer ─► client
//! ```
//!
//! There are no rooms or broadcast groups: every push is addressed to one
//! user, and a user has at most one addressable connection.

pub mod presence;
pub mod delivery;
pub mod signaling;
pub mod dispatch;
pub mod socket;

pub use delivery::{Delivery, DeliveryRouter};
pub use dispatch::EventDispatcher;
pub use presence::{ConnectionHandle, ConnectionId, PresenceRegistry, PushError};
pub use signaling::SignalingRelay;
pub use socket::ws_handler;
