//! peerchat - Real-time Private Messaging Backend
//!
//! Users register, see a roster of peers with unread counts, exchange
//! direct messages, and set up peer-to-peer audio/video calls through a
//! signaling relay.
//!
//! # Module Structure
//!
//! - **`shared`** - Types that cross the wire or the crate boundary
//!   - Message, identity and roster types
//!   - Real-time event envelopes (inbound and outbound)
//!   - Configuration and input errors
//!
//! - **`backend`** - The server
//!   - Presence registry, delivery router, signaling relay
//!   - Conversation service over the SQLite message log
//!   - Authentication, HTTP API, WebSocket endpoint
//!
//! # Usage
//!
//! ```rust,no_run
//! use peerchat::backend::server::{build_state, create_app};
//! use peerchat::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = build_state(AppConfig::default()).await?;
//! let app = create_app(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The presence registry is the only shared in-memory state. It sits behind
//! one `std::sync::Mutex` that is never held across an `.await`. Everything
//! else is either immutable after startup or lives in SQLite.
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` - bad input
//! - `backend::error::BackendError` - everything the server can fail with,
//!   mapped to HTTP status codes

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
