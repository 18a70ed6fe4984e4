//! Backend Module
//!
//! ```text
//! backend/
//! ├── realtime/   - presence, delivery, signaling, WebSocket endpoint
//! ├── messaging/  - message log and conversation service
//! ├── auth/       - users, credentials, session tokens
//! ├── middleware/ - bearer-token authentication
//! ├── routes/     - router assembly
//! ├── server/     - state, database setup, startup
//! └── error/      - BackendError and its HTTP mapping
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Presence, delivery and signaling
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Message log and conversation service
pub mod messaging;

pub use error::{BackendError, BackendResult};
pub use messaging::ConversationService;
pub use realtime::{DeliveryRouter, PresenceRegistry, SignalingRelay};
pub use server::{create_app, AppState};
