//! Shared Module
//!
//! Types that appear on the wire or cross subsystem boundaries: the message
//! representation, real-time event frames, user identity and profile types,
//! input errors and application configuration. Nothing here touches the
//! network or the database.

/// Direct message structure and content validation
pub mod message;

/// Real-time event frames
pub mod event;

/// Identity, profile and roster types
pub mod user;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{Message, MAX_CONTENT_LEN};
pub use event::{ClientEvent, EventType, RealtimeEvent};
pub use user::{Identity, Peer, Profile, UserId};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
