//! Messaging Module
//!
//! - **`db`** - the message log (SQLite)
//! - **`conversation`** - send, fetch, mark-read and roster operations
//! - **`handlers`** - HTTP handlers for history and roster

pub mod db;
pub mod conversation;
pub mod handlers;

pub use conversation::ConversationService;
pub use handlers::{get_messages, list_users};
