//! Authentication Module
//!
//! User accounts, credentials and session tokens.
//!
//! - **`users`** - user store, input validation, bcrypt credentials
//! - **`sessions`** - JWT issue and verification
//! - **`handlers`** - HTTP handlers for the auth and profile endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: username + password → user stored → token returned
//! 2. **Login**: username + password → hash verified → token returned
//! 3. **Authenticated requests**: `Authorization: Bearer <token>`
//! 4. **WebSocket**: the same token as `/ws?token=<token>` binds the
//!    connection to the user
//!
//! Tokens carry `{sub, username, exp, iat}` and are signed with the
//! configured secret.

pub mod users;

pub mod sessions;

pub mod handlers;

pub use handlers::types::{AuthResponse, CredentialsRequest, ProfileUpdate};
pub use handlers::{get_me, login, logout, put_profile, register};
pub use sessions::{Claims, SessionKeys};
