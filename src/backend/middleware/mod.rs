//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - bearer-token authentication for the `/api` routes that
//!   need a signed-in user

pub mod auth;

pub use auth::{auth_middleware, AuthUser};
