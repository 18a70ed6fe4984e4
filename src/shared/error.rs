//! Shared Error Types
//!
//! Errors that describe bad input rather than server faults. They are raised
//! by validation helpers in the shared types and surface to the immediate
//! caller only: an HTTP 400 body, or an `error` event on the WebSocket that
//! sent the offending frame.
//!
//! # Usage
//!
//! ```rust
//! use peerchat::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message content cannot be empty");
//! assert_eq!(
//!     error.to_string(),
//!     "Validation error in field 'content': Message content cannot be empty"
//! );
//! ```
use thiserror::Error;

/// Input errors shared by the HTTP and real-time surfaces
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a required field that was absent
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} is required", field);
        Self::ValidationError { field, message }
    }
}
