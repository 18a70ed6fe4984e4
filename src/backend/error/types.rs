/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the server.
 *
 * # Error Categories
 *
 * - `SharedError` - validation failures; reported to the immediate caller only
 * - `AuthenticationError` - missing or invalid credentials/session token
 * - `NotFoundError` - a looked-up record does not exist (HTTP lookups only;
 *   an offline delivery target is never an error)
 * - `ConflictError` - uniqueness violations such as a taken username
 * - `StorageError` - the message log or user store failed; aborts the operation
 *
 * Token and password-hash failures are server faults and map to 500, except
 * where the auth layer explicitly turns them into `AuthenticationError`.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use peerchat::backend::error::BackendError;
///
/// let err = BackendError::authentication("Invalid credentials");
/// assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Input validation error (from the shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// The caller is not (or no longer) authenticated
    #[error("Authentication error: {message}")]
    AuthenticationError {
        /// Human-readable error message
        message: String,
    },

    /// A requested record does not exist
    #[error("Not found: {message}")]
    NotFoundError {
        /// Human-readable error message
        message: String,
    },

    /// A uniqueness constraint would be violated
    #[error("Conflict: {message}")]
    ConflictError {
        /// Human-readable error message
        message: String,
    },

    /// Storage collaborator failure
    #[error("Storage error: {0}")]
    StorageError(#[from] sqlx::Error),

    /// Schema migration failure at startup
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// Session token could not be issued
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    /// Password hashing or verification failed
    #[error("Password hash error: {0}")]
    PasswordHashError(#[from] bcrypt::BcryptError),

    /// Listener or socket failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BackendError {
    /// Create a validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    /// Create a new authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictError {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::SharedError(_))
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `SharedError` - 400
    /// - `AuthenticationError` - 401
    /// - `NotFoundError` - 404
    /// - `ConflictError` - 409
    /// - everything else - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::ConflictError { .. } => StatusCode::CONFLICT,
            Self::StorageError(_)
            | Self::MigrationError(_)
            | Self::TokenError(_)
            | Self::PasswordHashError(_)
            | Self::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message that is safe to show a client
    ///
    /// Server faults are reported generically; their details go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::SharedError(err) => err.to_string(),
            Self::AuthenticationError { message }
            | Self::NotFoundError { message }
            | Self::ConflictError { message } => message.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}
