/**
 * Session Tokens
 *
 * HS256 JWTs that carry the user's identity. The same token authenticates
 * HTTP requests (`Authorization: Bearer`) and the WebSocket upgrade
 * (`/ws?token=`).
 *
 * Tokens are stateless: logout removes the presence binding but does not
 * revoke the token.
 */

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::shared::{AppConfig, Identity, UserId};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: UserId,
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.username.clone())
    }
}

/// Signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    /// Issue a token for `identity`
    pub fn create_token(&self, identity: &Identity) -> Result<String, BackendError> {
        let now = now_secs();
        let claims = Claims {
            sub: identity.user_id,
            username: identity.username.clone(),
            exp: now + self.ttl_secs,
            iat: now,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Check signature and expiry
    ///
    /// Any failure is reported as `AuthenticationError`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, BackendError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("[Auth] Token rejected: {}", e);
                BackendError::authentication("Invalid or expired token")
            })
    }
}
