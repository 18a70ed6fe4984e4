/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the auth and profile handlers.
 */

use serde::{Deserialize, Serialize};

use crate::shared::Profile;

/// Body of `POST /api/auth/register` and `POST /api/auth/login`
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Returned by register and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: Profile,
}

/// Body of `PUT /api/profile`; absent fields are left unchanged
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
