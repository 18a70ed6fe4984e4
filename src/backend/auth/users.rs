/**
 * User Store
 *
 * Users and their credentials. Users are created at registration, changed
 * only by profile edits, and never deleted.
 *
 * # Credentials
 *
 * Passwords are stored as bcrypt hashes. The cost comes from configuration
 * so tests can use the minimum.
 */

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::backend::error::{BackendError, BackendResult};
use crate::shared::{Identity, Profile, SharedError, UserId};

/// Avatar shown until the user picks one
pub const DEFAULT_AVATAR_URL: &str = "https://www.w3schools.com/w3images/avatar2.png";

/// Status line shown until the user writes one
pub const DEFAULT_ABOUT: &str = "Hey there! I am using peerchat.";

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 30;
const PASSWORD_MIN_LEN: usize = 6;

/// A row of the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    /// Unique, 3-30 chars, ASCII alphanumeric + underscore
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: String,
    pub about: String,
    /// Microseconds since the Unix epoch
    pub created_at: i64,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            about: self.about.clone(),
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), SharedError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(SharedError::validation(
            "username",
            format!(
                "Username must be {}-{} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SharedError::validation(
            "username",
            "Username may only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(SharedError::validation(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }
    Ok(())
}

/// Insert a user with the default profile
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, avatar_url, about, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, username, password_hash, avatar_url, about, created_at
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(DEFAULT_AVATAR_URL)
    .bind(DEFAULT_ABOUT)
    .bind(Utc::now().timestamp_micros())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, avatar_url, about, created_at
        FROM users
        WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn get_user_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, avatar_url, about, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn user_exists(pool: &SqlitePool, id: UserId) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Change whichever profile fields are given
///
/// Returns `None` if the user does not exist.
pub async fn update_profile(
    pool: &SqlitePool,
    id: UserId,
    about: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET about = COALESCE(?2, about),
            avatar_url = COALESCE(?3, avatar_url)
        WHERE id = ?1
        RETURNING id, username, password_hash, avatar_url, about, created_at
        "#,
    )
    .bind(id)
    .bind(about)
    .bind(avatar_url)
    .fetch_optional(pool)
    .await
}

/// Validate, hash, and store a new user
///
/// Fails with `ConflictError` if the username is taken.
pub async fn register_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> BackendResult<User> {
    validate_username(username)?;
    validate_password(password)?;

    if get_user_by_username(pool, username).await?.is_some() {
        tracing::warn!("[Auth] Username already exists: {}", username);
        return Err(BackendError::conflict("Username already taken"));
    }

    let password_hash = bcrypt::hash(password, bcrypt_cost)?;

    match create_user(pool, username, &password_hash).await {
        Ok(user) => Ok(user),
        // Lost a race with a concurrent registration of the same name
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(BackendError::conflict("Username already taken"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Check a username/password pair
///
/// Unknown user and wrong password fail identically.
pub async fn verify_credentials(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> BackendResult<User> {
    let invalid = || BackendError::authentication("Invalid username or password");

    let user = get_user_by_username(pool, username)
        .await?
        .ok_or_else(invalid)?;

    if !bcrypt::verify(password, &user.password_hash)? {
        tracing::warn!("[Auth] Wrong password for {}", username);
        return Err(invalid());
    }

    Ok(user)
}
