//! Application configuration module
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables. The binary loads `.env` before calling
//! [`AppConfig::load`], so values from there count as environment too.
//!
//! | key | env | default |
//! |---|---|---|
//! | `bind_addr` | `PORT` (port only) | `0.0.0.0:5001` |
//! | `database_url` | `DATABASE_URL` | `sqlite://peerchat.db` |
//! | `max_connections` | | `8` |
//! | `jwt_secret` | `JWT_SECRET` | development secret |
//! | `token_ttl_secs` | | 30 days |
//! | `bcrypt_cost` | | `12` |
//! | `outbound_buffer` | | `64` |
//! | `log_filter` | `RUST_LOG` | `info` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "peerchat-development-secret";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: SocketAddr,
    /// sqlx SQLite connection URL
    pub database_url: String,
    /// Size of the SQLite connection pool
    pub max_connections: u32,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime
    pub token_ttl_secs: u64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Per-connection outbound queue length; pushes beyond it are dropped
    pub outbound_buffer: usize,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5001)),
            database_url: "sqlite://peerchat.db".to_string(),
            max_connections: 8,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_secs: 30 * 24 * 60 * 60,
            bcrypt_cost: 12,
            outbound_buffer: 64,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from defaults, an optional TOML file and the
    /// process environment
    ///
    /// When `path` is `None`, `PEERCHAT_CONFIG` is consulted, then
    /// `./peerchat.toml`; a missing default file is not an error, a missing
    /// explicitly named one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("PEERCHAT_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new("peerchat.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overlay environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("PORT", port.clone()))?;
            self.bind_addr.set_port(port);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(filter) = lookup("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("database_url"));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections", "0".to_string()));
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue("outbound_buffer", "0".to_string()));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "bcrypt_cost",
                self.bcrypt_cost.to_string(),
            ));
        }
        Ok(())
    }

    /// True when still signing tokens with the built-in development secret
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn token_ttl_secs(mut self, secs: u64) -> Self {
        self.config.token_ttl_secs = secs;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    pub fn outbound_buffer(mut self, len: usize) -> Self {
        self.config.outbound_buffer = len;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
