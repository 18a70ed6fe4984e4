//! Server Module
//!
//! - **`config`** - SQLite pool setup and migrations
//! - **`state`** - `AppState` and its `FromRef` impls
//! - **`init`** - state construction, router creation, serving
//!
//! # Example
//!
//! ```rust,no_run
//! use peerchat::backend::server::serve;
//! use peerchat::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! serve(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod state;

pub mod config;

pub mod init;

pub use init::{build_state, create_app, serve};
pub use state::AppState;
