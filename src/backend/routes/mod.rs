//! Route Configuration Module
//!
//! ```text
//! routes/
//! ├── mod.rs             - Module exports
//! ├── router.rs          - Router assembly, tracing layer, fallback
//! ├── realtime_routes.rs - /ws and /health
//! └── api_routes.rs      - /api/auth, /api/profile, /api/users, /api/messages
//! ```

pub mod router;

pub mod realtime_routes;

pub mod api_routes;

pub use router::create_router;
