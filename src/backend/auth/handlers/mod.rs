//! Authentication Handlers Module
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports
//! ├── types.rs    - Request and response types
//! ├── register.rs - POST /api/auth/register
//! ├── login.rs    - POST /api/auth/login
//! ├── me.rs       - GET  /api/auth/me
//! ├── logout.rs   - POST /api/auth/logout
//! └── profile.rs  - PUT  /api/profile
//! ```
//!
//! Register and login are public; the rest sit behind
//! [`auth_middleware`](crate::backend::middleware::auth_middleware).

pub mod types;
pub mod register;
pub mod login;
pub mod me;
pub mod logout;
pub mod profile;

pub use types::{AuthResponse, CredentialsRequest, ProfileUpdate};

pub use register::register;
pub use login::login;
pub use me::get_me;
pub use logout::logout;
pub use profile::put_profile;
