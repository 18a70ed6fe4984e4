//! Common test utilities
//!
//! - in-memory application state with a cheap bcrypt cost
//! - user + token fixtures
//! - a real TCP listener for WebSocket tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum_test::TestServer;
use tokio::net::TcpListener;

use peerchat::backend::auth::users::register_user;
use peerchat::backend::server::config::connect_in_memory;
use peerchat::backend::server::{create_app, AppState};
use peerchat::shared::{AppConfig, Identity, UserId};

pub const TEST_PASSWORD: &str = "password123";

pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .database_url("sqlite::memory:")
        .jwt_secret("test-secret")
        .bcrypt_cost(4)
        .outbound_buffer(32)
        .build()
        .expect("test config is valid")
}

/// Fresh state over a private in-memory database
pub async fn test_state() -> AppState {
    let pool = connect_in_memory().await.expect("in-memory database");
    AppState::new(pool, test_config())
}

pub fn test_server(state: &AppState) -> TestServer {
    TestServer::new(create_app(state.clone())).expect("test server")
}

/// A registered user plus a valid session token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }
}

pub async fn create_test_user(state: &AppState, username: &str) -> TestUser {
    let user = register_user(&state.db_pool, username, TEST_PASSWORD, state.config.bcrypt_cost)
        .await
        .expect("register test user");
    let token = state
        .sessions
        .create_token(&user.identity())
        .expect("issue test token");

    TestUser {
        id: user.id,
        username: user.username,
        token,
    }
}

/// Serve the app on an ephemeral local port
pub async fn spawn_server(state: &AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = create_app(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    addr
}

/// Poll until `check` holds, failing the test after two seconds
pub async fn wait_until<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
