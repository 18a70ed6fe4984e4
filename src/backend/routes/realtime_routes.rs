//! WebSocket and health routes
//!
//! - `GET /ws?token=<jwt>` - real-time connection
//! - `GET /health` - liveness plus the number of connected users

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::backend::realtime::presence::PresenceRegistry;
use crate::backend::realtime::socket::ws_handler;
use crate::backend::server::state::AppState;

async fn health(State(presence): State<PresenceRegistry>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "online": presence.online_count(),
    }))
}

pub fn configure_realtime_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
}
