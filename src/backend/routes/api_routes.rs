/**
 * API Routes
 *
 * ## Public
 * - `POST /api/auth/register`
 * - `POST /api/auth/login`
 *
 * ## Authenticated (`Authorization: Bearer <token>`)
 * - `GET  /api/auth/me`
 * - `POST /api/auth/logout`
 * - `PUT  /api/profile`
 * - `GET  /api/users`
 * - `GET  /api/messages/{peer_id}`
 */

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::{get_me, login, logout, put_profile, register};
use crate::backend::messaging::{get_messages, list_users};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/logout", post(logout))
        .route("/api/profile", put(put_profile))
        .route("/api/users", get(list_users))
        .route("/api/messages/{peer_id}", get(get_messages))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
}
