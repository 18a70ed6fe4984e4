/**
 * Router Configuration
 *
 * Combines the real-time and API routes into one router, adds request
 * tracing, and attaches the application state.
 *
 * Unknown paths answer with a JSON 404 in the same shape as every other
 * error.
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::realtime_routes::configure_realtime_routes;
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();
    let router = configure_realtime_routes(router);
    let router = configure_api_routes(router, &app_state);

    router
        .fallback(|| async { BackendError::not_found("Route not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
