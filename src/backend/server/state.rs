/**
 * Application State Management
 *
 * `AppState` is the one state container handed to the router. Every field
 * is cheap to clone and shares its underlying resources, so handlers can
 * take the whole state or, via the `FromRef` impls, just the part they use.
 *
 * # Components
 *
 * - `db_pool` - SQLite pool behind the user store and message log
 * - `presence` - user → live WebSocket connection
 * - `conversations` - message send/fetch/mark-read
 * - `dispatcher` - routes inbound WebSocket frames to the conversation
 *   service and the signaling relay
 * - `sessions` - JWT signing keys
 *
 * The presence registry is the only in-memory mutable state; the delivery
 * router behind the conversation service and the signaling relay holds a
 * clone of the same registry.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::messaging::conversation::ConversationService;
use crate::backend::realtime::delivery::DeliveryRouter;
use crate::backend::realtime::dispatch::EventDispatcher;
use crate::backend::realtime::presence::PresenceRegistry;
use crate::backend::realtime::signaling::SignalingRelay;
use crate::shared::AppConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub presence: PresenceRegistry,
    pub conversations: ConversationService,
    pub dispatcher: EventDispatcher,
    pub sessions: SessionKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire up every component around an open pool
    pub fn new(db_pool: SqlitePool, config: AppConfig) -> Self {
        let presence = PresenceRegistry::new();
        let delivery = DeliveryRouter::new(presence.clone());
        let conversations = ConversationService::new(db_pool.clone(), delivery.clone());
        let signaling = SignalingRelay::new(delivery);
        let dispatcher = EventDispatcher::new(presence.clone(), conversations.clone(), signaling);
        let sessions = SessionKeys::from_config(&config);

        Self {
            db_pool,
            presence,
            conversations,
            dispatcher,
            sessions,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for PresenceRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.presence.clone()
    }
}

impl FromRef<AppState> for ConversationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.conversations.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
