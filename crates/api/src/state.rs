use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sokoni_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing marketplace events.
    pub event_bus: Arc<sokoni_events::EventBus>,
    /// Fire-and-forget notification emitter.
    pub notifier: Arc<sokoni_events::Notifier>,
}
