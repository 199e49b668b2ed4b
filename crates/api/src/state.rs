use std::sync::Arc;

use briefdesk_events::EventBus;

use crate::config::ServerConfig;
use crate::uploads::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Document store handle.
    pub pool: briefdesk_db::DbPool,
    /// Server configuration (JWT settings, trial length, plan price).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Destination for multipart uploads.
    pub uploads: Arc<UploadStore>,
}
