use std::sync::Arc;

use collab_db::ProjectRegistry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The project/file registry over the configured store.
    pub registry: Arc<ProjectRegistry>,
    /// Server configuration (upload limits, CORS, timeouts).
    pub config: Arc<ServerConfig>,
}
