use std::sync::Arc;

use homegate_core::state::StatusStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Latest monitor run, written by the background loop.
    pub status: Arc<StatusStore>,
    pub config: Arc<ServerConfig>,
}
