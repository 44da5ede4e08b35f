use std::sync::Arc;

use vidsum_db::VideoStore;
use vidsum_pipeline::VideoManager;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VideoStore>,
    pub manager: Arc<VideoManager>,
    pub config: Arc<ServerConfig>,
}
