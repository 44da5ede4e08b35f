pub mod health;
pub mod static_files;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /videos                     register (POST)
/// /videos/{id}                details (GET), delete (DELETE)
/// /videos/{id}/upload         raw upload (POST)
/// /videos/{id}/process        enqueue processing (POST)
/// /videos/{id}/shots          shot list (GET)
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().nest("/videos", videos::router(max_upload_bytes))
}
