//! Route definitions for the `/videos` resource.
//!
//! ```text
//! POST   /                 register
//! GET    /{id}             get_details
//! DELETE /{id}             delete
//! POST   /{id}/upload      upload
//! POST   /{id}/process     process
//! GET    /{id}/shots       list_shots
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(videos::register))
        .route("/{id}", get(videos::get_details).delete(videos::delete))
        .route(
            "/{id}/upload",
            post(videos::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}/process", post(videos::process))
        .route("/{id}/shots", get(videos::list_shots))
}
