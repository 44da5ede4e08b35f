use axum::routing::get;
use axum::Router;

use crate::handlers::static_files;
use crate::state::AppState;

/// Mount `GET /static/{*path}` (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/static/{*path}", get(static_files::serve))
}
