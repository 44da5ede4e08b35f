//! Serves files from the storage root under `/static`.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use vidsum_core::error::CoreError;
use vidsum_core::storage;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /static/{*path}
///
/// Anything that does not resolve to a regular file inside the storage
/// root, symlinks included, is reported as not found.
pub async fn serve(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "File",
            id: path.clone(),
        })
    };

    let root = &state.config.data_dir;
    let candidate = storage::resolve_static_path(root, &path).map_err(|e| {
        tracing::warn!(path = %path, error = %e, "Rejected static path");
        not_found()
    })?;

    let root = tokio::fs::canonicalize(root).await.map_err(|_| not_found())?;
    let resolved = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(|_| not_found())?;
    if !resolved.starts_with(&root) {
        tracing::warn!(path = %path, "Static path resolves outside the storage root");
        return Err(not_found());
    }

    let metadata = tokio::fs::metadata(&resolved).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let file = tokio::fs::File::open(&resolved)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, storage::content_type_for_extension(&path))
        .header(header::CONTENT_LENGTH, metadata.len().to_string())
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
