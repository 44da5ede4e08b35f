//! Handlers for the `/videos` resource.
//!
//! Request and response bodies use camelCase keys.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use vidsum_core::storage;
use vidsum_core::types::EntityId;
use vidsum_db::models::shot::Shot;
use vidsum_db::models::summary::Summary;
use vidsum_pipeline::video_url;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVideoRequest {
    pub file_name: String,
    /// Accepted for compatibility; the stored type is inferred from the bytes.
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVideoResponse {
    pub id: String,
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub id: String,
    pub job_id: EntityId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub bullets_md: String,
    pub paragraph_md: String,
    pub timeline: serde_json::Value,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            bullets_md: summary.bullets_md,
            paragraph_md: summary.paragraph_md,
            timeline: summary.timeline,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailsResponse {
    pub id: String,
    pub file_name: String,
    pub status: vidsum_core::status::VideoStatus,
    pub error: Option<String>,
    pub summary: Option<SummaryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotResponse {
    pub id: EntityId,
    pub start_ms: i32,
    pub end_ms: i32,
    /// Public URL of the keyframe image.
    pub keyframe: Option<String>,
}

impl From<Shot> for ShotResponse {
    fn from(shot: Shot) -> Self {
        Self {
            id: shot.id,
            start_ms: shot.start_ms,
            end_ms: shot.end_ms,
            keyframe: shot.keyframe_path.as_deref().map(storage::keyframe_url),
        }
    }
}

/// POST /api/videos
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterVideoRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::debug!(
        file_name = %input.file_name,
        content_type = input.content_type.as_deref(),
        "Registering video",
    );

    let registration = state.manager.register(&input.file_name).await?;
    let id = registration.video.id;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(LOCATION, video_url(&id))]),
        Json(RegisterVideoResponse {
            id,
            upload_url: registration.upload_url,
        }),
    ))
}

/// POST /api/videos/{id}/upload
///
/// The request body is the raw file content.
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<UploadResponse>> {
    let bytes = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(format!(
                "Upload exceeds the limit of {} bytes",
                state.config.max_upload_bytes
            ))
        } else {
            AppError::BadRequest(e.body_text())
        }
    })?;

    state.manager.store_upload(&id, &bytes).await?;
    Ok(Json(UploadResponse { id }))
}

/// POST /api/videos/{id}/process
pub async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.manager.enqueue(&id).await?;

    Ok((
        StatusCode::ACCEPTED,
        AppendHeaders([(LOCATION, video_url(&id))]),
        Json(ProcessResponse { id, job_id: job.id }),
    ))
}

/// GET /api/videos/{id}
pub async fn get_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VideoDetailsResponse>> {
    let details = state.manager.get_details(&id).await?;
    let video = details.video;

    Ok(Json(VideoDetailsResponse {
        id: video.id,
        file_name: video.file_name,
        status: video.status,
        error: video.error,
        summary: details.summary.map(SummaryResponse::from),
    }))
}

/// GET /api/videos/{id}/shots
///
/// Unknown ids yield an empty list rather than 404.
pub async fn list_shots(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ShotResponse>>> {
    let shots = state.manager.list_shots(&id).await?;
    Ok(Json(shots.into_iter().map(ShotResponse::from).collect()))
}

/// DELETE /api/videos/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    state.manager.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
