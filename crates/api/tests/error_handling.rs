//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use vidsum_api::error::AppError;
use vidsum_core::error::CoreError;
use vidsum_db::StoreError;
use vidsum_pipeline::LifecycleError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Lifecycle(LifecycleError::NotFound {
        entity: "Video",
        id: "demo-1".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Video with id demo-1 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("fileName must not be empty".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "fileName must not be empty");
}

#[tokio::test]
async fn conflict_errors_return_409() {
    let (status, json) =
        error_to_response(AppError::Lifecycle(LifecycleError::Conflict("already queued".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "already queued");

    let (status, json) = error_to_response(AppError::Store(StoreError::Conflict(
        "Duplicate value violates unique constraint: uq_summaries_video_id".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn store_failures_return_sanitized_500() {
    let err = AppError::Lifecycle(LifecycleError::Store(StoreError::Unavailable(
        "connection refused at 10.0.0.5".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn upload_io_failures_return_sanitized_500() {
    let err = AppError::Lifecycle(LifecycleError::Upload(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "/srv/data/uploads denied",
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn payload_too_large_returns_413() {
    let (status, json) = error_to_response(AppError::PayloadTooLarge("too big".into())).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
}
