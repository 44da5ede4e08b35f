//! Integration tests for the `/api/videos` routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_bytes, post_json, register};
use serde_json::json;
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_db::{Fault, VideoStore};

#[tokio::test]
async fn register_returns_id_upload_url_and_location() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/videos",
        json!({ "fileName": "demo.mp4", "contentType": "video/mp4" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    let json = body_json(response).await;
    let id = json["id"].as_str().unwrap();

    assert!(id.starts_with("demo-"));
    assert_eq!(json["uploadUrl"], format!("/api/videos/{id}/upload"));
    assert_eq!(location, format!("/api/videos/{id}"));
}

#[tokio::test]
async fn register_rejects_invalid_file_names() {
    let app = build_test_app();

    let response = post_json(&app, "/api/videos", json!({ "fileName": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(&app, "/api/videos", json!({ "fileName": "a/b.mp4" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_malformed_bodies() {
    let app = build_test_app();
    let response = post_json(&app, "/api/videos", json!({ "name": "demo.mp4" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn full_flow_produces_summary_and_shots() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;

    let response = get(&app, &format!("/api/videos/{id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "created");
    assert!(json["summary"].is_null());

    let response = post_bytes(&app, &format!("/api/videos/{id}/upload"), b"video".to_vec()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id.as_str());

    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        format!("/api/videos/{id}")
    );
    let json = body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert!(json["jobId"].is_string());

    app.scheduler().run_cycle().await.unwrap();

    let response = get(&app, &format!("/api/videos/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["fileName"], "demo.mp4");
    assert!(json["error"].is_null());
    assert!(json["summary"]["bulletsMd"]
        .as_str()
        .unwrap()
        .contains("Product demonstration overview"));
    assert!(json["summary"]["paragraphMd"].is_string());
    assert_eq!(json["summary"]["timeline"]["segments"].as_array().unwrap().len(), 4);

    let response = get(&app, &format!("/api/videos/{id}/shots")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let shots = body_json(response).await;
    let shots = shots.as_array().unwrap();
    assert_eq!(shots.len(), 4);
    assert_eq!(shots[0]["startMs"], 0);
    assert_eq!(shots[3]["endMs"], 30_000);
    assert_eq!(shots[0]["keyframe"], "/static/keyframes/demo-shot-1.jpg");
}

#[tokio::test]
async fn details_are_identical_across_polls() {
    let app = build_test_app();
    let id = register(&app, "tutorial.mp4").await;
    post_bytes(&app, &format!("/api/videos/{id}/upload"), b"x".to_vec()).await;
    post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    app.scheduler().run_cycle().await.unwrap();

    let first = common::body_bytes(get(&app, &format!("/api/videos/{id}")).await).await;
    let second = common::body_bytes(get(&app, &format!("/api/videos/{id}")).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = build_test_app();

    let response = get(&app, "/api/videos/ghost").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = post_bytes(&app, "/api/videos/ghost/upload", b"x".to_vec()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&app, "/api/videos/ghost/process", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(&app, "/api/videos/ghost").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shots_for_unknown_id_are_an_empty_list() {
    let app = build_test_app();
    let response = get(&app, "/api/videos/ghost/shots").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn process_conflicts() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;

    // Nothing uploaded yet.
    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    post_bytes(&app, &format!("/api/videos/{id}/upload"), b"x".to_vec()).await;
    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Already queued.
    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
    let response = post_bytes(&app, &format!("/api/videos/{id}/upload"), b"y".to_vec()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Completed videos are not processed again.
    app.scheduler().run_cycle().await.unwrap();
    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Nor re-uploaded.
    let response = post_bytes(&app, &format!("/api/videos/{id}/upload"), b"y".to_vec()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = build_test_app();
    let id = register(&app, "big.mp4").await;

    let bytes = vec![0u8; common::TEST_MAX_UPLOAD_BYTES + 1];
    let response = post_bytes(&app, &format!("/api/videos/{id}/upload"), bytes).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
    let video = app.store.find_video(&id).await.unwrap().unwrap();
    assert_eq!(video.status, VideoStatus::Created);
}

#[tokio::test]
async fn upload_storage_failure_is_a_sanitized_500() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;
    app.store
        .inject_fault("transition_video", Fault::Permanent, 1)
        .await;

    let response = post_bytes(&app, &format!("/api/videos/{id}/upload"), b"x".to_vec()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn upload_writes_bytes_under_data_dir() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;
    post_bytes(&app, &format!("/api/videos/{id}/upload"), b"payload".to_vec()).await;

    let stored = tokio::fs::read(app.data_dir().join("uploads").join(&id)).await.unwrap();
    assert_eq!(stored, b"payload");
}

#[tokio::test]
async fn failed_processing_is_visible_to_clients() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;
    post_bytes(&app, &format!("/api/videos/{id}/upload"), b"x".to_vec()).await;
    post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    app.store
        .inject_fault("complete_job", Fault::Permanent, 1)
        .await;

    app.scheduler().run_cycle().await.unwrap();

    let json = body_json(get(&app, &format!("/api/videos/{id}")).await).await;
    assert_eq!(json["status"], "failed");
    assert!(json["error"].is_string());
    assert!(json["summary"].is_null());
    let shots = body_json(get(&app, &format!("/api/videos/{id}/shots")).await).await;
    assert_eq!(shots, json!([]));

    // A failed video can be processed again.
    let response = post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn deleting_a_queued_video_fails_its_job() {
    let app = build_test_app();
    let id = register(&app, "demo.mp4").await;
    post_bytes(&app, &format!("/api/videos/{id}/upload"), b"x".to_vec()).await;
    post_json(&app, &format!("/api/videos/{id}/process"), json!({})).await;

    let response = delete(&app, &format!("/api/videos/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    app.scheduler().run_cycle().await.unwrap();

    let response = get(&app, &format!("/api/videos/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let jobs = app.store.jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
}
