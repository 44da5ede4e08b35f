//! Integration tests for `GET /static/{*path}`.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, build_test_app, get};

#[tokio::test]
async fn serves_files_under_the_storage_root() {
    let app = build_test_app();
    let keyframes = app.data_dir().join("keyframes");
    tokio::fs::create_dir_all(&keyframes).await.unwrap();
    tokio::fs::write(keyframes.join("demo-shot-1.jpg"), b"jpeg bytes").await.unwrap();

    let response = get(&app, "/static/keyframes/demo-shot-1.jpg").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(body_bytes(response).await, b"jpeg bytes");
}

#[tokio::test]
async fn missing_files_are_not_found() {
    let app = build_test_app();
    let response = get(&app, "/static/keyframes/nothing.jpg").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directories_are_not_served() {
    let app = build_test_app();
    tokio::fs::create_dir_all(app.data_dir().join("keyframes")).await.unwrap();

    let response = get(&app, "/static/keyframes").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_outside_the_root_is_rejected() {
    let app = build_test_app();

    for uri in [
        "/static/..%2Fvidsum-secret.txt",
        "/static/keyframes/..%2F..%2Fvidsum-secret.txt",
        "/static/%2Fetc%2Fpasswd",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_leaving_the_root_are_rejected() {
    let app = build_test_app();
    let outside = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(outside.path(), b"secret").unwrap();
    let keyframes = app.data_dir().join("keyframes");
    std::fs::create_dir_all(&keyframes).unwrap();
    std::os::unix::fs::symlink(outside.path(), keyframes.join("link.jpg")).unwrap();

    let response = get(&app, "/static/keyframes/link.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
