//! End-to-end tests of the HTTP surface using `tower::ServiceExt::oneshot`

mod common;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use common::{config_in, upload_request, EXE, PNG};
use media_vault::prelude::{FileStorage, VaultState};
use serde_json::Value;
use std::net::SocketAddr;
use tempfile::TempDir;
use tower::ServiceExt;

async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn app() -> (Router, VaultState, TempDir) {
    let temp = TempDir::new().unwrap();
    let state = VaultState::new(config_in(temp.path())).await.unwrap();
    let app = media_vault::handlers::router(state.clone());
    (app, state, temp)
}

#[tokio::test]
async fn png_upload_round_trips_into_catalog() {
    let (app, state, _temp) = app().await;

    let mut request = upload_request(&[("My Photo!.png", PNG)]);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 40000))));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["errors"], serde_json::json!([]));
    assert_eq!(body["success"][0]["original_name"], "My Photo!.png");
    let saved = body["success"][0]["saved_name"].as_str().unwrap().to_string();
    assert!(saved.ends_with("_My_Photo_.png"));

    let response = app
        .clone()
        .oneshot(Request::get("/catalog").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let catalog = read_json(response).await;
    let entries = catalog.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["original_name"], "My_Photo_.png");
    assert_eq!(entries[0]["persisted_name"], saved.as_str());
    assert_eq!(entries[0]["media_type"], "image");

    let audit = state.audit().read_all().await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].source_address, "198.51.100.4");
    assert_eq!(audit[0].persisted_name, saved);
}

#[tokio::test]
async fn php_upload_is_rejected_before_sniffing() {
    let (app, state, _temp) = app().await;

    let response = app
        .oneshot(upload_request(&[("avatar.php", PNG)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], serde_json::json!([]));
    assert_eq!(body["errors"][0], "Dangerous file type: avatar.php");
    assert!(state.storage().list().await.unwrap().is_empty());
    assert!(state.audit().read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn renamed_executable_is_rejected() {
    let (app, state, _temp) = app().await;

    let response = app
        .oneshot(upload_request(&[("holiday.jpg", EXE), ("cat.png", PNG)]))
        .await
        .unwrap();
    let body = read_json(response).await;

    assert_eq!(body["errors"], serde_json::json!(["Invalid file type: holiday.jpg"]));
    assert_eq!(body["success"].as_array().unwrap().len(), 1);
    assert_eq!(state.storage().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut config = config_in(temp.path());
    config.uploads.max_file_size = 32;
    let state = VaultState::new(config).await.unwrap();
    let app = media_vault::handlers::router(state.clone());

    let response = app.oneshot(upload_request(&[("cat.png", PNG)])).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["errors"], serde_json::json!(["File too large: cat.png (max 32 B)"]));
    assert!(state.storage().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn other_methods_are_refused() {
    let (app, _state, _temp) = app().await;

    let response = app
        .oneshot(Request::get("/upload").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = read_json(response).await;
    assert_eq!(
        body,
        serde_json::json!({ "success": [], "errors": ["Invalid request method"] })
    );
}

#[tokio::test]
async fn non_multipart_upload_reports_no_files() {
    let (app, _state, _temp) = app().await;

    let response = app
        .oneshot(
            Request::post("/upload")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["errors"], serde_json::json!(["No files uploaded"]));
}

#[tokio::test]
async fn delete_cannot_escape_the_root() {
    let (app, state, temp) = app().await;
    std::fs::write(temp.path().join("outside.txt"), b"precious").unwrap();

    for uri in [
        "/delete?file=..%2Foutside.txt",
        "/delete?file=%2Fetc%2Fpasswd",
        "/delete?file=.htaccess",
        "/files/..%2Foutside.txt",
    ] {
        let method = if uri.starts_with("/files") { "DELETE" } else { "GET" };
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = read_json(response).await;
        assert_eq!(body["success"], false, "{uri}");
    }

    assert!(temp.path().join("outside.txt").exists());
    assert!(state.config().storage.root.join(".htaccess").exists());
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let (app, _state, _temp) = app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
