mod common;

use albumrip::server::{router, AppState};
use albumrip::Pipeline;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{test_config, FakeSite, StubImages};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const ALBUM_1: &str = "https://sc.example/artist/sets/album-1";
const ALBUM_2: &str = "https://sc.example/artist/sets/album-2";

fn app(site: FakeSite, root: &Path) -> Router {
    let pipeline = Pipeline::new(site, Box::new(StubImages::ok()), test_config(root));
    router(Arc::new(AppState::new(pipeline)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[test_log::test(tokio::test)]
async fn test_missing_links_param_is_bad_request() {
    let root = tempfile::tempdir().unwrap();
    let site = FakeSite::new();

    let (status, body) = get(app(site.clone(), root.path()), "/api/download").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("links"));
    assert_eq!(site.launch_count(), 0);
}

#[test_log::test(tokio::test)]
async fn test_blank_links_param_is_bad_request() {
    let root = tempfile::tempdir().unwrap();
    let (status, _) = get(app(FakeSite::new(), root.path()), "/api/download?links=,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_batch_request_reports_every_link() {
    let root = tempfile::tempdir().unwrap();
    let site = FakeSite::new()
        .album(ALBUM_1, &["https://sc.example/artist/t1"], None)
        .album(ALBUM_2, &["https://sc.example/artist/t2"], None);

    let uri = format!("/api/download?links={ALBUM_1},{ALBUM_2}");
    let (status, body) = get(app(site.clone(), root.path()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links"], serde_json::json!([ALBUM_1, ALBUM_2]));
    assert_eq!(body["albums"].as_array().unwrap().len(), 2);
    assert_eq!(site.downloads().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_batch_request_succeeds_when_an_album_fails() {
    let root = tempfile::tempdir().unwrap();
    let site = FakeSite::new().album(ALBUM_2, &["https://sc.example/artist/t2"], None);

    let uri = format!("/api/download?links={ALBUM_1},{ALBUM_2}");
    let (status, body) = get(app(site, root.path()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links"].as_array().unwrap().len(), 2);
    assert_eq!(body["albums"][0]["album"], "album-2");
}

#[test_log::test(tokio::test)]
async fn test_single_link_returns_tracks() {
    let root = tempfile::tempdir().unwrap();
    let site = FakeSite::new().album(
        ALBUM_1,
        &["https://sc.example/artist/t1", "https://sc.example/artist/t2"],
        None,
    );

    let uri = format!("/api/download?link={ALBUM_1}");
    let (status, body) = get(app(site, root.path()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["album"], "album-1");
    assert_eq!(body["count"], 2);
    assert_eq!(body["tracks"][1], "https://sc.example/artist/t2");
}

#[test_log::test(tokio::test)]
async fn test_single_link_failure_is_bad_gateway() {
    let root = tempfile::tempdir().unwrap();
    let uri = format!("/api/download?link={ALBUM_1}");
    let (status, body) = get(app(FakeSite::new(), root.path()), &uri).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("No tracks found"));
}
