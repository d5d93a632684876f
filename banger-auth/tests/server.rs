#![cfg(feature = "server")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use banger_auth::server::{self, models::SessionSummary, AppState};
use banger_auth::testing::RecordingNavigator;
use banger_auth::{bootstrap_with, CredentialStore, QueryCache, Settings};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn mock_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        enable_mocks: true,
        ..Settings::default()
    };
    let context = bootstrap_with(
        settings,
        Arc::new(RecordingNavigator::new()),
        CredentialStore::at(dir.path().join("session")).unwrap(),
        Arc::new(QueryCache::new(dir.path().join("queries")).await.unwrap()),
    )
    .await
    .unwrap();

    let app = server::router(AppState {
        context: Arc::new(context),
    });
    (app, dir)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = mock_app().await;

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}

#[tokio::test]
async fn test_spotify_callback_connects_and_refreshes_home() {
    let (app, _dir) = mock_app().await;

    let (status, body) = get(&app, "/auth/spotify/callback?code=mock-code&state=mock-state").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Successfully connected to Spotify!"));
    assert!(body.contains(r#"content="1.5;url=/""#));

    let (_, summary) = get(&app, "/session").await;
    let summary: SessionSummary = serde_json::from_str(&summary).unwrap();
    assert!(summary.authenticated);
    assert_eq!(summary.connected, vec!["spotify".to_string()]);
}

#[tokio::test]
async fn test_error_callback_offers_way_back() {
    let (app, _dir) = mock_app().await;

    let (status, body) = get(&app, "/auth/error?error=access_denied").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("You denied access. Please try again if you want to connect."));
    assert!(body.contains("Return to App"));
    assert!(!body.contains("http-equiv"));
}

#[tokio::test]
async fn test_connect_redirects_to_authorization_url() {
    let (app, _dir) = mock_app().await;

    let response = app
        .oneshot(Request::get("/connect/soundcloud").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://127.0.0.1:5173/auth/soundcloud?code=mock-code&state=mock-state"
    );
}

#[tokio::test]
async fn test_connect_unknown_provider_is_rejected() {
    let (app, _dir) = mock_app().await;

    let (status, body) = get(&app, "/connect/tidal").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("tidal"));
}
