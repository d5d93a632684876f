use banger_api::endpoints::{MusicProvider, integrations::IntegrationMap};
use banger_api::{ApiError, Client, Request};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": "u1",
        "email": "dj@banger.fm",
        "displayName": "DJ Banger",
        "authProvider": "email",
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_enveloped_response_is_unwrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"user": user_json()}})),
        )
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let response = client.send(Request::auth().me()).await.unwrap();

    assert_eq!(response.user.unwrap().display_name, "DJ Banger");
}

#[tokio::test]
async fn test_plain_response_is_returned_as_is() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let response = client.send(Request::auth().me()).await.unwrap();

    assert_eq!(response.user.unwrap().id, "u1");
}

#[tokio::test]
async fn test_error_response_carries_status_and_body_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/integrations/soundcloud/connect"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Not Found",
            "message": "SoundCloud profile not found",
            "code": "PROFILE_MISSING"
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let err = client
        .send(
            Request::integrations()
                .complete(MusicProvider::Soundcloud)
                .code("c")
                .state("s"),
        )
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let ApiError::Http(http) = &err else {
        panic!("Expected HTTP error, got {err:?}");
    };
    assert_eq!(http.error, "Not Found");
    assert_eq!(http.code.as_deref(), Some("PROFILE_MISSING"));
    assert_eq!(err.to_string(), "SoundCloud profile not found");
}

#[tokio::test]
async fn test_error_without_json_body_uses_reason_phrase() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let err = client.send(Request::auth().me()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Unauthorized");
}

#[tokio::test]
async fn test_json_content_type_and_body_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/integrations/spotify/connect"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"code": "the-code", "state": "the-state"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    client
        .send(
            Request::integrations()
                .complete(MusicProvider::Spotify)
                .code("the-code")
                .state("the-state"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    client.send(Request::auth().logout()).await.unwrap();
}

#[tokio::test]
async fn test_integrations_are_reconciled_to_all_providers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/integrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"integrations": [
                {"provider": "spotify", "isConnected": true, "hasValidToken": true, "permissions": []}
            ]}
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let response = client.send(Request::integrations().list()).await.unwrap();
    let map = IntegrationMap::reconcile(response.integrations.into_records());

    assert_eq!(map.len(), 4);
    assert!(map.get(MusicProvider::Spotify).is_connected);
    assert!(!map.get(MusicProvider::AppleMusic).is_connected);
}

#[tokio::test]
async fn test_search_sends_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "burial"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {"tracks": {"items": [], "total": 0, "limit": 10, "offset": 0}},
            "query": "burial",
            "type": "track",
            "success": true
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    let response = client.send(Request::spotify().search("burial")).await.unwrap();

    // `success` without `data` keeps the whole body
    assert_eq!(response.query, "burial");
    assert_eq!(response.results.tracks.unwrap().items.len(), 0);
}

#[tokio::test]
async fn test_session_cookie_is_kept_and_exported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "banger_session=abc123; Path=/")
                .set_body_json(json!({"success": true})),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("cookie", "banger_session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(mock_server.uri()).unwrap();
    client
        .send(Request::auth().login("dj@banger.fm", "secret"))
        .await
        .unwrap();
    client.send(Request::auth().me()).await.unwrap();

    let header = client.cookie_header().unwrap();
    assert_eq!(header, "banger_session=abc123");

    let restored = Client::new(mock_server.uri()).unwrap();
    restored.restore_cookies(&header);
    assert_eq!(restored.cookie_header().as_deref(), Some("banger_session=abc123"));
}
