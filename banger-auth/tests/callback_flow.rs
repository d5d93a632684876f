use banger_api::endpoints::MusicProvider;
use banger_auth::callback::{CallbackOutcome, CallbackPage, CallbackStatus};
use banger_auth::testing::{connected, http_error, RecordingNavigator, ScriptedBackend};
use banger_auth::{follow_redirect, QueryCache, QueryKey, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(3600);

struct Harness {
    backend: Arc<ScriptedBackend>,
    navigator: Arc<RecordingNavigator>,
    cache: Arc<QueryCache>,
    session: SessionStore,
    _dir: TempDir,
}

async fn harness(backend: ScriptedBackend) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(QueryCache::new(dir.path()).await.unwrap());
    let backend = Arc::new(backend);
    let navigator = Arc::new(RecordingNavigator::new());
    let session = SessionStore::new(backend.clone(), cache.clone(), navigator.clone());

    Harness {
        backend,
        navigator,
        cache,
        session,
        _dir: dir,
    }
}

async fn run(h: &Harness, url: &str) -> CallbackOutcome {
    CallbackPage::new(url)
        .handle(&h.session)
        .await
        .expect("first handle runs")
}

#[tokio::test]
async fn test_spotify_success_refreshes_and_invalidates() {
    let h = harness(
        ScriptedBackend::signed_in().with_integrations(vec![connected(MusicProvider::Spotify)]),
    )
    .await;
    let playing = QueryKey::new(["spotify", "currently-playing"]);
    h.cache.set(&playing, &true).await.unwrap();

    let outcome = run(&h, "/auth/spotify/callback?code=abc&state=xyz").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Success("Successfully connected to Spotify!".to_string())
    );
    assert_eq!(
        h.backend.exchanges(),
        vec![(
            MusicProvider::Spotify,
            Some("abc".to_string()),
            Some("xyz".to_string())
        )]
    );
    assert_eq!(h.cache.get::<bool>(&playing, HOUR).await.unwrap(), None);
    assert_eq!(h.backend.calls().current_user, 1);
    assert!(h
        .session
        .snapshot()
        .integrations
        .get(MusicProvider::Spotify)
        .is_connected);
}

#[tokio::test(start_paused = true)]
async fn test_success_redirects_home_after_one_and_a_half_seconds() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/spotify/callback?code=abc").await;
    let redirect = outcome.redirect().expect("success redirects");

    let start = tokio::time::Instant::now();
    follow_redirect(redirect, h.navigator.as_ref()).await;

    assert_eq!(start.elapsed(), Duration::from_millis(1500));
    assert_eq!(h.navigator.navigated(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_spotify_unauthorized_is_surfaced_verbatim() {
    let h = harness(ScriptedBackend::new().with_exchange_error(http_error(401, "Not authenticated")))
        .await;

    let outcome = run(&h, "/auth/spotify/callback?code=abc&state=xyz").await;

    assert_eq!(outcome, CallbackOutcome::Error("Not authenticated".to_string()));
    assert_eq!(outcome.redirect(), None);
    assert_eq!(h.backend.calls().current_user, 0);
}

#[tokio::test]
async fn test_soundcloud_not_found_counts_as_connected() {
    let h = harness(ScriptedBackend::signed_in().with_exchange_error(http_error(404, "Not Found")))
        .await;

    let outcome = run(&h, "/auth/soundcloud?code=abc&state=xyz").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Success("Successfully connected to SoundCloud!".to_string())
    );
    assert_eq!(h.backend.calls().current_user, 1);
}

#[tokio::test]
async fn test_soundcloud_not_found_text_counts_as_connected() {
    let h = harness(
        ScriptedBackend::signed_in().with_exchange_error(http_error(500, "SoundCloud profile NOT FOUND")),
    )
    .await;

    let outcome = run(&h, "/auth/soundcloud?code=abc&state=xyz").await;

    assert_eq!(outcome.status(), CallbackStatus::Success);
}

#[tokio::test]
async fn test_soundcloud_unauthorized_asks_to_log_in() {
    let h = harness(ScriptedBackend::new().with_exchange_error(http_error(401, "Not authenticated")))
        .await;

    let outcome = run(&h, "/auth/soundcloud?code=abc&state=xyz").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error(
            "Please log in first, then try connecting SoundCloud again.".to_string()
        )
    );
}

#[tokio::test]
async fn test_soundcloud_other_failure_is_surfaced() {
    let h = harness(
        ScriptedBackend::signed_in().with_exchange_error(http_error(502, "Token exchange failed")),
    )
    .await;

    let outcome = run(&h, "/auth/soundcloud?code=abc&state=xyz").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error("Token exchange failed".to_string())
    );
}

#[tokio::test]
async fn test_access_denied_message() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/error?error=access_denied").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error(
            "You denied access. Please try again if you want to connect.".to_string()
        )
    );
    assert_eq!(h.backend.calls().exchange, 0);
}

#[tokio::test]
async fn test_error_param_beats_code() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/spotify/callback?code=abc&error=invalid_scope").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error("Invalid permissions requested.".to_string())
    );
    assert_eq!(h.backend.calls().exchange, 0);
}

#[tokio::test]
async fn test_second_handle_on_same_page_does_nothing() {
    let h = harness(ScriptedBackend::signed_in()).await;
    let page = CallbackPage::new("/auth/spotify/callback?code=abc&state=xyz");

    let first = page.handle(&h.session).await;
    let second = page.handle(&h.session).await;

    assert!(first.is_some());
    assert_eq!(second, None);
    assert_eq!(h.backend.calls().exchange, 1);
}

#[tokio::test]
async fn test_plain_success_route_has_no_side_effects() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/success").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Success("Authentication success".to_string())
    );
    assert_eq!(h.backend.calls().exchange, 0);
    assert_eq!(h.backend.calls().current_user, 0);
}

#[tokio::test(start_paused = true)]
async fn test_soundcloud_partial_params_keep_processing() {
    let h = harness(ScriptedBackend::signed_in().with_exchange_error(http_error(500, "boom"))).await;

    let outcome = run(&h, "/auth/soundcloud?code=abc").await;

    assert_eq!(
        outcome,
        CallbackOutcome::StillProcessing("Processing connection...".to_string())
    );
    assert_eq!(outcome.status(), CallbackStatus::Loading);
    assert_eq!(
        h.backend.exchanges(),
        vec![(MusicProvider::Soundcloud, Some("abc".to_string()), None)]
    );

    let start = tokio::time::Instant::now();
    follow_redirect(outcome.redirect().unwrap(), h.navigator.as_ref()).await;
    assert_eq!(start.elapsed(), Duration::from_millis(2000));
}

#[tokio::test]
async fn test_soundcloud_partial_params_not_found_succeeds() {
    let h = harness(ScriptedBackend::signed_in().with_exchange_error(http_error(404, "Not Found")))
        .await;

    let outcome = run(&h, "/auth/soundcloud?state=xyz").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Success("Successfully connected to SoundCloud!".to_string())
    );
}

#[tokio::test]
async fn test_soundcloud_without_params_waits() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/soundcloud").await;

    assert_eq!(
        outcome,
        CallbackOutcome::StillProcessing("Processing SoundCloud connection...".to_string())
    );
    assert_eq!(h.backend.calls().exchange, 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "/auth/spotify/callback").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error("Unknown callback state".to_string())
    );
}

#[tokio::test]
async fn test_unparsable_url() {
    let h = harness(ScriptedBackend::signed_in()).await;

    let outcome = run(&h, "http://[::1/auth/success").await;

    assert_eq!(
        outcome,
        CallbackOutcome::Error("Failed to complete authentication".to_string())
    );
}
