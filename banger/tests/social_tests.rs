use banger::loader::Source;
use banger::social::SocialStore;
use banger_api::endpoints::posts::{Comment, NewPost, PostUpdate, ReactionType};
use banger_api::endpoints::users::ProfileUpdate;
use banger_auth::testing::{http_error, test_post, RecordingNavigator, ScriptedBackend};
use banger_auth::{Backend, Navigator, QueryCache, QueryKey, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn setup(
    backend: ScriptedBackend,
) -> (SocialStore, Arc<SessionStore>, Arc<ScriptedBackend>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(backend);
    let cache = Arc::new(QueryCache::new(dir.path()).await.unwrap());
    let navigator: Arc<dyn Navigator> = Arc::new(RecordingNavigator::new());
    let session = Arc::new(SessionStore::new(
        backend.clone() as Arc<dyn Backend>,
        cache,
        navigator,
    ));
    session.refresh_profile().await;
    (SocialStore::new(session.clone()), session, backend, dir)
}

#[tokio::test]
async fn test_feed_is_cached_until_a_like() {
    let backend = ScriptedBackend::signed_in().with_posts(vec![test_post("p1")]);
    let (social, _session, backend, _dir) = setup(backend).await;

    let (_, first) = social.feed(false).await.unwrap();
    let (posts, second) = social.feed(false).await.unwrap();
    assert_eq!(first, Source::Network);
    assert_eq!(second, Source::Cache);
    assert_eq!(posts[0].id, "p1");
    assert_eq!(backend.calls().feed, 1);

    assert!(social.toggle_like("p1").await.unwrap());
    let (_, source) = social.feed(false).await.unwrap();

    assert_eq!(source, Source::Network);
    assert_eq!(backend.calls().feed, 2);
}

#[tokio::test]
async fn test_new_post_refreshes_feed_and_profiles() {
    let backend = ScriptedBackend::signed_in().with_posts(vec![test_post("p1")]);
    let (social, _session, backend, _dir) = setup(backend).await;

    social.feed(false).await.unwrap();
    social.profile("user-2", false).await.unwrap();
    social.user_posts("user-2", false).await.unwrap();

    backend.set_posts(vec![test_post("p2"), test_post("p1")]);
    social
        .create_post(&NewPost::new("t2", "Teardrop", "Massive Attack"))
        .await
        .unwrap();

    let (feed, feed_source) = social.feed(false).await.unwrap();
    let (profile, profile_source) = social.profile("user-2", false).await.unwrap();
    let (posts, posts_source) = social.user_posts("user-2", false).await.unwrap();

    assert_eq!(feed.len(), 2);
    assert_eq!(feed_source, Source::Network);
    assert_eq!(profile_source, Source::Network);
    assert_eq!(profile.posts_count, 2);
    assert_eq!(posts_source, Source::Network);
    assert_eq!(posts.len(), 2);
    assert_eq!(backend.calls().profile, 2);
}

#[tokio::test]
async fn test_comment_leaves_other_posts_cached() {
    let backend = ScriptedBackend::signed_in().with_posts(vec![test_post("p1")]);
    let (social, _session, _backend, dir) = setup(backend).await;

    social.comments("p1", false).await.unwrap();
    social.comments("p2", false).await.unwrap();

    social.add_comment("p1", "so good").await.unwrap();

    let cache = QueryCache::new(dir.path()).await.unwrap();
    let fresh = Duration::from_secs(60);
    let p1: Option<Vec<Comment>> = cache
        .get(&QueryKey::new(["comments", "p1"]), fresh)
        .await
        .unwrap();
    let p2: Option<Vec<Comment>> = cache
        .get(&QueryKey::new(["comments", "p2"]), fresh)
        .await
        .unwrap();
    assert!(p1.is_none());
    assert!(p2.is_some());
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let backend = ScriptedBackend::signed_in()
        .with_posts(vec![test_post("p1")])
        .with_social_write_error(http_error(403, "Not your post"));
    let (social, _session, backend, _dir) = setup(backend).await;

    social.feed(false).await.unwrap();
    let err = social
        .update_post("p1", &PostUpdate::new().caption("mine now"))
        .await
        .unwrap_err();
    let (_, source) = social.feed(false).await.unwrap();

    assert!(err.to_string().contains("Not your post"));
    assert_eq!(source, Source::Cache);
    assert_eq!(backend.calls().feed, 1);
    assert_eq!(backend.calls().social_writes, 1);
}

#[tokio::test]
async fn test_profile_update_reaches_session() {
    let (social, session, backend, _dir) = setup(ScriptedBackend::signed_in()).await;

    social.profile("user-1", false).await.unwrap();
    let user = social
        .update_profile(&ProfileUpdate::new().display_name("DJ Sam"))
        .await
        .unwrap();
    let (_, source) = social.profile("user-1", false).await.unwrap();

    assert_eq!(user.display_name, "DJ Sam");
    assert_eq!(session.snapshot().user.unwrap().display_name, "DJ Sam");
    assert_eq!(source, Source::Network);
    // Session state was updated in place, not re-fetched
    assert_eq!(backend.calls().current_user, 1);
}

#[tokio::test]
async fn test_follow_and_react_invalidate_feed() {
    let backend = ScriptedBackend::signed_in().with_posts(vec![test_post("p1")]);
    let (social, _session, backend, _dir) = setup(backend).await;

    social.feed(false).await.unwrap();
    let followed = social.set_following("user-2", true).await.unwrap();
    social.feed(false).await.unwrap();
    let reaction = social
        .add_reaction("p1", ReactionType::Rocket)
        .await
        .unwrap();
    social.feed(false).await.unwrap();

    assert!(followed.is_following);
    assert_eq!(reaction.kind, ReactionType::Rocket);
    assert_eq!(backend.calls().feed, 3);
}
