use banger_api::endpoints::posts::{Comment, MusicPost, NewPost, PostUpdate, Reaction, ReactionType};
use banger_api::endpoints::users::{
    FollowResponse, Playlist, PlaylistTracksResponse, ProfileUpdate, UserProfile, UserSearchResult,
};
use banger_api::endpoints::AuthUser;
use banger_api::ApiError;
use banger_auth::session::SessionAction;
use banger_auth::{Backend, QueryCache, QueryKey, SessionStore};
use std::sync::Arc;
use std::time::Duration;

use crate::loader::{load_cached, Source};

pub const FEED_STALE: Duration = Duration::from_secs(30);
pub const PROFILE_STALE: Duration = Duration::from_secs(30);
pub const COMMENTS_STALE: Duration = Duration::from_secs(30);
pub const USER_SEARCH_STALE: Duration = Duration::from_secs(30);
pub const PLAYLISTS_STALE: Duration = Duration::from_secs(30);
pub const PLAYLIST_TRACKS_STALE: Duration = Duration::from_secs(5 * 60);

/// Every cached list a post can show up in.
const POST_LISTS: &[&[&str]] = &[&["feed"], &["profile"], &["likedPosts"]];

/// Feed, profile and playlist queries, plus the writes that go with them.
///
/// Reads are cache-first like [`crate::loader::SpotifyLoader`]. Each write
/// drops the cached queries whose results it changes, so the next read goes
/// back to the API.
#[derive(Clone)]
pub struct SocialStore {
    session: Arc<SessionStore>,
}

impl SocialStore {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    fn backend(&self) -> &Arc<dyn Backend> {
        self.session.backend()
    }

    fn cache(&self) -> &QueryCache {
        self.session.cache()
    }

    pub async fn feed(&self, force_refresh: bool) -> Result<(Vec<MusicPost>, Source), ApiError> {
        load_cached(self.cache(), QueryKey::new(["feed"]), FEED_STALE, force_refresh, || {
            self.backend().feed()
        })
        .await
    }

    pub async fn user_posts(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> Result<(Vec<MusicPost>, Source), ApiError> {
        let key = QueryKey::new(["profile", user_id, "posts"]);
        load_cached(self.cache(), key, PROFILE_STALE, force_refresh, || {
            self.backend().user_posts(user_id, false)
        })
        .await
    }

    pub async fn liked_posts(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> Result<(Vec<MusicPost>, Source), ApiError> {
        let key = QueryKey::new(["likedPosts", user_id]);
        load_cached(self.cache(), key, PROFILE_STALE, force_refresh, || {
            self.backend().user_posts(user_id, true)
        })
        .await
    }

    pub async fn profile(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> Result<(UserProfile, Source), ApiError> {
        let key = QueryKey::new(["profile", user_id]);
        load_cached(self.cache(), key, PROFILE_STALE, force_refresh, || {
            self.backend().user_profile(user_id)
        })
        .await
    }

    pub async fn comments(
        &self,
        post_id: &str,
        force_refresh: bool,
    ) -> Result<(Vec<Comment>, Source), ApiError> {
        let key = QueryKey::new(["comments", post_id]);
        load_cached(self.cache(), key, COMMENTS_STALE, force_refresh, || {
            self.backend().comments(post_id)
        })
        .await
    }

    pub async fn search_users(
        &self,
        query: &str,
        force_refresh: bool,
    ) -> Result<(Vec<UserSearchResult>, Source), ApiError> {
        let key = QueryKey::new(["users", "search", query]);
        load_cached(self.cache(), key, USER_SEARCH_STALE, force_refresh, || {
            self.backend().search_users(query)
        })
        .await
    }

    pub async fn playlists(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> Result<(Vec<Playlist>, Source), ApiError> {
        let key = QueryKey::new(["playlists", user_id]);
        load_cached(self.cache(), key, PLAYLISTS_STALE, force_refresh, || {
            self.backend().playlists(user_id)
        })
        .await
    }

    pub async fn playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
        force_refresh: bool,
    ) -> Result<(PlaylistTracksResponse, Source), ApiError> {
        let key = QueryKey::new(["playlistTracks", user_id, playlist_id]);
        load_cached(self.cache(), key, PLAYLIST_TRACKS_STALE, force_refresh, || {
            self.backend().playlist_tracks(user_id, playlist_id)
        })
        .await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<(), ApiError> {
        self.backend().create_post(post).await?;
        tracing::info!(track_id = post.track_id(), "Shared track");
        self.invalidate(&[&["feed"], &["profile"]]).await;
        Ok(())
    }

    pub async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<(), ApiError> {
        self.backend().update_post(post_id, update).await?;
        self.invalidate(POST_LISTS).await;
        Ok(())
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.backend().delete_post(post_id).await?;
        tracing::info!(post_id, "Deleted post");
        self.invalidate(POST_LISTS).await;
        Ok(())
    }

    /// Returns whether the post is liked after the toggle.
    pub async fn toggle_like(&self, post_id: &str) -> Result<bool, ApiError> {
        let liked = self.backend().toggle_like(post_id).await?;
        self.invalidate(POST_LISTS).await;
        Ok(liked)
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        let comment = self.backend().add_comment(post_id, content).await?;
        self.invalidate(&[&["comments", post_id], &["feed"]]).await;
        Ok(comment)
    }

    pub async fn add_reaction(
        &self,
        post_id: &str,
        kind: ReactionType,
    ) -> Result<Reaction, ApiError> {
        let reaction = self.backend().add_reaction(post_id, kind).await?;
        self.invalidate(&[&["feed"]]).await;
        Ok(reaction)
    }

    pub async fn set_following(
        &self,
        user_id: &str,
        follow: bool,
    ) -> Result<FollowResponse, ApiError> {
        let response = self.backend().set_following(user_id, follow).await?;
        tracing::info!(user_id, following = response.is_following, "Follow changed");
        self.invalidate(&[&["profile"], &["feed"]]).await;
        Ok(response)
    }

    /// Saves the profile and puts the returned account into the session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        let user = self.backend().update_profile(update).await?;
        self.session
            .dispatch(SessionAction::UserLoaded(Some(user.clone())));
        self.invalidate(&[&["profile"], &["feed"]]).await;
        Ok(user)
    }

    async fn invalidate(&self, scopes: &[&[&str]]) {
        for scope in scopes {
            match self.cache().invalidate(scope).await {
                Ok(removed) => tracing::debug!(?scope, removed, "Invalidated cached queries"),
                Err(e) => tracing::warn!(error = %e, ?scope, "Failed to invalidate cached queries"),
            }
        }
    }
}
