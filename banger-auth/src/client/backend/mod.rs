mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use banger_api::endpoints::{
    integrations::MusicIntegration,
    posts::{Comment, MusicPost, NewPost, PostUpdate, Reaction, ReactionType},
    spotify::{CurrentlyPlaying, Page, SearchResponse, SearchType, Track},
    users::{FollowResponse, Playlist, PlaylistTracksResponse, ProfileUpdate, UserProfile, UserSearchResult},
    AuthUser, MusicProvider,
};
use banger_api::{ApiError, Client, Request};

use crate::client::config::Settings;

/// Every backend call the client makes.
///
/// Production goes over HTTP ([`HttpBackend`]); development with mocks enabled
/// and tests swap in in-memory implementations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The signed-in user, or `None` when there is no session.
    async fn current_user(&self) -> Result<Option<AuthUser>, ApiError>;

    async fn auth_status(&self) -> Result<bool, ApiError>;

    async fn integrations(&self) -> Result<Vec<MusicIntegration>, ApiError>;

    /// Authorization URL for signing in with Google.
    async fn google_login_url(&self) -> Result<String, ApiError>;

    /// Authorization URL for signing in with Apple.
    async fn apple_login_url(&self) -> Result<String, ApiError>;

    /// Authorization URL for linking a music provider.
    async fn connect_url(&self, provider: MusicProvider) -> Result<String, ApiError>;

    async fn complete_connection(
        &self,
        provider: MusicProvider,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn disconnect(&self, provider: MusicProvider) -> Result<(), ApiError>;

    async fn sign_up(&self, email: &str, password: &str, display_name: &str)
        -> Result<(), ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    async fn currently_playing(&self) -> Result<CurrentlyPlaying, ApiError>;

    async fn top_tracks(&self, time_range: &str, limit: u32) -> Result<Page<Track>, ApiError>;

    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResponse, ApiError>;

    async fn feed(&self) -> Result<Vec<MusicPost>, ApiError>;

    /// Posts by `user_id`, or the posts they liked when `liked` is set.
    async fn user_posts(&self, user_id: &str, liked: bool) -> Result<Vec<MusicPost>, ApiError>;

    async fn create_post(&self, post: &NewPost) -> Result<(), ApiError>;

    async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<(), ApiError>;

    async fn delete_post(&self, post_id: &str) -> Result<(), ApiError>;

    /// Flips the caller's like and returns whether the post is now liked.
    async fn toggle_like(&self, post_id: &str) -> Result<bool, ApiError>;

    async fn comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError>;

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError>;

    async fn add_reaction(&self, post_id: &str, kind: ReactionType) -> Result<Reaction, ApiError>;

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError>;

    /// Saves the signed-in user's profile and returns the updated account.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError>;

    async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>, ApiError>;

    /// Follows `user_id`, or unfollows when `follow` is false.
    async fn set_following(&self, user_id: &str, follow: bool)
        -> Result<FollowResponse, ApiError>;

    async fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>, ApiError>;

    async fn playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> Result<PlaylistTracksResponse, ApiError>;
}

/// [`Backend`] over the Banger HTTP API.
pub struct HttpBackend {
    client: Client,
    spotify: Client,
}

impl HttpBackend {
    pub fn new(client: Client) -> Self {
        Self {
            spotify: client.clone(),
            client,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::new(settings.api_url.clone())?;
        let spotify = match &settings.spotify_api_url {
            Some(url) => client.with_base_url(url.clone()),
            None => client.clone(),
        };
        Ok(Self { client, spotify })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, ApiError> {
        match self.client.send(Request::auth().me()).await {
            Ok(response) => Ok(response.user),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn auth_status(&self) -> Result<bool, ApiError> {
        let response = self.client.send(Request::auth().status()).await?;
        Ok(response.authenticated)
    }

    async fn integrations(&self) -> Result<Vec<MusicIntegration>, ApiError> {
        let response = self.client.send(Request::integrations().list()).await?;
        Ok(response.integrations.into_records())
    }

    async fn google_login_url(&self) -> Result<String, ApiError> {
        let response = self.client.send(Request::auth().google()).await?;
        Ok(response.auth_url)
    }

    async fn apple_login_url(&self) -> Result<String, ApiError> {
        let response = self.client.send(Request::auth().apple()).await?;
        Ok(response.auth_url)
    }

    async fn connect_url(&self, provider: MusicProvider) -> Result<String, ApiError> {
        let response = self
            .client
            .send(Request::integrations().connect_url(provider))
            .await?;
        Ok(response.auth_url)
    }

    async fn complete_connection(
        &self,
        provider: MusicProvider,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut request = Request::integrations().complete(provider);
        if let Some(code) = code {
            request = request.code(code);
        }
        if let Some(state) = state {
            request = request.state(state);
        }
        self.client.send(request).await?;
        Ok(())
    }

    async fn disconnect(&self, provider: MusicProvider) -> Result<(), ApiError> {
        self.client
            .send(Request::integrations().disconnect(provider))
            .await?;
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), ApiError> {
        self.client
            .send(Request::auth().sign_up(email, password, display_name))
            .await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.client
            .send(Request::auth().login(email, password))
            .await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.client.send(Request::auth().logout()).await?;
        Ok(())
    }

    async fn currently_playing(&self) -> Result<CurrentlyPlaying, ApiError> {
        self.spotify
            .send(Request::spotify().currently_playing())
            .await
    }

    async fn top_tracks(&self, time_range: &str, limit: u32) -> Result<Page<Track>, ApiError> {
        let request = Request::spotify()
            .top_tracks()
            .time_range(time_range)
            .limit(limit);
        self.spotify.send(request).await
    }

    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResponse, ApiError> {
        self.spotify
            .send(Request::spotify().search(query).kind(kind))
            .await
    }

    async fn feed(&self) -> Result<Vec<MusicPost>, ApiError> {
        let response = self.client.send(Request::posts().feed()).await?;
        Ok(response.posts)
    }

    async fn user_posts(&self, user_id: &str, liked: bool) -> Result<Vec<MusicPost>, ApiError> {
        let request = if liked {
            Request::posts().liked_by(user_id)
        } else {
            Request::posts().by_user(user_id)
        };
        let response = self.client.send(request).await?;
        Ok(response.posts)
    }

    async fn create_post(&self, post: &NewPost) -> Result<(), ApiError> {
        self.client
            .send(Request::posts().create(post.clone()))
            .await?;
        Ok(())
    }

    async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<(), ApiError> {
        self.client
            .send(Request::posts().update(post_id, update.clone()))
            .await?;
        Ok(())
    }

    async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.client.send(Request::posts().delete(post_id)).await?;
        Ok(())
    }

    async fn toggle_like(&self, post_id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .send(Request::posts().toggle_like(post_id))
            .await?;
        Ok(response.liked)
    }

    async fn comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.client.send(Request::posts().comments(post_id)).await
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        self.client
            .send(Request::posts().comment(post_id, content))
            .await
    }

    async fn add_reaction(&self, post_id: &str, kind: ReactionType) -> Result<Reaction, ApiError> {
        self.client.send(Request::posts().react(post_id, kind)).await
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        self.client.send(Request::users().profile(user_id)).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        let response = self
            .client
            .send(Request::users().update_profile(update.clone()))
            .await?;
        Ok(response.user)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>, ApiError> {
        let response = self.client.send(Request::users().search(query)).await?;
        Ok(response.users)
    }

    async fn set_following(
        &self,
        user_id: &str,
        follow: bool,
    ) -> Result<FollowResponse, ApiError> {
        if follow {
            self.client.send(Request::users().follow(user_id)).await
        } else {
            self.client.send(Request::users().unfollow(user_id)).await
        }
    }

    async fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>, ApiError> {
        let response = self.client.send(Request::users().playlists(user_id)).await?;
        Ok(response.playlists)
    }

    async fn playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> Result<PlaylistTracksResponse, ApiError> {
        self.client
            .send(Request::users().playlist_tracks(user_id, playlist_id))
            .await
    }
}
