//! In-memory doubles for driving the session store and callback handler in tests.

use async_trait::async_trait;
use banger_api::endpoints::{
    integrations::MusicIntegration,
    posts::{Comment, MusicPost, MusicTrack, NewPost, PostUpdate, Reaction, ReactionType},
    spotify::{CurrentlyPlaying, Page, SearchResponse, SearchResults, SearchType, Track},
    users::{
        FollowResponse, Playlist, PlaylistTracksResponse, ProfileUpdate, UserProfile,
        UserSearchResult,
    },
    AuthProvider, AuthUser, MusicProvider,
};
use banger_api::{ApiError, HttpError};
use chrono::Utc;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

use crate::client::{Backend, Navigator};

type Scripted<T> = Mutex<Result<T, HttpError>>;

fn scripted<T: Clone>(slot: &Scripted<T>) -> Result<T, ApiError> {
    slot.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .map_err(ApiError::from)
}

fn script<T>(slot: &Scripted<T>, value: Result<T, HttpError>) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

/// An `HttpError` as the backend would send it: `{ "error": <error> }` with `status`.
pub fn http_error(status: u16, error: &str) -> HttpError {
    HttpError {
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        error: error.to_string(),
        message: None,
        code: None,
    }
}

pub fn test_user() -> AuthUser {
    AuthUser {
        id: "user-1".to_string(),
        email: "sam@example.com".to_string(),
        username: Some("sam".to_string()),
        display_name: "Sam".to_string(),
        avatar: None,
        auth_provider: AuthProvider::Google,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_post(id: &str) -> MusicPost {
    MusicPost {
        id: id.to_string(),
        user_id: "user-2".to_string(),
        track: MusicTrack {
            id: format!("{}-track", id),
            title: "Archangel".to_string(),
            artist: "Burial".to_string(),
            album: "Untrue".to_string(),
            duration: 238,
            ..MusicTrack::default()
        },
        feeling: None,
        caption: None,
        is_currently_listening: false,
        timestamp: Utc::now().to_rfc3339(),
        reactions: Vec::new(),
        comments: Vec::new(),
    }
}

pub fn connected(provider: MusicProvider) -> MusicIntegration {
    MusicIntegration {
        is_connected: true,
        has_valid_token: true,
        user_id: Some(format!("{}-user", provider)),
        display_name: Some("sam".to_string()),
        connected_at: Some(Utc::now()),
        permissions: vec!["read".to_string()],
        ..MusicIntegration::disconnected(provider)
    }
}

/// How many times each backend call was made.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub current_user: usize,
    pub integrations: usize,
    pub connect_url: usize,
    pub exchange: usize,
    pub disconnect: usize,
    pub logout: usize,
    pub spotify: usize,
    /// Feed and per-user post listings.
    pub feed: usize,
    pub profile: usize,
    /// Post, comment, reaction, follow and profile writes.
    pub social_writes: usize,
}

#[derive(Default)]
struct Counters {
    current_user: AtomicUsize,
    integrations: AtomicUsize,
    connect_url: AtomicUsize,
    exchange: AtomicUsize,
    disconnect: AtomicUsize,
    logout: AtomicUsize,
    spotify: AtomicUsize,
    feed: AtomicUsize,
    profile: AtomicUsize,
    social_writes: AtomicUsize,
}

/// Backend that answers from scripted results and counts calls.
///
/// With a gate, `current_user` waits for [`ScriptedBackend::release`] before answering,
/// which keeps a profile refresh in flight for as long as a test needs.
pub struct ScriptedBackend {
    user: Scripted<Option<AuthUser>>,
    integrations: Scripted<Vec<MusicIntegration>>,
    connect_url: Scripted<String>,
    exchange: Scripted<()>,
    disconnect: Scripted<()>,
    credentials: Scripted<()>,
    posts: Scripted<Vec<MusicPost>>,
    social_write: Scripted<()>,
    exchanges: Mutex<Vec<(MusicProvider, Option<String>, Option<String>)>>,
    gate: Option<Arc<Notify>>,
    counters: Counters,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Nobody signed in, every other call succeeds.
    pub fn new() -> Self {
        Self {
            user: Mutex::new(Ok(None)),
            integrations: Mutex::new(Ok(Vec::new())),
            connect_url: Mutex::new(Ok("https://provider.example/authorize".to_string())),
            exchange: Mutex::new(Ok(())),
            disconnect: Mutex::new(Ok(())),
            credentials: Mutex::new(Ok(())),
            posts: Mutex::new(Ok(Vec::new())),
            social_write: Mutex::new(Ok(())),
            exchanges: Mutex::new(Vec::new()),
            gate: None,
            counters: Counters::default(),
        }
    }

    pub fn signed_in() -> Self {
        Self::new().with_user(test_user())
    }

    pub fn with_user(self, user: AuthUser) -> Self {
        script(&self.user, Ok(Some(user)));
        self
    }

    pub fn with_user_error(self, error: HttpError) -> Self {
        script(&self.user, Err(error));
        self
    }

    pub fn with_integrations(self, records: Vec<MusicIntegration>) -> Self {
        script(&self.integrations, Ok(records));
        self
    }

    pub fn with_integrations_error(self, error: HttpError) -> Self {
        script(&self.integrations, Err(error));
        self
    }

    pub fn with_connect_url_error(self, error: HttpError) -> Self {
        script(&self.connect_url, Err(error));
        self
    }

    pub fn with_exchange_error(self, error: HttpError) -> Self {
        script(&self.exchange, Err(error));
        self
    }

    pub fn with_disconnect_error(self, error: HttpError) -> Self {
        script(&self.disconnect, Err(error));
        self
    }

    /// Fail sign-up, login and logout with `error`.
    pub fn with_credentials_error(self, error: HttpError) -> Self {
        script(&self.credentials, Err(error));
        self
    }

    pub fn with_posts(self, posts: Vec<MusicPost>) -> Self {
        script(&self.posts, Ok(posts));
        self
    }

    /// Fail every post, comment, reaction, follow and profile write with `error`.
    pub fn with_social_write_error(self, error: HttpError) -> Self {
        script(&self.social_write, Err(error));
        self
    }

    pub fn set_posts(&self, posts: Vec<MusicPost>) {
        script(&self.posts, Ok(posts));
    }

    fn social_write(&self) -> Result<(), ApiError> {
        self.counters.social_writes.fetch_add(1, Ordering::SeqCst);
        scripted(&self.social_write)
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one gated `current_user` call answer.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_integrations(&self, records: Vec<MusicIntegration>) {
        script(&self.integrations, Ok(records));
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            current_user: c.current_user.load(Ordering::SeqCst),
            integrations: c.integrations.load(Ordering::SeqCst),
            connect_url: c.connect_url.load(Ordering::SeqCst),
            exchange: c.exchange.load(Ordering::SeqCst),
            disconnect: c.disconnect.load(Ordering::SeqCst),
            logout: c.logout.load(Ordering::SeqCst),
            spotify: c.spotify.load(Ordering::SeqCst),
            feed: c.feed.load(Ordering::SeqCst),
            profile: c.profile.load(Ordering::SeqCst),
            social_writes: c.social_writes.load(Ordering::SeqCst),
        }
    }

    /// Every exchange call as `(provider, code, state)`.
    pub fn exchanges(&self) -> Vec<(MusicProvider, Option<String>, Option<String>)> {
        self.exchanges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, ApiError> {
        self.counters.current_user.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        scripted(&self.user)
    }

    async fn auth_status(&self) -> Result<bool, ApiError> {
        scripted(&self.user).map(|user| user.is_some())
    }

    async fn integrations(&self) -> Result<Vec<MusicIntegration>, ApiError> {
        self.counters.integrations.fetch_add(1, Ordering::SeqCst);
        scripted(&self.integrations)
    }

    async fn google_login_url(&self) -> Result<String, ApiError> {
        scripted(&self.connect_url)
    }

    async fn apple_login_url(&self) -> Result<String, ApiError> {
        scripted(&self.connect_url)
    }

    async fn connect_url(&self, _provider: MusicProvider) -> Result<String, ApiError> {
        self.counters.connect_url.fetch_add(1, Ordering::SeqCst);
        scripted(&self.connect_url)
    }

    async fn complete_connection(
        &self,
        provider: MusicProvider,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<(), ApiError> {
        self.counters.exchange.fetch_add(1, Ordering::SeqCst);
        self.exchanges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((provider, code.map(str::to_string), state.map(str::to_string)));
        scripted(&self.exchange)
    }

    async fn disconnect(&self, _provider: MusicProvider) -> Result<(), ApiError> {
        self.counters.disconnect.fetch_add(1, Ordering::SeqCst);
        scripted(&self.disconnect)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _display_name: &str,
    ) -> Result<(), ApiError> {
        scripted(&self.credentials)
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<(), ApiError> {
        scripted(&self.credentials)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.counters.logout.fetch_add(1, Ordering::SeqCst);
        scripted(&self.credentials)
    }

    async fn currently_playing(&self) -> Result<CurrentlyPlaying, ApiError> {
        self.counters.spotify.fetch_add(1, Ordering::SeqCst);
        Ok(CurrentlyPlaying {
            track: None,
            is_playing: false,
        })
    }

    async fn top_tracks(&self, _time_range: &str, limit: u32) -> Result<Page<Track>, ApiError> {
        self.counters.spotify.fetch_add(1, Ordering::SeqCst);
        Ok(Page {
            items: Vec::new(),
            total: 0,
            limit,
            offset: 0,
        })
    }

    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResponse, ApiError> {
        self.counters.spotify.fetch_add(1, Ordering::SeqCst);
        Ok(SearchResponse {
            results: SearchResults::default(),
            query: query.to_string(),
            kind: Some(kind.as_str().to_string()),
        })
    }

    async fn feed(&self) -> Result<Vec<MusicPost>, ApiError> {
        self.counters.feed.fetch_add(1, Ordering::SeqCst);
        scripted(&self.posts)
    }

    async fn user_posts(&self, user_id: &str, _liked: bool) -> Result<Vec<MusicPost>, ApiError> {
        self.counters.feed.fetch_add(1, Ordering::SeqCst);
        let posts = scripted(&self.posts)?;
        Ok(posts.into_iter().filter(|p| p.user_id == user_id).collect())
    }

    async fn create_post(&self, _post: &NewPost) -> Result<(), ApiError> {
        self.social_write()
    }

    async fn update_post(&self, _post_id: &str, _update: &PostUpdate) -> Result<(), ApiError> {
        self.social_write()
    }

    async fn delete_post(&self, _post_id: &str) -> Result<(), ApiError> {
        self.social_write()
    }

    async fn toggle_like(&self, _post_id: &str) -> Result<bool, ApiError> {
        self.social_write().map(|_| true)
    }

    async fn comments(&self, _post_id: &str) -> Result<Vec<Comment>, ApiError> {
        Ok(Vec::new())
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        self.social_write()?;
        Ok(Comment {
            id: format!("{}-comment", post_id),
            user_id: "user-1".to_string(),
            username: "sam".to_string(),
            avatar: None,
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    async fn add_reaction(&self, post_id: &str, kind: ReactionType) -> Result<Reaction, ApiError> {
        self.social_write()?;
        Ok(Reaction {
            id: format!("{}-reaction", post_id),
            user_id: "user-1".to_string(),
            kind,
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        self.counters.profile.fetch_add(1, Ordering::SeqCst);
        let posts = scripted(&self.posts)?;
        Ok(UserProfile {
            id: user_id.to_string(),
            username: None,
            display_name: user_id.to_string(),
            avatar: None,
            bio: None,
            posts_count: posts.iter().filter(|p| p.user_id == user_id).count() as u32,
            followers_count: 0,
            following_count: 0,
            is_following: false,
            spotify_connected: false,
            apple_connected: false,
        })
    }

    /// Applies the update to the scripted user, so the next `current_user` sees it.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        self.social_write()?;
        let mut user = scripted(&self.user)?.unwrap_or_else(test_user);
        if let Some(username) = update.username_value() {
            user.username = Some(username.to_string());
        }
        if let Some(display_name) = update.display_name_value() {
            user.display_name = display_name.to_string();
        }
        script(&self.user, Ok(Some(user.clone())));
        Ok(user)
    }

    async fn search_users(&self, _query: &str) -> Result<Vec<UserSearchResult>, ApiError> {
        Ok(Vec::new())
    }

    async fn set_following(
        &self,
        _user_id: &str,
        follow: bool,
    ) -> Result<FollowResponse, ApiError> {
        self.social_write()?;
        Ok(FollowResponse {
            is_following: follow,
            followers_count: None,
        })
    }

    async fn playlists(&self, _user_id: &str) -> Result<Vec<Playlist>, ApiError> {
        Ok(Vec::new())
    }

    async fn playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> Result<PlaylistTracksResponse, ApiError> {
        Ok(PlaylistTracksResponse {
            playlist: Playlist {
                id: playlist_id.to_string(),
                name: "Scripted".to_string(),
                description: None,
                image: None,
                owner: user_id.to_string(),
                provider: "spotify".to_string(),
                track_count: 0,
                external_url: None,
            },
            tracks: Vec::new(),
        })
    }
}

/// Navigator that remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    external: Mutex<Vec<String>>,
    internal: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.external
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn navigated(&self) -> Vec<String> {
        self.internal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open_external(&self, url: &str) {
        self.external
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }

    fn navigate(&self, path: &str) {
        self.internal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
