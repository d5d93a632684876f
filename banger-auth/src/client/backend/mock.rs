use async_trait::async_trait;
use banger_api::endpoints::{
    integrations::{IntegrationMap, MusicIntegration},
    posts::{Comment, MusicPost, MusicTrack, NewPost, PostUpdate, Reaction, ReactionType},
    spotify::{
        Album, ArtistRef, CurrentlyPlaying, ExternalUrls, Page, SearchResponse, SearchResults,
        SearchType, Track,
    },
    users::{
        FollowResponse, Playlist, PlaylistTracksResponse, ProfileUpdate, UserProfile,
        UserSearchResult,
    },
    AuthProvider, AuthUser, MusicProvider,
};
use banger_api::{ApiError, HttpError};
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use super::Backend;

/// In-memory backend for working on the client without a running API.
///
/// Connect and login URLs point straight back at the callback listener with a
/// fake `code`/`state`, so the whole flow can be clicked through locally.
/// Apple Music and YouTube Music have no client-side exchange: their connection
/// is recorded when the authorization URL is handed out, and the URL lands on
/// `/auth/success`, which confirms and sends the browser home to reload it.
///
/// The social side starts with one other listener and a couple of their posts.
pub struct MockBackend {
    app_url: String,
    state: Mutex<MockState>,
}

struct MockState {
    signed_in: bool,
    integrations: IntegrationMap,
    user: AuthUser,
    bio: Option<String>,
    posts: Vec<MusicPost>,
    liked: BTreeSet<String>,
    following: BTreeSet<String>,
    next_id: u32,
}

const FRIEND_ID: &str = "mock-friend";
const PLAYLIST_ID: &str = "mock-playlist";

impl MockState {
    fn require_session(&self) -> Result<(), ApiError> {
        if self.signed_in {
            Ok(())
        } else {
            Err(MockBackend::unauthorized())
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn post_mut(&mut self, post_id: &str) -> Result<&mut MusicPost, ApiError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| MockBackend::not_found("Post not found"))
    }

    fn listeners(&self) -> [UserSearchResult; 2] {
        [
            UserSearchResult {
                id: self.user.id.clone(),
                username: self.user.username.clone(),
                email: Some(self.user.email.clone()),
                display_name: Some(self.user.display_name.clone()),
                avatar: self.user.avatar.clone(),
                bio: self.bio.clone(),
            },
            UserSearchResult {
                id: FRIEND_ID.to_string(),
                username: Some("nightowl".to_string()),
                email: None,
                display_name: Some("Night Owl".to_string()),
                avatar: None,
                bio: Some("Up late, headphones on".to_string()),
            },
        ]
    }

    fn connect(&mut self, provider: MusicProvider) {
        let integration = self.integrations.get_mut(provider);
        integration.is_connected = true;
        integration.has_valid_token = true;
        integration.display_name = Some("Demo Listener".to_string());
        integration.connected_at = Some(Utc::now());
    }
}

impl MockBackend {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into().trim_end_matches('/').to_string(),
            state: Mutex::new(MockState {
                signed_in: true,
                integrations: IntegrationMap::new(),
                user: Self::demo_user(),
                bio: None,
                posts: vec![
                    Self::demo_post("mock-post-2", "Teardrop", "Massive Attack", Some("still gets me")),
                    Self::demo_post("mock-post-1", "Archangel", "Burial", None),
                ],
                liked: BTreeSet::new(),
                following: BTreeSet::new(),
                next_id: 2,
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn demo_user() -> AuthUser {
        let joined = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        AuthUser {
            id: "mock-user".to_string(),
            email: "demo@banger.local".to_string(),
            username: Some("demo".to_string()),
            display_name: "Demo Listener".to_string(),
            avatar: None,
            auth_provider: AuthProvider::Email,
            created_at: joined,
            updated_at: joined,
        }
    }

    fn demo_track(id: &str, name: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            artists: vec![ArtistRef {
                id: format!("{}-artist", id),
                name: artist.to_string(),
            }],
            album: Album {
                id: format!("{}-album", id),
                name: name.to_string(),
                images: Vec::new(),
                release_date: None,
            },
            duration_ms: 215_000,
            external_urls: ExternalUrls::default(),
            preview_url: None,
            popularity: Some(50),
            explicit: Some(false),
            provider: Some("spotify".to_string()),
        }
    }

    fn demo_post(id: &str, title: &str, artist: &str, caption: Option<&str>) -> MusicPost {
        MusicPost {
            id: id.to_string(),
            user_id: FRIEND_ID.to_string(),
            track: MusicTrack {
                id: format!("{}-track", id),
                title: title.to_string(),
                artist: artist.to_string(),
                album: title.to_string(),
                duration: 215,
                platform: Some("spotify".to_string()),
                ..MusicTrack::default()
            },
            feeling: None,
            caption: caption.map(str::to_string),
            is_currently_listening: false,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            reactions: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn demo_playlist(user_id: &str) -> Playlist {
        Playlist {
            id: PLAYLIST_ID.to_string(),
            name: "Night Bus".to_string(),
            description: None,
            image: None,
            owner: user_id.to_string(),
            provider: "spotify".to_string(),
            track_count: 2,
            external_url: None,
        }
    }

    fn not_found(error: &str) -> ApiError {
        HttpError {
            status: StatusCode::NOT_FOUND,
            error: error.to_string(),
            message: None,
            code: None,
        }
        .into()
    }

    fn unauthorized() -> ApiError {
        HttpError {
            status: StatusCode::UNAUTHORIZED,
            error: "Not authenticated".to_string(),
            message: None,
            code: None,
        }
        .into()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, ApiError> {
        Ok(self.with_state(|s| s.signed_in.then(|| s.user.clone())))
    }

    async fn auth_status(&self) -> Result<bool, ApiError> {
        Ok(self.with_state(|s| s.signed_in))
    }

    async fn integrations(&self) -> Result<Vec<MusicIntegration>, ApiError> {
        Ok(self.with_state(|s| s.integrations.iter().cloned().collect()))
    }

    async fn google_login_url(&self) -> Result<String, ApiError> {
        Ok(format!("{}/auth/success", self.app_url))
    }

    async fn apple_login_url(&self) -> Result<String, ApiError> {
        Ok(format!("{}/auth/success", self.app_url))
    }

    async fn connect_url(&self, provider: MusicProvider) -> Result<String, ApiError> {
        let path = match provider {
            MusicProvider::Spotify => "/auth/spotify/callback",
            MusicProvider::Soundcloud => "/auth/soundcloud",
            MusicProvider::AppleMusic | MusicProvider::YoutubeMusic => {
                self.with_state(|s| {
                    if !s.signed_in {
                        return Err(Self::unauthorized());
                    }
                    s.connect(provider);
                    Ok(())
                })?;
                return Ok(format!("{}/auth/success", self.app_url));
            }
        };
        Ok(format!(
            "{}{}?code=mock-code&state=mock-state",
            self.app_url, path
        ))
    }

    async fn complete_connection(
        &self,
        provider: MusicProvider,
        _code: Option<&str>,
        _state: Option<&str>,
    ) -> Result<(), ApiError> {
        self.with_state(|s| {
            if !s.signed_in {
                return Err(Self::unauthorized());
            }
            s.connect(provider);
            Ok(())
        })
    }

    async fn disconnect(&self, provider: MusicProvider) -> Result<(), ApiError> {
        self.with_state(|s| s.integrations.get_mut(provider).reset_connection());
        Ok(())
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _display_name: &str,
    ) -> Result<(), ApiError> {
        self.with_state(|s| s.signed_in = true);
        Ok(())
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<(), ApiError> {
        self.with_state(|s| s.signed_in = true);
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.with_state(|s| s.signed_in = false);
        Ok(())
    }

    async fn currently_playing(&self) -> Result<CurrentlyPlaying, ApiError> {
        Ok(CurrentlyPlaying {
            track: Some(Self::demo_track("mock-1", "Windowlicker", "Aphex Twin")),
            is_playing: true,
        })
    }

    async fn top_tracks(&self, _time_range: &str, limit: u32) -> Result<Page<Track>, ApiError> {
        let items: Vec<Track> = [
            ("mock-1", "Windowlicker", "Aphex Twin"),
            ("mock-2", "Archangel", "Burial"),
            ("mock-3", "Teardrop", "Massive Attack"),
        ]
        .into_iter()
        .take(limit as usize)
        .map(|(id, name, artist)| Self::demo_track(id, name, artist))
        .collect();

        Ok(Page {
            total: items.len() as u32,
            limit,
            offset: 0,
            items,
        })
    }

    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResponse, ApiError> {
        let tracks = (kind == SearchType::Track).then(|| Page {
            items: vec![Self::demo_track("mock-search", query, "Various Artists")],
            total: 1,
            limit: 10,
            offset: 0,
        });

        Ok(SearchResponse {
            results: SearchResults {
                tracks,
                artists: None,
            },
            query: query.to_string(),
            kind: Some(kind.as_str().to_string()),
        })
    }

    async fn feed(&self) -> Result<Vec<MusicPost>, ApiError> {
        Ok(self.with_state(|s| s.posts.clone()))
    }

    async fn user_posts(&self, user_id: &str, liked: bool) -> Result<Vec<MusicPost>, ApiError> {
        Ok(self.with_state(|s| {
            s.posts
                .iter()
                .filter(|p| {
                    if liked {
                        user_id == s.user.id && s.liked.contains(&p.id)
                    } else {
                        p.user_id == user_id
                    }
                })
                .cloned()
                .collect()
        }))
    }

    async fn create_post(&self, post: &NewPost) -> Result<(), ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            let id = s.next_id("mock-post");
            let created = MusicPost {
                id,
                user_id: s.user.id.clone(),
                track: MusicTrack {
                    id: post.track_id().to_string(),
                    title: post.track_name().to_string(),
                    artist: post.artist_name().to_string(),
                    ..MusicTrack::default()
                },
                feeling: post.feeling_value().map(str::to_string),
                caption: post.caption_value().map(str::to_string),
                is_currently_listening: false,
                timestamp: Utc::now().to_rfc3339(),
                reactions: Vec::new(),
                comments: Vec::new(),
            };
            s.posts.insert(0, created);
            Ok(())
        })
    }

    async fn update_post(&self, post_id: &str, update: &PostUpdate) -> Result<(), ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            let post = s.post_mut(post_id)?;
            if let Some(feeling) = update.feeling_value() {
                post.feeling = Some(feeling.to_string());
            }
            if let Some(caption) = update.caption_value() {
                post.caption = Some(caption.to_string());
            }
            Ok(())
        })
    }

    async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            let before = s.posts.len();
            s.posts.retain(|p| p.id != post_id);
            if s.posts.len() == before {
                return Err(Self::not_found("Post not found"));
            }
            s.liked.remove(post_id);
            Ok(())
        })
    }

    async fn toggle_like(&self, post_id: &str) -> Result<bool, ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            s.post_mut(post_id)?;
            if s.liked.remove(post_id) {
                Ok(false)
            } else {
                s.liked.insert(post_id.to_string());
                Ok(true)
            }
        })
    }

    async fn comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.with_state(|s| Ok(s.post_mut(post_id)?.comments.clone()))
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            let comment = Comment {
                id: s.next_id("mock-comment"),
                user_id: s.user.id.clone(),
                username: s.user.display_name.clone(),
                avatar: s.user.avatar.clone(),
                content: content.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            };
            s.post_mut(post_id)?.comments.push(comment.clone());
            Ok(comment)
        })
    }

    async fn add_reaction(&self, post_id: &str, kind: ReactionType) -> Result<Reaction, ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            let reaction = Reaction {
                id: s.next_id("mock-reaction"),
                user_id: s.user.id.clone(),
                kind,
                timestamp: Utc::now().to_rfc3339(),
            };
            s.post_mut(post_id)?.reactions.push(reaction.clone());
            Ok(reaction)
        })
    }

    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        self.with_state(|s| {
            let listener = s
                .listeners()
                .into_iter()
                .find(|u| u.id == user_id)
                .ok_or_else(|| Self::not_found("User not found"))?;
            let is_self = user_id == s.user.id;
            let is_following = s.following.contains(user_id);

            Ok(UserProfile {
                id: listener.id,
                username: listener.username,
                display_name: listener.display_name.unwrap_or_default(),
                avatar: listener.avatar,
                bio: listener.bio,
                posts_count: s.posts.iter().filter(|p| p.user_id == user_id).count() as u32,
                followers_count: u32::from(is_following),
                following_count: if is_self { s.following.len() as u32 } else { 0 },
                is_following,
                spotify_connected: is_self
                    && s.integrations.get(MusicProvider::Spotify).is_connected,
                apple_connected: is_self
                    && s.integrations.get(MusicProvider::AppleMusic).is_connected,
            })
        })
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            if let Some(username) = update.username_value() {
                s.user.username = Some(username.to_string());
            }
            if let Some(display_name) = update.display_name_value() {
                s.user.display_name = display_name.to_string();
            }
            if let Some(bio) = update.bio_value() {
                s.bio = Some(bio.to_string());
            }
            s.user.updated_at = Utc::now();
            Ok(s.user.clone())
        })
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>, ApiError> {
        let query = query.to_lowercase();
        Ok(self.with_state(|s| {
            s.listeners()
                .into_iter()
                .filter(|u| {
                    [&u.username, &u.display_name]
                        .into_iter()
                        .flatten()
                        .any(|name| name.to_lowercase().contains(&query))
                })
                .collect()
        }))
    }

    async fn set_following(
        &self,
        user_id: &str,
        follow: bool,
    ) -> Result<FollowResponse, ApiError> {
        self.with_state(|s| {
            s.require_session()?;
            if user_id == s.user.id {
                return Err(HttpError {
                    status: StatusCode::BAD_REQUEST,
                    error: "You cannot follow yourself".to_string(),
                    message: None,
                    code: None,
                }
                .into());
            }
            if follow {
                s.following.insert(user_id.to_string());
            } else {
                s.following.remove(user_id);
            }
            Ok(FollowResponse {
                is_following: follow,
                followers_count: Some(u32::from(follow)),
            })
        })
    }

    async fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>, ApiError> {
        Ok(vec![Self::demo_playlist(user_id)])
    }

    async fn playlist_tracks(
        &self,
        user_id: &str,
        playlist_id: &str,
    ) -> Result<PlaylistTracksResponse, ApiError> {
        if playlist_id != PLAYLIST_ID {
            return Err(Self::not_found("Playlist not found"));
        }
        let tracks = self.with_state(|s| s.posts.iter().map(|p| p.track.clone()).collect());
        Ok(PlaylistTracksResponse {
            playlist: Self::demo_playlist(user_id),
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_url_loops_back_to_callback() {
        let backend = MockBackend::new("http://127.0.0.1:5173/");

        let url = backend.connect_url(MusicProvider::Spotify).await.unwrap();

        assert_eq!(
            url,
            "http://127.0.0.1:5173/auth/spotify/callback?code=mock-code&state=mock-state"
        );
    }

    #[tokio::test]
    async fn test_server_side_providers_connect_on_authorization() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        for provider in [MusicProvider::AppleMusic, MusicProvider::YoutubeMusic] {
            let url = backend.connect_url(provider).await.unwrap();
            assert_eq!(url, "http://127.0.0.1:5173/auth/success");
        }

        let map = IntegrationMap::reconcile(backend.integrations().await.unwrap());
        assert!(map.get(MusicProvider::AppleMusic).is_connected);
        assert!(map.get(MusicProvider::YoutubeMusic).is_connected);
        assert!(!map.get(MusicProvider::Spotify).is_connected);
    }

    #[tokio::test]
    async fn test_connect_then_disconnect() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        backend
            .complete_connection(MusicProvider::Soundcloud, Some("c"), Some("s"))
            .await
            .unwrap();
        let map = IntegrationMap::reconcile(backend.integrations().await.unwrap());
        assert!(map.get(MusicProvider::Soundcloud).is_connected);
        assert!(!map.get(MusicProvider::Spotify).is_connected);

        backend.disconnect(MusicProvider::Soundcloud).await.unwrap();
        let map = IntegrationMap::reconcile(backend.integrations().await.unwrap());
        assert!(!map.get(MusicProvider::Soundcloud).is_connected);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        backend.logout().await.unwrap();

        assert_eq!(backend.current_user().await.unwrap(), None);
        let err = backend
            .complete_connection(MusicProvider::Spotify, None, None)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_posting_and_liking() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        backend
            .create_post(&NewPost::new("t1", "Windowlicker", "Aphex Twin").caption("again"))
            .await
            .unwrap();
        let feed = backend.feed().await.unwrap();
        assert_eq!(feed[0].track.title, "Windowlicker");
        assert_eq!(feed[0].user_id, "mock-user");

        let id = feed[0].id.clone();
        assert!(backend.toggle_like(&id).await.unwrap());
        assert_eq!(backend.user_posts("mock-user", true).await.unwrap().len(), 1);
        assert!(!backend.toggle_like(&id).await.unwrap());
        assert!(backend.user_posts("mock-user", true).await.unwrap().is_empty());

        backend.delete_post(&id).await.unwrap();
        let err = backend.toggle_like(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_profile_update_changes_current_user() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        let user = backend
            .update_profile(&ProfileUpdate::new().display_name("DJ Demo").bio("bass"))
            .await
            .unwrap();

        assert_eq!(user.display_name, "DJ Demo");
        assert_eq!(backend.current_user().await.unwrap(), Some(user));
        let profile = backend.user_profile("mock-user").await.unwrap();
        assert_eq!(profile.bio.as_deref(), Some("bass"));
    }

    #[tokio::test]
    async fn test_follow_another_listener() {
        let backend = MockBackend::new("http://127.0.0.1:5173");

        let found = backend.search_users("owl").await.unwrap();
        assert_eq!(found.len(), 1);

        let response = backend.set_following(&found[0].id, true).await.unwrap();
        assert!(response.is_following);
        assert!(backend.user_profile(&found[0].id).await.unwrap().is_following);
        assert!(backend.set_following("mock-user", true).await.is_err());
    }
}
