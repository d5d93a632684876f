use crate::endpoints::{
    MusicProvider,
    auth::{AppleLogin, GetAuthStatus, GetCurrentUser, GoogleLogin, Login, Logout, SignUp},
    integrations::{CompleteConnection, Disconnect, GetConnectUrl, ListIntegrations},
    posts::{
        AddComment, AddReaction, CreatePost, DeletePost, GetFeed, GetUserPosts, ListComments,
        NewPost, PostUpdate, ReactionType, ToggleLike, UpdatePost,
    },
    spotify::{GetCurrentlyPlaying, GetTopTracks, SearchCatalog},
    users::{
        Follow, GetPlaylistTracks, GetProfile, ListPlaylists, ProfileUpdate, SearchUsers,
        Unfollow, UpdateProfile,
    },
};

pub struct AuthRepository;

impl AuthRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn me(&self) -> GetCurrentUser {
        GetCurrentUser
    }

    pub fn status(&self) -> GetAuthStatus {
        GetAuthStatus
    }

    pub fn google(&self) -> GoogleLogin {
        GoogleLogin
    }

    pub fn apple(&self) -> AppleLogin {
        AppleLogin
    }

    pub fn sign_up(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> SignUp {
        SignUp::new(email, password, display_name)
    }

    pub fn login(&self, email: impl Into<String>, password: impl Into<String>) -> Login {
        Login::new(email, password)
    }

    pub fn logout(&self) -> Logout {
        Logout
    }
}

pub struct IntegrationRepository;

impl IntegrationRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListIntegrations {
        ListIntegrations
    }

    pub fn connect_url(&self, provider: MusicProvider) -> GetConnectUrl {
        GetConnectUrl::new(provider)
    }

    pub fn complete(&self, provider: MusicProvider) -> CompleteConnection {
        CompleteConnection::new(provider)
    }

    pub fn disconnect(&self, provider: MusicProvider) -> Disconnect {
        Disconnect::new(provider)
    }
}

pub struct SpotifyRepository;

impl SpotifyRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn currently_playing(&self) -> GetCurrentlyPlaying {
        GetCurrentlyPlaying
    }

    pub fn top_tracks(&self) -> GetTopTracks {
        GetTopTracks::new()
    }

    pub fn search(&self, query: impl Into<String>) -> SearchCatalog {
        SearchCatalog::new(query)
    }
}

pub struct PostRepository;

impl PostRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn feed(&self) -> GetFeed {
        GetFeed
    }

    pub fn by_user(&self, user_id: impl Into<String>) -> GetUserPosts {
        GetUserPosts::new(user_id)
    }

    pub fn liked_by(&self, user_id: impl Into<String>) -> GetUserPosts {
        GetUserPosts::new(user_id).liked()
    }

    pub fn create(&self, post: NewPost) -> CreatePost {
        CreatePost::new(post)
    }

    pub fn update(&self, post_id: impl Into<String>, update: PostUpdate) -> UpdatePost {
        UpdatePost::new(post_id, update)
    }

    pub fn delete(&self, post_id: impl Into<String>) -> DeletePost {
        DeletePost::new(post_id)
    }

    pub fn toggle_like(&self, post_id: impl Into<String>) -> ToggleLike {
        ToggleLike::new(post_id)
    }

    pub fn comments(&self, post_id: impl Into<String>) -> ListComments {
        ListComments::new(post_id)
    }

    pub fn comment(&self, post_id: impl Into<String>, content: impl Into<String>) -> AddComment {
        AddComment::new(post_id, content)
    }

    pub fn react(&self, post_id: impl Into<String>, kind: ReactionType) -> AddReaction {
        AddReaction::new(post_id, kind)
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn profile(&self, user_id: impl Into<String>) -> GetProfile {
        GetProfile::new(user_id)
    }

    pub fn update_profile(&self, update: ProfileUpdate) -> UpdateProfile {
        UpdateProfile::new(update)
    }

    pub fn search(&self, query: impl Into<String>) -> SearchUsers {
        SearchUsers::new(query)
    }

    pub fn follow(&self, user_id: impl Into<String>) -> Follow {
        Follow::new(user_id)
    }

    pub fn unfollow(&self, user_id: impl Into<String>) -> Unfollow {
        Unfollow::new(user_id)
    }

    pub fn playlists(&self, user_id: impl Into<String>) -> ListPlaylists {
        ListPlaylists::new(user_id)
    }

    pub fn playlist_tracks(
        &self,
        user_id: impl Into<String>,
        playlist_id: impl Into<String>,
    ) -> GetPlaylistTracks {
        GetPlaylistTracks::new(user_id, playlist_id)
    }
}
