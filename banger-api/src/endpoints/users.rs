use super::posts::MusicTrack;
use super::AuthUser;
use crate::macros::setter;
use crate::request::{Request, RequestData};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Common

/// Public profile page data for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub posts_count: u32,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub following_count: u32,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub spotify_connected: bool,
    #[serde(default)]
    pub apple_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub owner: String,
    /// Service the playlist lives on, as the backend names it.
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub track_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

// Requests

/// `GET /users/{id}/profile`
#[derive(Debug, Clone)]
pub struct GetProfile {
    user_id: String,
}

impl GetProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Request for GetProfile {
    type Data = ();
    type Response = UserProfile;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/users/{}/profile", self.user_id).into()
    }
}

/// Changes to the signed-in user's own profile. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.display_name.is_none() && self.bio.is_none()
    }

    pub fn username_value(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn display_name_value(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn bio_value(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    setter!(opt username: String);
    setter!(opt display_name: String);
    setter!(opt bio: String);
}

/// `PUT /users/profile`
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    update: ProfileUpdate,
}

impl UpdateProfile {
    pub fn new(update: ProfileUpdate) -> Self {
        Self { update }
    }
}

impl Request for UpdateProfile {
    type Data = ProfileUpdate;
    type Response = UpdatedProfileResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/users/profile".into()
    }

    fn data(&self) -> RequestData<&ProfileUpdate> {
        RequestData::Json(&self.update)
    }
}

/// `GET /users/search?q=`
#[derive(Debug, Clone, Serialize)]
pub struct SearchUsers {
    q: String,
}

impl SearchUsers {
    pub fn new(query: impl Into<String>) -> Self {
        Self { q: query.into() }
    }
}

impl Request for SearchUsers {
    type Data = Self;
    type Response = UserSearchResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/users/search".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

/// `POST /users/{id}/follow` to follow, `DELETE` to unfollow.
#[derive(Debug, Clone)]
pub struct Follow {
    user_id: String,
}

impl Follow {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Request for Follow {
    type Data = ();
    type Response = FollowResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/users/{}/follow", self.user_id).into()
    }
}

#[derive(Debug, Clone)]
pub struct Unfollow {
    user_id: String,
}

impl Unfollow {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Request for Unfollow {
    type Data = ();
    type Response = FollowResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/users/{}/follow", self.user_id).into()
    }
}

/// `GET /users/{id}/playlists`
#[derive(Debug, Clone)]
pub struct ListPlaylists {
    user_id: String,
}

impl ListPlaylists {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Request for ListPlaylists {
    type Data = ();
    type Response = PlaylistsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/users/{}/playlists", self.user_id).into()
    }
}

/// `GET /users/{id}/playlists/{playlist_id}/tracks`
#[derive(Debug, Clone)]
pub struct GetPlaylistTracks {
    user_id: String,
    playlist_id: String,
}

impl GetPlaylistTracks {
    pub fn new(user_id: impl Into<String>, playlist_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            playlist_id: playlist_id.into(),
        }
    }
}

impl Request for GetPlaylistTracks {
    type Data = ();
    type Response = PlaylistTracksResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/users/{}/playlists/{}/tracks", self.user_id, self.playlist_id).into()
    }
}

// Responses

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedProfileResponse {
    pub user: AuthUser,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResponse {
    #[serde(default)]
    pub users: Vec<UserSearchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub is_following: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub playlist: Playlist,
    #[serde(default)]
    pub tracks: Vec<MusicTrack>,
}
