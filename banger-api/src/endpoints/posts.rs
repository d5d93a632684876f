use super::spotify;
use crate::macros::setter;
use crate::request::{EmptyResponse, Request, RequestData};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

// Common

/// A track as the feed and playlists show it, whichever service it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_cover: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicPost {
    pub id: String,
    pub user_id: String,
    pub track: MusicTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_currently_listening: bool,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// The seven emoji a post can be reacted to with. Sent over the wire as the emoji itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    #[serde(rename = "❤️")]
    Love,
    #[serde(rename = "🔥")]
    Fire,
    #[serde(rename = "😍")]
    HeartEyes,
    #[serde(rename = "🎵")]
    MusicalNote,
    #[serde(rename = "💯")]
    Hundred,
    #[serde(rename = "😢")]
    Sad,
    #[serde(rename = "🚀")]
    Rocket,
}

impl ReactionType {
    pub const ALL: [ReactionType; 7] = [
        ReactionType::Love,
        ReactionType::Fire,
        ReactionType::HeartEyes,
        ReactionType::MusicalNote,
        ReactionType::Hundred,
        ReactionType::Sad,
        ReactionType::Rocket,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Love => "❤️",
            Self::Fire => "🔥",
            Self::HeartEyes => "😍",
            Self::MusicalNote => "🎵",
            Self::Hundred => "💯",
            Self::Sad => "😢",
            Self::Rocket => "🚀",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Love => "Love",
            Self::Fire => "Fire",
            Self::HeartEyes => "Heart Eyes",
            Self::MusicalNote => "Musical Note",
            Self::Hundred => "Hundred",
            Self::Sad => "Sad",
            Self::Rocket => "Rocket",
        }
    }

    /// Kebab-case name for typing on a command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Fire => "fire",
            Self::HeartEyes => "heart-eyes",
            Self::MusicalNote => "musical-note",
            Self::Hundred => "hundred",
            Self::Sad => "sad",
            Self::Rocket => "rocket",
        }
    }
}

impl FromStr for ReactionType {
    type Err = UnknownReaction;

    /// Accepts either the name (`fire`) or the emoji (`🔥`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionType::ALL
            .into_iter()
            .find(|r| r.as_str() == s || r.emoji() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReaction(String);

impl std::fmt::Display for UnknownReaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown reaction '{}'", self.0)
    }
}

impl std::error::Error for UnknownReaction {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    #[serde(default)]
    pub timestamp: String,
}

/// Reactions tallied per type.
pub fn count_reactions(reactions: &[Reaction]) -> BTreeMap<ReactionType, usize> {
    let mut counts = BTreeMap::new();
    for reaction in reactions {
        *counts.entry(reaction.kind).or_insert(0) += 1;
    }
    counts
}

/// The most used reaction. Ties go to the type that was used first.
pub fn most_popular_reaction(reactions: &[Reaction]) -> Option<ReactionType> {
    let counts = count_reactions(reactions);
    let mut best: Option<(ReactionType, usize)> = None;

    for reaction in reactions {
        let count = counts[&reaction.kind];
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((reaction.kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

// Requests

/// `GET /posts/feed`
#[derive(Default, Debug, Clone)]
pub struct GetFeed;

impl Request for GetFeed {
    type Data = ();
    type Response = PostsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/posts/feed".into()
    }
}

/// Posts written by one user, or the ones they liked.
#[derive(Debug, Clone)]
pub struct GetUserPosts {
    user_id: String,
    liked: bool,
}

impl GetUserPosts {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            liked: false,
        }
    }

    pub fn liked(mut self) -> Self {
        self.liked = true;
        self
    }
}

impl Request for GetUserPosts {
    type Data = ();
    type Response = PostsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        if self.liked {
            format!("/posts/user/{}/liked", self.user_id).into()
        } else {
            format!("/posts/user/{}", self.user_id).into()
        }
    }
}

/// Share a track. Field names follow the backend's snake_case post schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewPost {
    track_id: String,
    track_name: String,
    artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    album_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    track_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    track_preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    track_external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feeling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_currently_listening: Option<bool>,
}

impl NewPost {
    pub fn new(
        track_id: impl Into<String>,
        track_name: impl Into<String>,
        artist_name: impl Into<String>,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            ..Self::default()
        }
    }

    /// Prefill from a Spotify track.
    pub fn from_track(track: &spotify::Track) -> Self {
        Self {
            album_name: Some(track.album.name.clone()),
            track_image: track.album.images.first().map(|i| i.url.clone()),
            track_preview_url: track.preview_url.clone(),
            track_external_url: track.external_urls.spotify.clone(),
            ..Self::new(&track.id, &track.name, track.artist_names())
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    pub fn artist_name(&self) -> &str {
        &self.artist_name
    }

    pub fn caption_value(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn feeling_value(&self) -> Option<&str> {
        self.feeling.as_deref()
    }

    setter!(opt caption: String);
    setter!(opt feeling: String);
    setter!(opt is_currently_listening: bool);
}

/// `POST /posts`
#[derive(Debug, Clone)]
pub struct CreatePost {
    post: NewPost,
}

impl CreatePost {
    pub fn new(post: NewPost) -> Self {
        Self { post }
    }
}

impl Request for CreatePost {
    type Data = NewPost;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/posts".into()
    }

    fn data(&self) -> RequestData<&NewPost> {
        RequestData::Json(&self.post)
    }
}

/// The editable parts of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    feeling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

impl PostUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.feeling.is_none() && self.caption.is_none()
    }

    pub fn feeling_value(&self) -> Option<&str> {
        self.feeling.as_deref()
    }

    pub fn caption_value(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    setter!(opt feeling: String);
    setter!(opt caption: String);
}

/// `PUT /posts/{id}`
#[derive(Debug, Clone)]
pub struct UpdatePost {
    post_id: String,
    update: PostUpdate,
}

impl UpdatePost {
    pub fn new(post_id: impl Into<String>, update: PostUpdate) -> Self {
        Self {
            post_id: post_id.into(),
            update,
        }
    }
}

impl Request for UpdatePost {
    type Data = PostUpdate;
    type Response = EmptyResponse;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}", self.post_id).into()
    }

    fn data(&self) -> RequestData<&PostUpdate> {
        RequestData::Json(&self.update)
    }
}

/// `DELETE /posts/{id}`
#[derive(Debug, Clone)]
pub struct DeletePost {
    post_id: String,
}

impl DeletePost {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
        }
    }
}

impl Request for DeletePost {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}", self.post_id).into()
    }
}

/// `POST /posts/{id}/like`, which flips the caller's like.
#[derive(Debug, Clone)]
pub struct ToggleLike {
    post_id: String,
}

impl ToggleLike {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
        }
    }
}

impl Request for ToggleLike {
    type Data = ();
    type Response = LikeResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}/like", self.post_id).into()
    }
}

/// `GET /posts/{id}/comments`
#[derive(Debug, Clone)]
pub struct ListComments {
    post_id: String,
}

impl ListComments {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
        }
    }
}

impl Request for ListComments {
    type Data = ();
    type Response = Vec<Comment>;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}/comments", self.post_id).into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddComment {
    #[serde(skip)]
    post_id: String,
    content: String,
}

impl AddComment {
    pub fn new(post_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            content: content.into(),
        }
    }
}

impl Request for AddComment {
    type Data = Self;
    type Response = Comment;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}/comments", self.post_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddReaction {
    #[serde(skip)]
    post_id: String,
    #[serde(rename = "type")]
    kind: ReactionType,
}

impl AddReaction {
    pub fn new(post_id: impl Into<String>, kind: ReactionType) -> Self {
        Self {
            post_id: post_id.into(),
            kind,
        }
    }
}

impl Request for AddReaction {
    type Data = Self;
    type Response = Reaction;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/posts/{}/reactions", self.post_id).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

// Responses

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<MusicPost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reaction(kind: ReactionType) -> Reaction {
        Reaction {
            id: "r".to_string(),
            user_id: "u".to_string(),
            kind,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_reaction_wire_format_is_the_emoji() {
        let parsed: Reaction =
            serde_json::from_value(json!({"id": "r1", "userId": "u1", "type": "🔥"})).unwrap();

        assert_eq!(parsed.kind, ReactionType::Fire);
        assert_eq!(
            serde_json::to_value(AddReaction::new("p1", ReactionType::HeartEyes)).unwrap(),
            json!({"type": "😍"})
        );
    }

    #[test]
    fn test_reaction_from_name_or_emoji() {
        assert_eq!("musical-note".parse(), Ok(ReactionType::MusicalNote));
        assert_eq!("💯".parse(), Ok(ReactionType::Hundred));
        assert!("thumbs-up".parse::<ReactionType>().is_err());
    }

    #[test]
    fn test_most_popular_reaction() {
        let reactions = vec![
            reaction(ReactionType::Sad),
            reaction(ReactionType::Fire),
            reaction(ReactionType::Fire),
            reaction(ReactionType::Sad),
            reaction(ReactionType::Rocket),
        ];

        let counts = count_reactions(&reactions);
        assert_eq!(counts[&ReactionType::Fire], 2);
        assert_eq!(counts[&ReactionType::Rocket], 1);
        // Sad and Fire tie; Sad came first
        assert_eq!(most_popular_reaction(&reactions), Some(ReactionType::Sad));
        assert_eq!(most_popular_reaction(&[]), None);
    }

    #[test]
    fn test_new_post_body_uses_snake_case() {
        let post = NewPost::new("t1", "Archangel", "Burial")
            .caption("late night")
            .is_currently_listening(true);

        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({
                "track_id": "t1",
                "track_name": "Archangel",
                "artist_name": "Burial",
                "caption": "late night",
                "is_currently_listening": true
            })
        );
    }

    #[test]
    fn test_user_post_endpoints() {
        assert_eq!(GetUserPosts::new("u1").endpoint(), "/posts/user/u1");
        assert_eq!(GetUserPosts::new("u1").liked().endpoint(), "/posts/user/u1/liked");
        assert_eq!(ToggleLike::new("p9").endpoint(), "/posts/p9/like");
    }

    #[test]
    fn test_feed_tolerates_sparse_posts() {
        let feed: PostsResponse = serde_json::from_value(json!({
            "posts": [{"id": "p1", "userId": "u1", "track": {"id": "t1"}}]
        }))
        .unwrap();

        let post = &feed.posts[0];
        assert!(post.reactions.is_empty());
        assert!(!post.is_currently_listening);
        assert_eq!(post.track.duration, 0);
    }
}
