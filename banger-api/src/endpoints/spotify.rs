use crate::macros::setter;
use crate::request::{Request, RequestData};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
    pub soundcloud: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: Album,
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub explicit: Option<bool>,
    /// Which provider the track came from, when search spans several.
    #[serde(default)]
    pub provider: Option<String>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Track,
    Artist,
    Album,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Artist => "artist",
            Self::Album => "album",
        }
    }
}

// Requests

/// `GET /spotify/currently-playing`
#[derive(Default, Debug, Clone)]
pub struct GetCurrentlyPlaying;

impl Request for GetCurrentlyPlaying {
    type Data = ();
    type Response = CurrentlyPlaying;

    fn endpoint(&self) -> Cow<'_, str> {
        "/spotify/currently-playing".into()
    }
}

/// `GET /spotify/top-tracks`
#[derive(Debug, Clone, Serialize)]
pub struct GetTopTracks {
    time_range: String,
    limit: u32,
}

impl Default for GetTopTracks {
    fn default() -> Self {
        Self {
            time_range: "medium_term".to_string(),
            limit: 20,
        }
    }
}

impl GetTopTracks {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(time_range: String);
    setter!(limit: u32);

    pub fn time_range_value(&self) -> &str {
        &self.time_range
    }

    pub fn limit_value(&self) -> u32 {
        self.limit
    }
}

impl Request for GetTopTracks {
    type Data = Self;
    type Response = Page<Track>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/spotify/top-tracks".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

/// `GET /search` across every connected provider.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCatalog {
    q: String,
    #[serde(rename = "type")]
    kind: SearchType,
    limit: u32,
}

impl SearchCatalog {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            q: query.into(),
            kind: SearchType::default(),
            limit: 10,
        }
    }

    setter!(kind: SearchType);
    setter!(limit: u32);

    pub fn query(&self) -> &str {
        &self.q
    }

    pub fn kind_value(&self) -> SearchType {
        self.kind
    }
}

impl Request for SearchCatalog {
    type Data = Self;
    type Response = SearchResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/search".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Query(self)
    }
}

// Responses

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: SearchResults,
    #[serde(default)]
    pub query: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub tracks: Option<Page<Track>>,
    #[serde(default)]
    pub artists: Option<Page<Artist>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_query_parameters() {
        let request = SearchCatalog::new("daft punk").kind(SearchType::Artist);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"q": "daft punk", "type": "artist", "limit": 10})
        );
    }

    #[test]
    fn test_currently_playing_with_nothing_playing() {
        let playing: CurrentlyPlaying =
            serde_json::from_value(json!({"track": null, "isPlaying": false})).unwrap();

        assert_eq!(playing.track, None);
        assert!(!playing.is_playing);
    }
}
