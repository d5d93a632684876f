pub mod auth;
pub mod integrations;
pub mod posts;
pub mod spotify;
pub mod users;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// How a user created their Banger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Apple,
    Email,
}

impl AuthProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
            Self::Email => "Email",
        }
    }
}

/// External music services a Banger account can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MusicProvider {
    Spotify,
    AppleMusic,
    YoutubeMusic,
    Soundcloud,
}

impl MusicProvider {
    pub const ALL: [MusicProvider; 4] = [
        MusicProvider::Spotify,
        MusicProvider::AppleMusic,
        MusicProvider::YoutubeMusic,
        MusicProvider::Soundcloud,
    ];

    /// Identifier used in URLs and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::AppleMusic => "apple-music",
            Self::YoutubeMusic => "youtube-music",
            Self::Soundcloud => "soundcloud",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::AppleMusic => "Apple Music",
            Self::YoutubeMusic => "YouTube Music",
            Self::Soundcloud => "SoundCloud",
        }
    }
}

impl Display for MusicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MusicProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MusicProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(String);

impl std::fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown music provider '{}': expected spotify, apple-music, youtube-music or soundcloud",
            self.0
        )
    }
}

impl std::error::Error for UnknownProvider {}

/// The signed-in Banger account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub auth_provider: AuthProvider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Returned by every endpoint that starts a redirect-based flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in MusicProvider::ALL {
            assert_eq!(provider.as_str().parse::<MusicProvider>(), Ok(provider));
        }
        assert!("tidal".parse::<MusicProvider>().is_err());
    }

    #[test]
    fn test_provider_serializes_kebab_case() {
        let json = serde_json::to_string(&MusicProvider::YoutubeMusic).unwrap();
        assert_eq!(json, "\"youtube-music\"");
        let json = serde_json::to_string(&MusicProvider::AppleMusic).unwrap();
        assert_eq!(json, "\"apple-music\"");
    }

    #[test]
    fn test_auth_user_deserializes_camel_case() {
        let user: AuthUser = serde_json::from_str(
            r#"{
                "id": "u1",
                "email": "dj@banger.fm",
                "displayName": "DJ",
                "authProvider": "google",
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-02T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(user.display_name, "DJ");
        assert_eq!(user.auth_provider, AuthProvider::Google);
        assert_eq!(user.username, None);
    }
}
