use banger_api::endpoints::{posts::ReactionType, spotify::SearchType, MusicProvider};
use clap::{Parser, Subcommand, ValueEnum};

/// Banger command-line client.
#[derive(Parser, Debug)]
#[command(name = "banger", about = "Share what you're listening to on Banger")]
pub struct Cli {
    /// Skip cached query results.
    #[arg(long, global = true)]
    pub refresh: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the signed-in account.
    Whoami,

    /// List music integrations.
    Integrations,

    /// Sign in with Google or Apple in the browser.
    Login {
        #[arg(value_enum)]
        provider: LoginProvider,
    },

    /// Sign in with email and password.
    #[command(name = "login-email")]
    LoginEmail {
        email: String,
        #[arg(long, env = "BANGER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account with email and password.
    Signup {
        email: String,
        #[arg(long)]
        display_name: String,
        #[arg(long, env = "BANGER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    Logout,

    /// Link a music provider (spotify, apple-music, youtube-music, soundcloud).
    Connect { provider: MusicProvider },

    /// Unlink a music provider.
    Disconnect { provider: MusicProvider },

    /// Finish an OAuth redirect by pasting the URL the browser landed on.
    Callback { url: String },

    /// What's playing on Spotify right now.
    #[command(name = "now-playing")]
    NowPlaying,

    /// Your most played Spotify tracks.
    #[command(name = "top-tracks")]
    TopTracks {
        #[arg(long, value_enum, default_value = "medium-term")]
        range: TimeRange,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Search the catalog.
    Search {
        query: String,
        #[arg(long = "type", value_enum, default_value = "track")]
        kind: SearchKind,
    },

    /// Posts from you and the people you follow.
    Feed,

    /// Share what's playing on Spotify right now.
    Post {
        #[arg(long)]
        caption: Option<String>,
        #[arg(long)]
        feeling: Option<String>,
    },

    /// Change a post's caption or feeling.
    #[command(name = "edit-post")]
    EditPost {
        post_id: String,
        #[arg(long)]
        caption: Option<String>,
        #[arg(long)]
        feeling: Option<String>,
    },

    #[command(name = "delete-post")]
    DeletePost { post_id: String },

    /// Like a post, or take the like back.
    Like { post_id: String },

    Comments { post_id: String },

    Comment { post_id: String, content: String },

    /// React to a post (love, fire, heart-eyes, musical-note, hundred, sad, rocket).
    React {
        post_id: String,
        reaction: ReactionType,
    },

    /// Show a profile. Defaults to your own.
    Profile { user_id: Option<String> },

    /// Posts a user liked. Defaults to your own likes.
    Liked { user_id: Option<String> },

    #[command(name = "update-profile")]
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },

    Follow { user_id: String },

    Unfollow { user_id: String },

    /// Find other listeners by name.
    Users { query: String },

    /// A user's playlists. Defaults to your own.
    Playlists { user_id: Option<String> },

    /// Tracks in one playlist.
    Playlist { user_id: String, playlist_id: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginProvider {
    Google,
    Apple,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Track,
    Artist,
    Album,
}

impl From<SearchKind> for SearchType {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::Track => SearchType::Track,
            SearchKind::Artist => SearchType::Artist,
            SearchKind::Album => SearchType::Album,
        }
    }
}
