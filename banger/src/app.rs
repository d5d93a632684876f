use anyhow::{bail, Result};
use banger_api::endpoints::posts::{most_popular_reaction, MusicPost, NewPost, PostUpdate};
use banger_api::endpoints::users::{ProfileUpdate, UserProfile};
use banger_api::endpoints::{spotify::Track, AuthProvider};
use banger_auth::callback::{CallbackPage, CallbackStatus};
use banger_auth::{follow_redirect, BrowserNavigator, ClientContext, Navigator, SessionState};
use std::sync::Arc;

use crate::cli::{Cli, Command, LoginProvider};
use crate::loader::{Source, SpotifyLoader};
use crate::social::SocialStore;

pub struct App {
    context: ClientContext,
    navigator: Arc<dyn Navigator>,
    loader: SpotifyLoader,
    social: SocialStore,
    refresh: bool,
}

impl App {
    /// Load settings, restore the saved session and run the first profile refresh.
    pub async fn start(refresh: bool) -> Result<Self> {
        let settings = banger_auth::load_settings()?;
        let navigator: Arc<dyn Navigator> = Arc::new(BrowserNavigator);
        let context = banger_auth::bootstrap(settings, navigator.clone()).await?;
        Ok(Self::with_context(context, navigator, refresh))
    }

    pub fn with_context(context: ClientContext, navigator: Arc<dyn Navigator>, refresh: bool) -> Self {
        let session = context.session();
        let loader = SpotifyLoader::new(session.backend().clone(), session.cache().clone());
        let social = SocialStore::new(session.clone());
        Self {
            context,
            navigator,
            loader,
            social,
            refresh,
        }
    }

    pub async fn run(cli: Cli) -> Result<()> {
        let app = Self::start(cli.refresh).await?;
        let result = app.execute(cli.command).await;

        if let Err(e) = app.context.save_session() {
            tracing::warn!(error = %e, "Failed to save session");
        }
        result
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        tracing::info!("Running command");
        let session = self.context.session();

        match command {
            Command::Whoami => print_user(&session.snapshot()),

            Command::Integrations => {
                session.refresh_music_integrations().await;
                print_integrations(&session.snapshot());
            }

            Command::Login { provider } => {
                let provider = match provider {
                    LoginProvider::Google => AuthProvider::Google,
                    LoginProvider::Apple => AuthProvider::Apple,
                };
                session.login_with(provider).await;
                self.check_error()?;
                println!("Finish signing in in the browser. The callback listener completes the session.");
            }

            Command::LoginEmail { email, password } => {
                session.login_with_email(&email, &password).await?;
                print_user(&session.snapshot());
            }

            Command::Signup {
                email,
                display_name,
                password,
            } => {
                session
                    .sign_up_with_email(&email, &password, &display_name)
                    .await?;
                print_user(&session.snapshot());
            }

            Command::Logout => {
                session.logout().await;
                self.check_error()?;
                println!("✓ Signed out");
            }

            Command::Connect { provider } => {
                session.connect(provider).await;
                self.check_error()?;
                println!(
                    "Authorize {} in the browser, then run `banger callback <url>` with the page you land on.",
                    provider.display_name()
                );
            }

            Command::Disconnect { provider } => {
                session.disconnect_music_service(provider).await;
                self.check_error()?;
                println!("✓ Disconnected {}", provider.display_name());
            }

            Command::Callback { url } => {
                let page = CallbackPage::new(url);
                let view = page.view();
                if !view.message.is_empty() {
                    println!("{}", view.message);
                }

                let Some(outcome) = page.handle(session).await else {
                    return Ok(());
                };

                match outcome.status() {
                    CallbackStatus::Success => println!("✓ {}", outcome.message()),
                    CallbackStatus::Loading => println!("… {}", outcome.message()),
                    CallbackStatus::Error => bail!("{}", outcome.message()),
                }

                if let Some(redirect) = outcome.redirect() {
                    follow_redirect(redirect, self.navigator.as_ref()).await;
                }
            }

            Command::NowPlaying => {
                let (playing, source) = self.loader.currently_playing(self.refresh).await?;
                log_source("currently playing", source);
                match playing.track {
                    Some(track) if playing.is_playing => println!("▶ {}", format_track(&track)),
                    Some(track) => println!("⏸ {}", format_track(&track)),
                    None => println!("Nothing playing"),
                }
            }

            Command::TopTracks { range, limit } => {
                let (page, source) = self
                    .loader
                    .top_tracks(range.as_str(), limit, self.refresh)
                    .await?;
                log_source("top tracks", source);
                for (i, track) in page.items.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, format_track(track));
                }
            }

            Command::Search { query, kind } => {
                let (response, source) = self.loader.search(&query, kind.into(), self.refresh).await?;
                log_source("search", source);
                let results = response.results;
                if let Some(tracks) = results.tracks {
                    for track in &tracks.items {
                        println!("{}", format_track(track));
                    }
                }
                if let Some(artists) = results.artists {
                    for artist in &artists.items {
                        println!("{}", artist.name);
                    }
                }
            }

            Command::Feed => {
                let (posts, source) = self.social.feed(self.refresh).await?;
                log_source("feed", source);
                print_posts(&posts);
            }

            Command::Post { caption, feeling } => {
                let playing = session.backend().currently_playing().await?;
                let Some(track) = playing.track else {
                    bail!("Nothing playing on Spotify");
                };
                let mut post =
                    NewPost::from_track(&track).is_currently_listening(playing.is_playing);
                if let Some(caption) = caption {
                    post = post.caption(caption);
                }
                if let Some(feeling) = feeling {
                    post = post.feeling(feeling);
                }
                self.social.create_post(&post).await?;
                println!("✓ Shared {}", format_track(&track));
            }

            Command::EditPost {
                post_id,
                caption,
                feeling,
            } => {
                let mut update = PostUpdate::new();
                if let Some(caption) = caption {
                    update = update.caption(caption);
                }
                if let Some(feeling) = feeling {
                    update = update.feeling(feeling);
                }
                if update.is_empty() {
                    bail!("Nothing to change: pass --caption or --feeling");
                }
                self.social.update_post(&post_id, &update).await?;
                println!("✓ Updated post");
            }

            Command::DeletePost { post_id } => {
                self.social.delete_post(&post_id).await?;
                println!("✓ Deleted post");
            }

            Command::Like { post_id } => {
                if self.social.toggle_like(&post_id).await? {
                    println!("♥ Liked");
                } else {
                    println!("♡ Unliked");
                }
            }

            Command::Comments { post_id } => {
                let (comments, source) = self.social.comments(&post_id, self.refresh).await?;
                log_source("comments", source);
                if comments.is_empty() {
                    println!("No comments yet");
                }
                for comment in &comments {
                    println!("{}: {}", comment.username, comment.content);
                }
            }

            Command::Comment { post_id, content } => {
                if content.trim().is_empty() {
                    bail!("Comment is empty");
                }
                self.social.add_comment(&post_id, content.trim()).await?;
                println!("✓ Commented");
            }

            Command::React { post_id, reaction } => {
                self.social.add_reaction(&post_id, reaction).await?;
                println!("{} {}", reaction.emoji(), reaction.display_name());
            }

            Command::Profile { user_id } => {
                let user_id = self.user_id_or_self(user_id)?;
                let (profile, source) = self.social.profile(&user_id, self.refresh).await?;
                log_source("profile", source);
                print_profile(&profile);
                let (posts, _) = self.social.user_posts(&user_id, self.refresh).await?;
                print_posts(&posts);
            }

            Command::Liked { user_id } => {
                let user_id = self.user_id_or_self(user_id)?;
                let (posts, source) = self.social.liked_posts(&user_id, self.refresh).await?;
                log_source("liked posts", source);
                print_posts(&posts);
            }

            Command::UpdateProfile {
                username,
                display_name,
                bio,
            } => {
                let mut update = ProfileUpdate::new();
                if let Some(username) = username {
                    update = update.username(username);
                }
                if let Some(display_name) = display_name {
                    update = update.display_name(display_name);
                }
                if let Some(bio) = bio {
                    update = update.bio(bio);
                }
                if update.is_empty() {
                    bail!("Nothing to change: pass --username, --display-name or --bio");
                }
                self.social.update_profile(&update).await?;
                print_user(&session.snapshot());
            }

            Command::Follow { user_id } => {
                self.social.set_following(&user_id, true).await?;
                println!("✓ Following {}", user_id);
            }

            Command::Unfollow { user_id } => {
                self.social.set_following(&user_id, false).await?;
                println!("✓ Unfollowed {}", user_id);
            }

            Command::Users { query } => {
                let (users, source) = self.social.search_users(&query, self.refresh).await?;
                log_source("user search", source);
                if users.is_empty() {
                    println!("No listeners found");
                }
                for user in &users {
                    let name = user
                        .display_name
                        .as_deref()
                        .or(user.username.as_deref())
                        .unwrap_or("Unnamed");
                    println!("{:<24} {}", name, user.id);
                }
            }

            Command::Playlists { user_id } => {
                let user_id = self.user_id_or_self(user_id)?;
                let (playlists, source) = self.social.playlists(&user_id, self.refresh).await?;
                log_source("playlists", source);
                for playlist in &playlists {
                    println!(
                        "[{}] {} ({} tracks, {})",
                        playlist.id, playlist.name, playlist.track_count, playlist.provider
                    );
                }
            }

            Command::Playlist {
                user_id,
                playlist_id,
            } => {
                let (response, source) = self
                    .social
                    .playlist_tracks(&user_id, &playlist_id, self.refresh)
                    .await?;
                log_source("playlist tracks", source);
                println!("{}", response.playlist.name);
                for (i, track) in response.tracks.iter().enumerate() {
                    println!("{:>3}. {} - {}", i + 1, track.title, track.artist);
                }
            }
        }

        Ok(())
    }

    /// `user_id`, or the signed-in user's id when none was given.
    fn user_id_or_self(&self, user_id: Option<String>) -> Result<String> {
        if let Some(user_id) = user_id {
            return Ok(user_id);
        }
        match self.context.session().snapshot().user {
            Some(user) => Ok(user.id),
            None => bail!("Not signed in"),
        }
    }

    fn check_error(&self) -> Result<()> {
        match self.context.session().snapshot().error {
            Some(error) => bail!(error),
            None => Ok(()),
        }
    }
}

fn log_source(query: &str, source: Source) {
    tracing::debug!(query, ?source, "Query served");
}

fn format_track(track: &Track) -> String {
    format!("{} - {}", track.name, track.artist_names())
}

fn print_user(state: &SessionState) {
    match &state.user {
        Some(user) => {
            println!("{} <{}>", user.display_name, user.email);
            println!("Signed in with {}", user.auth_provider.display_name());
        }
        None => match &state.error {
            Some(error) => println!("Not signed in ({})", error),
            None => println!("Not signed in"),
        },
    }
}

fn print_integrations(state: &SessionState) {
    for integration in state.integrations.iter() {
        let status = if integration.is_connected {
            match &integration.display_name {
                Some(name) => format!("connected as {}", name),
                None => "connected".to_string(),
            }
        } else {
            "not connected".to_string()
        };
        println!("{:<14} {}", integration.provider.display_name(), status);
    }
}

fn print_posts(posts: &[MusicPost]) {
    if posts.is_empty() {
        println!("No posts yet");
    }
    for post in posts {
        let listening = if post.is_currently_listening { "▶ " } else { "" };
        println!(
            "[{}] {}{} - {}",
            post.id, listening, post.track.title, post.track.artist
        );
        if let Some(caption) = &post.caption {
            println!("      \"{}\"", caption);
        }
        let mut details = Vec::new();
        if let Some(feeling) = &post.feeling {
            details.push(format!("feeling {}", feeling));
        }
        if let Some(top) = most_popular_reaction(&post.reactions) {
            details.push(format!("{} {}", top.emoji(), post.reactions.len()));
        }
        if !post.comments.is_empty() {
            details.push(format!("{} comments", post.comments.len()));
        }
        if !details.is_empty() {
            println!("      {}", details.join(" · "));
        }
    }
}

fn print_profile(profile: &UserProfile) {
    match &profile.username {
        Some(username) => println!("{} (@{})", profile.display_name, username),
        None => println!("{}", profile.display_name),
    }
    if let Some(bio) = &profile.bio {
        println!("{}", bio);
    }
    println!(
        "{} posts · {} followers · {} following{}",
        profile.posts_count,
        profile.followers_count,
        profile.following_count,
        if profile.is_following { " · you follow" } else { "" }
    );
}
