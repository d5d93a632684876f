//! Completing an OAuth redirect back into the app.
//!
//! A provider sends the browser to one of the `/auth/*` routes with either a
//! `code`/`state` pair or an `error`. [`dispatch`] decides what that location
//! means, [`CallbackPage::handle`] carries it out (at most one exchange call)
//! and reports a [`CallbackOutcome`] with an optional delayed redirect home.

mod messages;

pub use messages::oauth_error_message;

use banger_api::endpoints::MusicProvider;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::Instrument;
use url::Url;

use crate::client::navigator::Redirect;
use crate::client::session::SessionStore;
use messages::{AUTH_SUCCESS, FAILED_TO_COMPLETE, PROCESSING_CONNECTION, UNKNOWN_STATE};

pub const SUCCESS_ROUTE: &str = "/auth/success";
pub const ERROR_ROUTE: &str = "/auth/error";
pub const SPOTIFY_ROUTE: &str = "/auth/spotify/callback";
pub const SOUNDCLOUD_ROUTE: &str = "/auth/soundcloud";

/// Every path the callback handler answers.
pub const ROUTES: [&str; 4] = [SUCCESS_ROUTE, ERROR_ROUTE, SPOTIFY_ROUTE, SOUNDCLOUD_ROUTE];

const HOME: &str = "/";
const SUCCESS_DELAY: Duration = Duration::from_millis(1500);
const PROCESSING_DELAY: Duration = Duration::from_millis(2000);

/// How one provider's redirect is exchanged and how its failures read.
#[derive(Debug, PartialEq, Eq)]
pub struct ExchangePolicy {
    pub route: &'static str,
    pub provider: MusicProvider,
    pub connecting: &'static str,
    pub connected: &'static str,
    /// Exchange only when `state` accompanies `code`.
    pub require_state: bool,
    /// Treat a 404 (or a "not found" error) from the exchange as a completed connection.
    pub not_found_is_success: bool,
    /// Replacement text for a 401 from the exchange.
    pub unauthorized: Option<&'static str>,
    /// Shown when the route is hit without both parameters; `None` makes that an unknown state.
    pub waiting: Option<&'static str>,
}

pub const SPOTIFY_EXCHANGE: ExchangePolicy = ExchangePolicy {
    route: SPOTIFY_ROUTE,
    provider: MusicProvider::Spotify,
    connecting: "Connecting to Spotify...",
    connected: "Successfully connected to Spotify!",
    require_state: false,
    not_found_is_success: false,
    unauthorized: None,
    waiting: None,
};

// TODO: drop the not-found and waiting fallbacks once the backend answers a
// duplicate SoundCloud exchange with a distinct status.
pub const SOUNDCLOUD_EXCHANGE: ExchangePolicy = ExchangePolicy {
    route: SOUNDCLOUD_ROUTE,
    provider: MusicProvider::Soundcloud,
    connecting: "Connecting to SoundCloud...",
    connected: "Successfully connected to SoundCloud!",
    require_state: true,
    not_found_is_success: true,
    unauthorized: Some("Please log in first, then try connecting SoundCloud again."),
    waiting: Some("Processing SoundCloud connection..."),
};

const EXCHANGES: [&ExchangePolicy; 2] = [&SPOTIFY_EXCHANGE, &SOUNDCLOUD_EXCHANGE];

/// The parts of the callback URL that decide what happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackLocation {
    pub path: String,
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackLocation {
    /// Parse an absolute URL or an app-relative path such as `/auth/soundcloud?code=..`.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse("http://localhost")?.join(raw)?
            }
            Err(e) => return Err(e),
        };

        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };

        let path = match url.path().trim_end_matches('/') {
            "" => HOME.to_string(),
            path => path.to_string(),
        };

        Ok(Self {
            code: param("code"),
            state: param("state"),
            error: param("error"),
            path,
        })
    }
}

/// What a callback location calls for.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// The provider or backend reported an error.
    Fail(String),
    /// Exchange `code`/`state` with the backend.
    Exchange(&'static ExchangePolicy),
    /// Sign-in finished on the backend already.
    Confirm,
    /// Parameters are incomplete; try the exchange anyway and wait on failure.
    Settle(&'static ExchangePolicy),
    /// Nothing to exchange yet.
    Wait(&'static str),
    Unknown,
}

/// Decide what to do with a callback location. Checks run in a fixed order.
pub fn dispatch(location: &CallbackLocation) -> Step {
    if location.path == ERROR_ROUTE || location.error.is_some() {
        return Step::Fail(oauth_error_message(location.error.as_deref()));
    }

    let policy = EXCHANGES.into_iter().find(|p| p.route == location.path);

    if let Some(policy) = policy {
        let has_state = location.state.is_some() || !policy.require_state;
        if location.code.is_some() && has_state {
            return Step::Exchange(policy);
        }
    }

    if location.path == SUCCESS_ROUTE {
        return Step::Confirm;
    }

    if let Some(policy) = policy {
        if let Some(waiting) = policy.waiting {
            if location.code.is_some() || location.state.is_some() {
                return Step::Settle(policy);
            }
            return Step::Wait(waiting);
        }
    }

    Step::Unknown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Loading,
    Success,
    Error,
}

impl CallbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// What the status panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackView {
    pub status: CallbackStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success(String),
    Error(String),
    /// The connection may still complete on the backend.
    StillProcessing(String),
}

impl CallbackOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Error(m) | Self::StillProcessing(m) => m,
        }
    }

    pub fn status(&self) -> CallbackStatus {
        match self {
            Self::Success(_) => CallbackStatus::Success,
            Self::Error(_) => CallbackStatus::Error,
            Self::StillProcessing(_) => CallbackStatus::Loading,
        }
    }

    pub fn view(&self) -> CallbackView {
        CallbackView {
            status: self.status(),
            message: self.message().to_string(),
        }
    }

    /// Where to go once the message has been on screen long enough. Errors stay put.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            Self::Success(_) => Some(Redirect {
                to: HOME,
                after: SUCCESS_DELAY,
            }),
            Self::StillProcessing(_) => Some(Redirect {
                to: HOME,
                after: PROCESSING_DELAY,
            }),
            Self::Error(_) => None,
        }
    }
}

/// One mounted callback page.
///
/// `handle` does its work on the first call only; later calls return `None`
/// without touching the network.
pub struct CallbackPage {
    raw: String,
    location: Option<CallbackLocation>,
    handled: AtomicBool,
}

impl CallbackPage {
    pub fn new(raw_url: impl Into<String>) -> Self {
        let raw = raw_url.into();
        let location = match CallbackLocation::parse(&raw) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(error = %e, "Unparsable callback URL");
                None
            }
        };

        Self {
            raw,
            location,
            handled: AtomicBool::new(false),
        }
    }

    pub fn location(&self) -> Option<&CallbackLocation> {
        self.location.as_ref()
    }

    /// The panel before `handle` settles.
    pub fn view(&self) -> CallbackView {
        let message = match self.location.as_ref().map(dispatch) {
            Some(Step::Exchange(policy)) | Some(Step::Settle(policy)) => policy.connecting,
            _ => "",
        };

        CallbackView {
            status: CallbackStatus::Loading,
            message: message.to_string(),
        }
    }

    pub async fn handle(&self, session: &SessionStore) -> Option<CallbackOutcome> {
        if self.handled.swap(true, Ordering::AcqRel) {
            tracing::debug!(url = %self.raw, "Callback already handled");
            return None;
        }

        let path = self
            .location
            .as_ref()
            .map_or("<invalid>", |location| location.path.as_str());
        let span = tracing::info_span!("oauth_callback", path);

        let outcome = self.resolve(session).instrument(span).await;
        tracing::info!(status = outcome.status().as_str(), message = outcome.message(), "Callback resolved");
        Some(outcome)
    }

    async fn resolve(&self, session: &SessionStore) -> CallbackOutcome {
        let Some(location) = &self.location else {
            return CallbackOutcome::Error(FAILED_TO_COMPLETE.to_string());
        };

        match dispatch(location) {
            Step::Fail(message) => CallbackOutcome::Error(message),
            Step::Confirm => CallbackOutcome::Success(AUTH_SUCCESS.to_string()),
            Step::Exchange(policy) => exchange(session, policy, location).await,
            Step::Settle(policy) => settle(session, policy, location).await,
            Step::Wait(message) => CallbackOutcome::StillProcessing(message.to_string()),
            Step::Unknown => CallbackOutcome::Error(UNKNOWN_STATE.to_string()),
        }
    }
}

async fn exchange(
    session: &SessionStore,
    policy: &ExchangePolicy,
    location: &CallbackLocation,
) -> CallbackOutcome {
    tracing::info!(provider = %policy.provider, "Exchanging authorization code");

    let result = session
        .backend()
        .complete_connection(
            policy.provider,
            location.code.as_deref(),
            location.state.as_deref(),
        )
        .await;

    match result {
        Ok(()) => {}
        Err(e) if e.is_unauthorized() && policy.unauthorized.is_some() => {
            tracing::warn!(error = %e, provider = %policy.provider, "Exchange rejected, not signed in");
            let message = policy.unauthorized.unwrap_or_default();
            return CallbackOutcome::Error(message.to_string());
        }
        Err(e) if policy.not_found_is_success && reads_as_not_found(&e) => {
            tracing::warn!(error = %e, provider = %policy.provider, "Exchange returned not found, assuming connected");
        }
        Err(e) => {
            tracing::warn!(error = %e, provider = %policy.provider, "Exchange failed");
            return CallbackOutcome::Error(e.to_string());
        }
    }

    after_connect(session, policy.provider).await;
    CallbackOutcome::Success(policy.connected.to_string())
}

async fn settle(
    session: &SessionStore,
    policy: &ExchangePolicy,
    location: &CallbackLocation,
) -> CallbackOutcome {
    tracing::info!(provider = %policy.provider, "Exchanging with incomplete parameters");

    let result = session
        .backend()
        .complete_connection(
            policy.provider,
            location.code.as_deref(),
            location.state.as_deref(),
        )
        .await;

    match result {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::warn!(error = %e, provider = %policy.provider, "Exchange returned not found, assuming connected");
        }
        Err(e) => {
            tracing::warn!(error = %e, provider = %policy.provider, "Exchange failed, connection may still complete");
            return CallbackOutcome::StillProcessing(PROCESSING_CONNECTION.to_string());
        }
    }

    after_connect(session, policy.provider).await;
    CallbackOutcome::Success(policy.connected.to_string())
}

fn reads_as_not_found(error: &banger_api::ApiError) -> bool {
    error.is_not_found() || error.to_string().to_lowercase().contains("not found")
}

async fn after_connect(session: &SessionStore, provider: MusicProvider) {
    session.invalidate_provider_queries(provider).await;
    session.refresh_profile().await;
}
