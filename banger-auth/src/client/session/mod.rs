mod state;

pub use state::{reduce, SessionAction, SessionState};

use banger_api::endpoints::{AuthProvider, MusicProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::backend::Backend;
use crate::client::navigator::Navigator;
use crate::client::query_cache::QueryCache;
use crate::error::AuthError;

/// Cached query prefixes that belong to a provider.
pub fn provider_cache_scopes(provider: MusicProvider) -> &'static [&'static str] {
    match provider {
        MusicProvider::Spotify => &["spotify", "search"],
        _ => &[],
    }
}

/// Shared session ("auth context") for one client.
///
/// Holds the signed-in user and their music integrations. Every mutation goes
/// through [`reduce`]; the async operations here only decide which actions to
/// dispatch. Clone the surrounding `Arc` to share it.
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    cache: Arc<QueryCache>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<SessionState>,
    refreshing: AtomicBool,
}

/// Releases the refresh latch and ends loading on every exit path.
struct RefreshGuard<'a>(&'a SessionStore);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.dispatch(SessionAction::RefreshFinished);
        self.0.refreshing.store(false, Ordering::Release);
    }
}

impl SessionStore {
    pub fn new(
        backend: Arc<dyn Backend>,
        cache: Arc<QueryCache>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            cache,
            navigator,
            state: RwLock::new(SessionState::new()),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dispatch(&self, action: SessionAction) {
        tracing::trace!(?action, "Session action");
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        reduce(&mut state, action);
    }

    /// Re-read the signed-in user and their integrations from the backend.
    ///
    /// Returns immediately if a refresh is already in flight.
    pub async fn refresh_profile(&self) {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Profile refresh already in flight");
            return;
        }
        let _guard = RefreshGuard(self);

        self.dispatch(SessionAction::RefreshStarted);

        match self.backend.current_user().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "Session established");
                self.dispatch(SessionAction::UserLoaded(Some(user)));
                self.load_integrations().await;
            }
            Ok(None) => {
                tracing::info!("No active session");
                self.dispatch(SessionAction::UserLoaded(None));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load current user");
                self.dispatch(SessionAction::SessionFailed(e.to_string()));
            }
        }
    }

    /// Re-fetch integration records, or reset them when nobody is signed in.
    pub async fn refresh_music_integrations(&self) {
        if !self.snapshot().is_authenticated() {
            self.dispatch(SessionAction::IntegrationsReset);
            return;
        }
        self.load_integrations().await;
    }

    async fn load_integrations(&self) {
        match self.backend.integrations().await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Loaded music integrations");
                self.dispatch(SessionAction::IntegrationsLoaded(records));
            }
            Err(e) => {
                // Integrations never block authentication
                tracing::warn!(error = %e, "Failed to load music integrations, using defaults");
                self.dispatch(SessionAction::IntegrationsReset);
            }
        }
    }

    /// Start signing in with Google or Apple by sending the browser to the provider.
    pub async fn login_with(&self, provider: AuthProvider) {
        self.dispatch(SessionAction::ClearError);

        let url = match provider {
            AuthProvider::Google => self.backend.google_login_url().await,
            AuthProvider::Apple => self.backend.apple_login_url().await,
            AuthProvider::Email => {
                self.dispatch(SessionAction::Failed(
                    "Email accounts sign in with a password".to_string(),
                ));
                return;
            }
        };

        match url {
            Ok(url) => self.navigator.open_external(&url),
            Err(e) => {
                tracing::warn!(error = %e, provider = provider.display_name(), "Failed to start login");
                self.dispatch(SessionAction::Failed(format!(
                    "{} authentication failed",
                    provider.display_name()
                )));
            }
        }
    }

    /// Where to send the browser to link `provider`.
    pub async fn authorization_url(&self, provider: MusicProvider) -> Result<String, AuthError> {
        Ok(self.backend.connect_url(provider).await?)
    }

    /// Start linking a music provider by sending the browser to its consent page.
    pub async fn connect(&self, provider: MusicProvider) {
        self.dispatch(SessionAction::ClearError);

        match self.authorization_url(provider).await {
            Ok(url) => {
                tracing::info!(%provider, "Redirecting to provider authorization");
                self.navigator.open_external(&url);
            }
            Err(e) => {
                tracing::warn!(error = %e, %provider, "Failed to start integration");
                self.dispatch(SessionAction::Failed(format!(
                    "{} integration failed",
                    provider.display_name()
                )));
            }
        }
    }

    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        self.dispatch(SessionAction::ClearError);

        if let Err(e) = self.backend.sign_up(email, password, display_name).await {
            self.dispatch(SessionAction::Failed(e.to_string()));
            return Err(e.into());
        }

        self.refresh_profile().await;
        Ok(())
    }

    pub async fn login_with_email(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.dispatch(SessionAction::ClearError);

        if let Err(e) = self.backend.login(email, password).await {
            self.dispatch(SessionAction::Failed(e.to_string()));
            return Err(e.into());
        }

        self.refresh_profile().await;
        Ok(())
    }

    pub async fn logout(&self) {
        self.dispatch(SessionAction::ClearError);

        match self.backend.logout().await {
            Ok(()) => {
                tracing::info!("Signed out");
                self.dispatch(SessionAction::SignedOut);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout failed");
                self.dispatch(SessionAction::Failed("Logout failed".to_string()));
            }
        }
    }

    /// Whether the backend considers this client signed in. Failures read as `false`.
    pub async fn check_auth_status(&self) -> bool {
        match self.backend.auth_status().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                tracing::debug!(error = %e, "Auth status check failed");
                false
            }
        }
    }

    pub async fn disconnect_music_service(&self, provider: MusicProvider) {
        self.dispatch(SessionAction::ClearError);

        if let Err(e) = self.backend.disconnect(provider).await {
            tracing::warn!(error = %e, %provider, "Failed to disconnect provider");
            self.dispatch(SessionAction::Failed(format!(
                "Failed to disconnect {}",
                provider
            )));
            return;
        }

        tracing::info!(%provider, "Disconnected provider");
        self.dispatch(SessionAction::ProviderDisconnected(provider));
        self.invalidate_provider_queries(provider).await;
    }

    /// Drop cached queries whose results depend on `provider`.
    pub async fn invalidate_provider_queries(&self, provider: MusicProvider) {
        for &scope in provider_cache_scopes(provider) {
            if let Err(e) = self.cache.invalidate(&[scope]).await {
                tracing::warn!(error = %e, scope, "Failed to invalidate cached queries");
            }
        }
    }
}
