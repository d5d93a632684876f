pub mod backend;
pub mod callback;
mod config;
mod credential_store;
pub mod navigator;
pub mod query_cache;
pub mod session;

pub use backend::{Backend, HttpBackend, MockBackend};
pub use config::Settings;
pub use credential_store::CredentialStore;
pub use navigator::{follow_redirect, BrowserNavigator, Navigator, Redirect};
pub use query_cache::{CacheError, QueryCache, QueryKey};
pub use session::{SessionState, SessionStore};

use banger_api::Client;
use std::sync::Arc;

use crate::error::AuthError;

/// A ready session plus what it takes to persist it.
pub struct ClientContext {
    pub settings: Settings,
    session: Arc<SessionStore>,
    client: Option<Client>,
    credentials: CredentialStore,
}

impl ClientContext {
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Write the backend's session cookie to disk, or forget it when there is none.
    pub fn save_session(&self) -> Result<(), AuthError> {
        let Some(client) = &self.client else {
            return Ok(());
        };

        match client.cookie_header() {
            Some(header) => self.credentials.save(&header),
            None => self.credentials.clear(),
        }
    }
}

/// Load and validate settings, printing setup hints when that fails.
pub fn load_settings() -> Result<Settings, AuthError> {
    let settings = Settings::new().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("\nSettings come from config.toml (or $BANGER_CONFIG) and BANGER_* variables, e.g.:");
        eprintln!("\napi_url = \"https://localhost:3001/api\"");
        eprintln!("# enable_mocks = true  # Work without a running backend");
        AuthError::Configuration(e.to_string())
    })?;

    settings.validate().map_err(|e| {
        eprintln!("Configuration validation failed: {}", e);
        AuthError::Configuration(e)
    })?;

    Ok(settings)
}

/// Build the session for `settings`: restore the saved cookie, open the query
/// cache and run the first profile refresh.
pub async fn bootstrap(
    settings: Settings,
    navigator: Arc<dyn Navigator>,
) -> Result<ClientContext, AuthError> {
    let credentials = CredentialStore::new()?;
    let cache = Arc::new(QueryCache::open_default().await?);
    bootstrap_with(settings, navigator, credentials, cache).await
}

pub async fn bootstrap_with(
    settings: Settings,
    navigator: Arc<dyn Navigator>,
    credentials: CredentialStore,
    cache: Arc<QueryCache>,
) -> Result<ClientContext, AuthError> {
    let mut client = None;
    let backend: Arc<dyn Backend> = if settings.enable_mocks {
        tracing::info!("Request mocking enabled");
        Arc::new(MockBackend::new(settings.app_url()))
    } else {
        let backend = HttpBackend::from_settings(&settings)?;
        if let Some(header) = credentials.load()? {
            tracing::debug!("Restoring saved session cookie");
            backend.client().restore_cookies(&header);
        }
        client = Some(backend.client().clone());
        Arc::new(backend)
    };

    let session = Arc::new(SessionStore::new(backend, cache, navigator));
    session.refresh_profile().await;

    Ok(ClientContext {
        settings,
        session,
        client,
        credentials,
    })
}
