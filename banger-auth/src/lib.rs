// Client library (public API for the banger CLI and the callback listener)
mod client;
mod error;

pub use client::{
    backend, bootstrap, bootstrap_with, callback, follow_redirect, load_settings, navigator,
    query_cache, session, Backend, BrowserNavigator, CacheError, ClientContext, CredentialStore,
    HttpBackend, MockBackend, Navigator, QueryCache, QueryKey, Redirect, SessionState,
    SessionStore, Settings,
};
pub use error::AuthError;

pub mod testing;

// Server modules (public for binary, internal for library)
#[cfg(feature = "server")]
pub mod server;
