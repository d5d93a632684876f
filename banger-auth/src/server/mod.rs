pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;

pub use error::ServerError;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::callback::ROUTES;
use crate::client::ClientContext;

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<ClientContext>,
}

/// The callback listener: OAuth redirect targets plus a small status UI.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/session", get(handlers::session_summary))
        .route("/connect/{provider}", get(handlers::connect_provider));

    for route in ROUTES {
        router = router.route(route, get(handlers::auth_callback));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
