mod callback;

pub use callback::auth_callback;

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Json,
};
use banger_api::endpoints::MusicProvider;
use tracing::Instrument;

use crate::server::{
    error::ServerError,
    models::{HealthResponse, SessionSummary},
    pages, AppState,
};

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let session = state.context.session();
    session.refresh_profile().await;
    Html(pages::home_page(&session.snapshot()))
}

pub async fn session_summary(State(state): State<AppState>) -> Json<SessionSummary> {
    Json(SessionSummary::from(&state.context.session().snapshot()))
}

/// Send the browser to `provider`'s consent page.
pub async fn connect_provider(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ServerError> {
    let provider: MusicProvider = provider
        .parse()
        .map_err(|e: banger_api::endpoints::UnknownProvider| ServerError::BadRequest(e.to_string()))?;

    let span = tracing::info_span!("connect_provider", %provider);
    let url = state
        .context
        .session()
        .authorization_url(provider)
        .instrument(span)
        .await?;
    tracing::info!(%provider, "Redirecting to provider authorization");

    Ok(Redirect::to(&url))
}
