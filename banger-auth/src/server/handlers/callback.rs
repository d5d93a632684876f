use axum::{
    extract::{OriginalUri, State},
    response::Html,
};

use crate::callback::CallbackPage;
use crate::server::{pages, AppState};

/// Every `/auth/*` callback route lands here; the path and query decide the rest.
pub async fn auth_callback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Html<String> {
    let page = CallbackPage::new(uri.to_string());

    let Some(outcome) = page.handle(state.context.session()).await else {
        return Html(pages::status_page(&page.view(), None));
    };

    if let Err(e) = state.context.save_session() {
        tracing::warn!(error = %e, "Failed to persist session after callback");
    }

    Html(pages::status_page(&outcome.view(), outcome.redirect()))
}
