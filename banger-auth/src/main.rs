use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use banger_auth::server::{self, AppState};
use banger_auth::BrowserNavigator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    let settings = banger_auth::load_settings()?;
    tracing::info!(api_url = %settings.api_url, mocks = settings.enable_mocks, "Configuration loaded successfully");

    let addr = format!("{}:{}", settings.listen_host, settings.listen_port);
    let context = banger_auth::bootstrap(settings, Arc::new(BrowserNavigator)).await?;

    let app = server::router(AppState {
        context: Arc::new(context),
    });

    tracing::info!("Starting callback listener on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
