use anyhow::Result;
use clap::Parser;

use banger::{cli::Cli, logging, App};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (_guard, log_path) = logging::init_logging()?;
    tracing::info!(log_path = %log_path.display(), "Starting banger");

    let result = App::run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}
