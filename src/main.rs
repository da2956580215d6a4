use tracing_subscriber::EnvFilter;

use vanguard_portal::{api, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        repo = %config.repo_slug(),
        tracker = %config.tracker_path,
        "Starting portal backend"
    );

    api::serve(config).await
}
