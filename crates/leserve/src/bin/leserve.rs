//! leserve binary entry point
//!
//! Serves the API with environment configuration and deterministic
//! summaries. `lesuivi serve` adds the config file and model backend.

use lerecit::ProjectSummarizer;
use lestockage::StorageConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = leserve::ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut storage = StorageConfig::default();
    if let Ok(path) = std::env::var("LESUIVI_DB_PATH") {
        storage.db_path = path;
    }

    tracing::info!(host = %config.host, port = config.port, db = %storage.db_path, "Starting leserve");

    let server = leserve::LeServeServer::new(config, &storage, ProjectSummarizer::deterministic())?;
    server.start().await?;

    Ok(())
}
