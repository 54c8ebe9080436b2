//! Tablewatch Server
//!
//! Run with: cargo run --bin tablewatch -- --config config.toml
//!
//! Without `--config` the default locations are searched and environment
//! variables (`TABLEWATCH_*`, `RUST_LOG`) are applied on top.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tablewatch::api::{serve, AppState};
use tablewatch::config::Config;
use tablewatch::store::Store;

#[derive(Parser)]
#[command(name = "tablewatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collects chair occupancy from table sensors and serves the dashboard")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    tablewatch::logging::init(&config.logging);

    tracing::info!("Starting Tablewatch v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.store.path);
    tracing::info!("Auto-create sensors: {}", config.ingest.auto_create_sensors);

    let store = Arc::new(Store::open(&config.store.path)?);

    if config.ingest.seed_demo {
        store.seed_demo()?;
    }

    tracing::info!("Store ready: {}", store.stats()?);

    serve(AppState::new(Arc::clone(&store), config)).await?;

    tracing::info!("Closing store...");
    store.shutdown()?;
    tracing::info!("Tablewatch stopped");

    Ok(())
}
