//! Trend-aware PMM bot - Entry Point
//!
//! Runs the quoting strategy against the in-process paper venue.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

/// Trend-aware pure market making bot (paper trading)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Stop after this many ticks (overrides the config file)
    #[arg(long)]
    max_ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pmm_telemetry::init_logging()?;

    info!("Starting PMM Bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > PMM_CONFIG env var > default path (defaults if missing)
    let mut config = match args.config.or_else(|| std::env::var("PMM_CONFIG").ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            pmm_bot::AppConfig::from_file(&path)?
        }
        None => pmm_bot::AppConfig::load()?,
    };
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }
    info!(
        exchange = %config.exchange,
        market = %config.strategy.trading_pair,
        "Configuration loaded"
    );

    let start_ms = Utc::now().timestamp_millis().max(0) as u64;
    let app = pmm_bot::Application::new(config, start_ms)?;
    app.run().await?;

    Ok(())
}
