//! Ventus wind feedback daemon (ventusd)

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ventus_service::{Cli, ServiceConfig, run_service, shutdown_signal};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()))
        .with(fmt::layer().with_target(false))
        .init();

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load_from_path(path).await?,
        None => ServiceConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    info!("Starting ventusd v{}", env!("CARGO_PKG_VERSION"));
    let stats = run_service(config, shutdown_signal()).await?;
    info!(samples = stats.samples, "ventusd stopped");
    Ok(())
}
