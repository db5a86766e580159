//! Wiring a configuration into a running controller.

use std::future::Future;

use anyhow::{Context, Result};
use tracing::info;
use ventus_settings::{
    FixedTopSpeed, PolledTopSpeed, SettingsServer, SharedTopSpeed, TopSpeedCell, TopSpeedSource,
};
use ventus_telemetry::TelemetryListener;

use crate::config::{ServiceConfig, TopSpeedSourceKind};
use crate::controller::{Controller, LoopStats};

/// Acquire every resource named by `config` and run until `shutdown` resolves.
///
/// Startup order is telemetry socket, output, settings server; a failure at
/// any step releases what was already acquired. On shutdown the output is
/// driven to zero and released, the socket closed and the server stopped.
///
/// # Errors
///
/// Fails if the configuration is invalid or a resource cannot be acquired
/// (port in use, PWM channel unavailable).
pub async fn run_service(
    config: ServiceConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<LoopStats> {
    config.validate().context("Invalid configuration")?;

    let listener = TelemetryListener::bind(config.telemetry.bind, config.telemetry.convention)
        .await
        .context("Failed to start telemetry listener")?;

    let actuator = config
        .actuator
        .open()
        .context("Failed to open fan output")?;

    let cell = TopSpeedCell::new(config.top_speed.initial, config.top_speed.bounds)
        .context("Invalid initial top speed")?;

    let server = if config.settings_server.enabled {
        let server = SettingsServer::spawn(config.settings_server.bind, cell.clone())
            .await
            .context("Failed to start settings server")?;
        Some(server)
    } else {
        None
    };

    let top_speed = build_source(&config, cell)?;
    info!(
        telemetry = %config.telemetry.bind,
        settings = ?server.as_ref().map(SettingsServer::local_addr),
        "Ventus started"
    );

    let controller = Controller::new(
        listener,
        top_speed,
        actuator,
        config.power.curve,
        config.telemetry.recv_timeout(),
    );
    let stats = controller.run(shutdown).await;

    if let Some(server) = server {
        server.shutdown().await;
    }
    Ok(stats)
}

fn build_source(config: &ServiceConfig, cell: TopSpeedCell) -> Result<Box<dyn TopSpeedSource>> {
    let source: Box<dyn TopSpeedSource> = match config.top_speed.source {
        TopSpeedSourceKind::Shared => Box::new(SharedTopSpeed::new(cell)),
        TopSpeedSourceKind::Polled => Box::new(
            PolledTopSpeed::new(config.top_speed.poll_config(), cell.get_mph())
                .context("Failed to create top speed poller")?,
        ),
        TopSpeedSourceKind::Fixed => Box::new(FixedTopSpeed(cell.get_mph())),
    };
    Ok(source)
}
