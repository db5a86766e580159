//! ventus-sim - bench tools for the wind feedback rig
//!
//! Exercises the pieces of a Ventus installation without the game or without
//! the fan: a synthetic telemetry generator, a PWM sweep for wiring checks,
//! and a headless rendition of the interactive wind dashboard.

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{DashboardArgs, GenerateArgs, SweepArgs};

#[derive(Debug, Parser)]
#[command(name = "ventus-sim")]
#[command(version)]
#[command(about = "Bench tools for Ventus: synthetic telemetry, fan sweep, dashboard")]
#[command(long_about = "
ventus-sim stands in for either end of the wind feedback chain.

`generate` plays the game and sends velocity datagrams to ventusd.
`sweep` plays the controller and ramps the fan output up and down.
`dashboard` runs the speed and power model on its own and prints it.

Every command runs until Ctrl+C unless told how many steps to take.
")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send synthetic velocity telemetry over UDP
    Generate(GenerateArgs),

    /// Ramp the fan output 0 -> 100 -> 0 percent
    Sweep(SweepArgs),

    /// Simulate speed and fan power and print the live status
    Dashboard(DashboardArgs),
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()))
        .with(fmt::layer().with_target(false))
        .init();

    let shutdown = ventus_service::shutdown_signal();
    match &cli.command {
        Commands::Generate(args) => commands::generate::execute(args, shutdown).await,
        Commands::Sweep(args) => commands::sweep::execute(args, shutdown).await,
        Commands::Dashboard(args) => commands::dashboard::execute(args, shutdown).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventus_actuator::{ActuatorConfig, PwmConfig};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_generate_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["ventus-sim", "generate"])?;
        let Commands::Generate(args) = cli.command else {
            return Err("expected generate".into());
        };
        assert_eq!(args.target.port(), 4444);
        assert_eq!(args.interval_ms, 100);
        assert_eq!(args.count, None);
        Ok(())
    }

    #[test]
    fn test_sweep_flags() -> TestResult {
        let cli = Cli::try_parse_from([
            "ventus-sim",
            "sweep",
            "--actuator",
            "pwm",
            "--pwm-channel",
            "1",
            "--cycles",
            "2",
        ])?;
        let Commands::Sweep(args) = cli.command else {
            return Err("expected sweep".into());
        };
        assert_eq!(args.cycles, Some(2));
        assert_eq!(args.pwm_channel, 1);
        assert_eq!(
            args.actuator_config(),
            ActuatorConfig::Pwm(PwmConfig { channel: 1, frequency_hz: 1000 })
        );
        Ok(())
    }

    #[test]
    fn test_dashboard_rejects_top_speed_out_of_bounds() {
        assert!(Cli::try_parse_from(["ventus-sim", "dashboard", "--top-speed", "5"]).is_err());
        assert!(Cli::try_parse_from(["ventus-sim", "dashboard", "--top-speed", "301"]).is_err());
        assert!(Cli::try_parse_from(["ventus-sim", "dashboard", "--top-speed", "300"]).is_ok());
    }

    #[test]
    fn test_verbosity_levels() -> TestResult {
        let cli = Cli::try_parse_from(["ventus-sim", "-vv", "dashboard"])?;
        assert_eq!(cli.log_level(), "trace");
        let cli = Cli::try_parse_from(["ventus-sim", "dashboard"])?;
        assert_eq!(cli.log_level(), "info");
        Ok(())
    }
}
