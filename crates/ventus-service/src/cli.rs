//! Command-line interface of `ventusd`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::warn;
use ventus_actuator::{ActuatorConfig, PwmConfig};
use ventus_power::PowerCurve;
use ventus_telemetry::SpeedConvention;

use crate::config::{ServiceConfig, TopSpeedSourceKind};

/// Output selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActuatorKind {
    /// Log power values only
    Log,
    /// Raspberry Pi hardware PWM channel
    Pwm,
}

/// Wind feedback daemon: maps game telemetry to fan power.
#[derive(Debug, Parser)]
#[command(name = "ventusd")]
#[command(version)]
#[command(about = "Wind feedback daemon: maps game telemetry to fan power")]
#[command(long_about = "
ventusd listens for velocity telemetry from the game over UDP, maps the
vehicle speed to a fan power percentage relative to a configurable top speed,
and drives a PWM fan (or logs the power it would apply).

All options have defaults. A YAML file given with --config can set any of
them, and the flags below override the file.
")]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "VENTUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,

    /// UDP address to receive telemetry on
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Velocity to speed rule: magnitude, forward, x, y or z
    #[arg(long)]
    pub convention: Option<SpeedConvention>,

    /// Response curve: linear, two-stage or quadratic
    #[arg(long)]
    pub curve: Option<PowerCurve>,

    /// Reference wind speed (mph) for the two-stage and quadratic curves
    #[arg(long)]
    pub reference_wind: Option<f32>,

    /// Where the top speed comes from
    #[arg(long, value_enum)]
    pub top_speed_source: Option<TopSpeedSourceKind>,

    /// Initial (or fixed) top speed in mph
    #[arg(long)]
    pub top_speed: Option<u32>,

    /// Query endpoint for the polled top speed
    #[arg(long)]
    pub top_speed_url: Option<String>,

    /// Time between top speed polls (ms)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Address of the settings web page
    #[arg(long)]
    pub settings_bind: Option<SocketAddr>,

    /// Do not host the settings web page
    #[arg(long)]
    pub no_settings_server: bool,

    /// Fan output
    #[arg(long, value_enum)]
    pub actuator: Option<ActuatorKind>,

    /// PWM channel: 0 (GPIO 18) or 1 (GPIO 19)
    #[arg(long)]
    pub pwm_channel: Option<u8>,

    /// PWM frequency in Hz
    #[arg(long)]
    pub pwm_frequency: Option<u32>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Apply every flag that was given on top of `config`.
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(listen) = self.listen {
            config.telemetry.bind = listen;
        }
        if let Some(convention) = self.convention {
            config.telemetry.convention = convention;
        }
        if let Some(curve) = self.curve {
            config.power.curve = curve;
        }
        if let Some(reference) = self.reference_wind {
            config.power.curve = match config.power.curve {
                PowerCurve::Linear => {
                    warn!(
                        reference_wind_mph = reference,
                        "--reference-wind has no effect on the linear curve, ignoring it"
                    );
                    PowerCurve::Linear
                }
                PowerCurve::TwoStageReference { .. } => PowerCurve::TwoStageReference {
                    reference_wind_mph: reference,
                },
                PowerCurve::QuadraticCurve { .. } => PowerCurve::QuadraticCurve {
                    reference_wind_mph: reference,
                },
            };
        }
        if let Some(source) = self.top_speed_source {
            config.top_speed.source = source;
        }
        if let Some(top_speed) = self.top_speed {
            config.top_speed.initial = top_speed;
        }
        if let Some(url) = &self.top_speed_url {
            config.top_speed.url.clone_from(url);
        }
        if let Some(interval) = self.poll_interval_ms {
            config.top_speed.poll_interval_ms = interval;
        }
        if let Some(bind) = self.settings_bind {
            config.settings_server.bind = bind;
        }
        if self.no_settings_server {
            config.settings_server.enabled = false;
        }
        match self.actuator {
            Some(ActuatorKind::Log) => config.actuator = ActuatorConfig::Log,
            Some(ActuatorKind::Pwm) if !matches!(config.actuator, ActuatorConfig::Pwm(_)) => {
                config.actuator = ActuatorConfig::Pwm(PwmConfig::default());
            }
            _ => {}
        }
        if let ActuatorConfig::Pwm(pwm) = &mut config.actuator {
            if let Some(channel) = self.pwm_channel {
                pwm.channel = channel;
            }
            if let Some(frequency) = self.pwm_frequency {
                pwm.frequency_hz = frequency;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_no_flags_keeps_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["ventusd"])?;
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(cli.log_level(), "info");
        Ok(())
    }

    #[test]
    fn test_overrides() -> TestResult {
        let cli = Cli::try_parse_from([
            "ventusd",
            "--listen",
            "127.0.0.1:4545",
            "--convention",
            "magnitude",
            "--curve",
            "quadratic",
            "--reference-wind",
            "60",
            "--top-speed-source",
            "polled",
            "--top-speed",
            "120",
            "--top-speed-url",
            "http://10.0.0.2:5000/get_top_speed_api",
            "--no-settings-server",
            "-vv",
        ])?;
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.telemetry.bind.port(), 4545);
        assert_eq!(config.telemetry.convention, SpeedConvention::Magnitude);
        assert_eq!(config.power.curve, PowerCurve::QuadraticCurve { reference_wind_mph: 60.0 });
        assert_eq!(config.top_speed.source, TopSpeedSourceKind::Polled);
        assert_eq!(config.top_speed.initial, 120);
        assert!(config.top_speed.url.starts_with("http://10.0.0.2"));
        assert!(!config.settings_server.enabled);
        assert_eq!(cli.log_level(), "trace");
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_pwm_flags() -> TestResult {
        let cli = Cli::try_parse_from([
            "ventusd",
            "--actuator",
            "pwm",
            "--pwm-channel",
            "1",
            "--pwm-frequency",
            "25000",
        ])?;
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        let ActuatorConfig::Pwm(pwm) = &config.actuator else {
            return Err("expected pwm".into());
        };
        assert_eq!(pwm.channel, 1);
        assert_eq!(pwm.frequency_hz, 25_000);
        Ok(())
    }

    #[test]
    fn test_pwm_flag_keeps_file_settings() -> TestResult {
        let cli = Cli::try_parse_from(["ventusd", "--actuator", "pwm"])?;
        let mut config = ServiceConfig {
            actuator: ActuatorConfig::Pwm(PwmConfig {
                channel: 1,
                frequency_hz: 25_000,
            }),
            ..ServiceConfig::default()
        };
        cli.apply_overrides(&mut config);
        assert!(matches!(
            config.actuator,
            ActuatorConfig::Pwm(ref pwm) if pwm.channel == 1 && pwm.frequency_hz == 25_000
        ));
        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_reference_wind_on_linear_curve_warns() -> TestResult {
        let cli = Cli::try_parse_from(["ventusd", "--curve", "linear", "--reference-wind", "60"])?;
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.power.curve, PowerCurve::Linear);
        assert!(logs_contain("--reference-wind has no effect on the linear curve"));
        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_reference_wind_on_two_stage_curve_is_silent() -> TestResult {
        let cli = Cli::try_parse_from(["ventusd", "--reference-wind", "55"])?;
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(
            config.power.curve,
            PowerCurve::TwoStageReference { reference_wind_mph: 55.0 }
        );
        assert!(!logs_contain("has no effect"));
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_curve() {
        assert!(Cli::try_parse_from(["ventusd", "--curve", "cubic"]).is_err());
    }

    #[test]
    fn test_rejects_bad_listen_address() {
        assert!(Cli::try_parse_from(["ventusd", "--listen", "not-an-address"]).is_err());
    }
}
