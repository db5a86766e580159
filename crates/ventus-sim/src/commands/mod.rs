//! Command implementations for ventus-sim

pub mod dashboard;
pub mod generate;
pub mod sweep;

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ventus_actuator::{ActuatorConfig, PwmConfig};
use ventus_telemetry::DEFAULT_TELEMETRY_PORT;

/// Fan output for the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepOutput {
    /// Log duty values only
    Log,
    /// Raspberry Pi hardware PWM channel
    Pwm,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Where ventusd listens for telemetry
    #[arg(long, default_value_t = default_target())]
    pub target: SocketAddr,

    /// Time between datagrams (ms)
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,

    /// Stop after this many datagrams
    #[arg(long)]
    pub count: Option<u64>,

    /// Highest synthetic speed (mph)
    #[arg(long, default_value_t = generate::DEFAULT_MAX_SPEED_MPH)]
    pub max_speed: f32,

    /// Seed for reproducible speeds
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Output to drive
    #[arg(long, value_enum, default_value_t = SweepOutput::Log)]
    pub actuator: SweepOutput,

    /// PWM channel: 0 (GPIO 18) or 1 (GPIO 19)
    #[arg(long, default_value_t = 0)]
    pub pwm_channel: u8,

    /// PWM frequency (Hz)
    #[arg(long, default_value_t = ventus_actuator::pwm::DEFAULT_PWM_FREQUENCY_HZ)]
    pub pwm_frequency: u32,

    /// Time each duty value is held (ms)
    #[arg(long, default_value_t = 100)]
    pub step_ms: u64,

    /// Stop after this many up-and-down ramps
    #[arg(long)]
    pub cycles: Option<u32>,
}

impl SweepArgs {
    pub fn actuator_config(&self) -> ActuatorConfig {
        match self.actuator {
            SweepOutput::Log => ActuatorConfig::Log,
            SweepOutput::Pwm => ActuatorConfig::Pwm(PwmConfig {
                channel: self.pwm_channel,
                frequency_hz: self.pwm_frequency,
            }),
        }
    }
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Vehicle top speed for scaling (mph)
    #[arg(long, default_value_t = dashboard::DEFAULT_TOP_SPEED_MPH,
          value_parser = clap::value_parser!(u32).range(
              i64::from(dashboard::MIN_TOP_SPEED_MPH)..=i64::from(dashboard::MAX_TOP_SPEED_MPH)))]
    pub top_speed: u32,

    /// Hold this speed (mph) instead of the random walk
    #[arg(long)]
    pub manual: Option<f32>,

    /// Time between steps (ms)
    #[arg(long, default_value_t = 100)]
    pub step_ms: u64,

    /// Stop after this many steps
    #[arg(long)]
    pub steps: Option<u64>,

    /// Seed for a reproducible random walk
    #[arg(long)]
    pub seed: Option<u64>,
}

fn default_target() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_TELEMETRY_PORT))
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
