//! Hardware PWM on a Raspberry Pi.
//!
//! The fan is driven from one of the Pi's PWM channels through `rppal`.
//! With the default `dtoverlay=pwm`, channel 0 is GPIO 18.

use rppal::pwm::{Channel, Polarity, Pwm};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ActuatorError;
use crate::{ActuatorSink, MAX_PERCENT, clamp_percent};

/// PWM frequency the fan is driven at unless configured otherwise.
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 1000;

/// Highest accepted PWM frequency.
pub const MAX_PWM_FREQUENCY_HZ: u32 = 1_000_000;

/// Which PWM channel to drive and at what frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmConfig {
    /// Hardware PWM channel, 0 (GPIO 18) or 1 (GPIO 19)
    pub channel: u8,
    /// PWM frequency in Hz
    pub frequency_hz: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
        }
    }
}

impl PwmConfig {
    /// Check the channel and frequency without touching hardware.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::InvalidConfig`] for an unknown channel or a
    /// frequency outside `1..=1_000_000` Hz.
    pub fn validate(&self) -> Result<(), ActuatorError> {
        self.hardware_channel()?;
        if !(1..=MAX_PWM_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(ActuatorError::InvalidConfig(format!(
                "PWM frequency must be between 1 Hz and {MAX_PWM_FREQUENCY_HZ} Hz, got {}",
                self.frequency_hz
            )));
        }
        Ok(())
    }

    fn hardware_channel(&self) -> Result<Channel, ActuatorError> {
        match self.channel {
            0 => Ok(Channel::Pwm0),
            1 => Ok(Channel::Pwm1),
            other => Err(ActuatorError::InvalidConfig(format!(
                "PWM channel must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// The part of a PWM channel a fan needs.
pub trait PwmChannel: Send {
    /// Set the duty cycle as a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError`] if the channel rejects the value.
    fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<(), ActuatorError>;

    /// Stop the output.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError`] if the channel cannot be disabled.
    fn disable(&mut self) -> Result<(), ActuatorError>;
}

impl PwmChannel for Pwm {
    fn set_duty_cycle(&mut self, duty_cycle: f64) -> Result<(), ActuatorError> {
        Pwm::set_duty_cycle(self, duty_cycle)?;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ActuatorError> {
        Pwm::disable(self)?;
        Ok(())
    }
}

/// A fan on an enabled PWM channel.
///
/// Dropping the sink sets the duty cycle to 0 and disables the channel, on
/// every exit path.
#[derive(Debug)]
pub struct PwmSink<P: PwmChannel = Pwm> {
    pwm: P,
    label: String,
    released: bool,
}

impl PwmSink<Pwm> {
    /// Enable the configured channel at 0% duty.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::InvalidConfig`] for a bad configuration and
    /// [`ActuatorError::Open`] when the channel cannot be acquired, e.g. on a
    /// machine without the PWM overlay.
    pub fn open(config: &PwmConfig) -> Result<Self, ActuatorError> {
        config.validate()?;
        let channel = config.hardware_channel()?;
        let pwm = Pwm::with_frequency(
            channel,
            f64::from(config.frequency_hz),
            0.0,
            Polarity::Normal,
            true,
        )
        .map_err(|source| ActuatorError::Open {
            channel: config.channel,
            source,
        })?;

        info!(
            channel = config.channel,
            frequency_hz = config.frequency_hz,
            "PWM channel enabled"
        );
        Ok(Self::with_channel(pwm, format!("pwm{}", config.channel)))
    }
}

impl<P: PwmChannel> PwmSink<P> {
    /// Wrap an already enabled channel.
    pub fn with_channel(pwm: P, label: impl Into<String>) -> Self {
        Self {
            pwm,
            label: label.into(),
            released: false,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(e) = self.pwm.set_duty_cycle(0.0) {
            warn!("Failed to zero PWM duty cycle: {e}");
        }
        if let Err(e) = self.pwm.disable() {
            warn!("Failed to disable PWM channel: {e}");
        }
        info!(channel = %self.label, "PWM channel released");
    }
}

/// Duty cycle fraction for a power percentage.
pub fn duty_fraction(percent: f32) -> f64 {
    f64::from(clamp_percent(percent)) / f64::from(MAX_PERCENT)
}

impl<P: PwmChannel> ActuatorSink for PwmSink<P> {
    fn write_percent(&mut self, percent: f32) -> Result<(), ActuatorError> {
        self.pwm.set_duty_cycle(duty_fraction(percent))
    }

    fn describe(&self) -> String {
        format!("pwm {}", self.label)
    }
}

impl<P: PwmChannel> Drop for PwmSink<P> {
    fn drop(&mut self) {
        self.release();
    }
}
