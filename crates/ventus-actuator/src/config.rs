//! Selecting an output from configuration.

use serde::{Deserialize, Serialize};

use crate::error::ActuatorError;
use crate::log::LogSink;
use crate::pwm::{PwmConfig, PwmSink};
use crate::ActuatorSink;

/// Which output to drive.
///
/// ```yaml
/// actuator:
///   kind: pwm
///   channel: 0
///   frequency_hz: 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActuatorConfig {
    /// Report power through the log only.
    #[default]
    Log,
    /// Raspberry Pi hardware PWM channel.
    Pwm(PwmConfig),
}

impl ActuatorConfig {
    /// Check the configuration without touching hardware.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError::InvalidConfig`] for an unknown channel or an
    /// unusable frequency.
    pub fn validate(&self) -> Result<(), ActuatorError> {
        match self {
            ActuatorConfig::Log => Ok(()),
            ActuatorConfig::Pwm(pwm) => pwm.validate(),
        }
    }

    /// Open the configured output.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError`] if the hardware channel cannot be acquired.
    pub fn open(&self) -> Result<Box<dyn ActuatorSink>, ActuatorError> {
        match self {
            ActuatorConfig::Log => Ok(Box::new(LogSink::new())),
            ActuatorConfig::Pwm(pwm) => Ok(Box::new(PwmSink::open(pwm)?)),
        }
    }
}
