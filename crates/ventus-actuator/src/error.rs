//! Actuator errors.

use ventus_errors::VentusError;

/// Error type for fan outputs.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    /// The PWM channel could not be acquired at startup.
    #[error("Failed to open PWM channel {channel}: {source}")]
    Open {
        /// Requested channel
        channel: u8,
        /// Error from the PWM driver
        #[source]
        source: rppal::pwm::Error,
    },

    /// A running PWM channel rejected a write.
    #[error("PWM write failed: {0}")]
    Pwm(#[from] rppal::pwm::Error),

    /// The output configuration cannot be used.
    #[error("Invalid actuator configuration: {0}")]
    InvalidConfig(String),
}

impl From<ActuatorError> for VentusError {
    fn from(e: ActuatorError) -> Self {
        match e {
            ActuatorError::InvalidConfig(msg) => VentusError::Config(msg),
            other => VentusError::Actuator(other.to_string()),
        }
    }
}
