//! Fan power outputs for Ventus.
//!
//! An [`ActuatorSink`] takes a power percentage and drives an output with it.
//! There is no feedback: each sample is written and forgotten.
//!
//! - [`PwmSink`] drives a Raspberry Pi hardware PWM channel (GPIO 18 by
//!   default) through `rppal`
//! - [`LogSink`] reports the value through `tracing` instead of hardware
//! - [`RecordingSink`] keeps every value in memory for inspection
//!
//! Every sink clamps its input to `[0, 100]` (NaN becomes 0) before writing.

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod log;
pub mod pwm;
pub mod recording;

pub use config::ActuatorConfig;
pub use error::ActuatorError;
pub use log::LogSink;
pub use recording::RecordingSink;
pub use pwm::{PwmChannel, PwmConfig, PwmSink};

/// Upper bound of the power percentage.
pub const MAX_PERCENT: f32 = 100.0;

/// Consumer of fan power percentages.
pub trait ActuatorSink: Send {
    /// Drive the output at `percent`, clamped to `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError`] if the output could not be written.
    fn write_percent(&mut self, percent: f32) -> Result<(), ActuatorError>;

    /// Drive the output to zero before the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ActuatorError`] if the output could not be written.
    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        self.write_percent(0.0)
    }

    /// Short label for logs.
    fn describe(&self) -> String;
}

impl<S: ActuatorSink + ?Sized> ActuatorSink for Box<S> {
    fn write_percent(&mut self, percent: f32) -> Result<(), ActuatorError> {
        (**self).write_percent(percent)
    }

    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        (**self).shutdown()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Clamp a percentage to `[0, 100]`, mapping NaN to 0.
pub fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, MAX_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_percent() {
        assert!(clamp_percent(f32::NAN).abs() < f32::EPSILON);
        assert!(clamp_percent(-3.0).abs() < f32::EPSILON);
        assert!((clamp_percent(42.5) - 42.5).abs() < f32::EPSILON);
        assert!((clamp_percent(140.0) - 100.0).abs() < f32::EPSILON);
        assert!((clamp_percent(f32::INFINITY) - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_boxed_sink_forwards() -> Result<(), ActuatorError> {
        let recorder = RecordingSink::new();
        let mut boxed: Box<dyn ActuatorSink> = Box::new(recorder.clone());
        boxed.write_percent(30.0)?;
        boxed.shutdown()?;
        assert_eq!(recorder.history().len(), 2);
        assert!(recorder.last().is_some_and(|v| v.abs() < f32::EPSILON));
        Ok(())
    }
}
