//! Output that only reports the power it would apply.

use tracing::info;

use crate::error::ActuatorError;
use crate::{ActuatorSink, clamp_percent};

/// Logs every power value at `info` instead of driving hardware.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<f32>,
}

impl LogSink {
    /// Create a sink that has written nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written, after clamping.
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

impl ActuatorSink for LogSink {
    fn write_percent(&mut self, percent: f32) -> Result<(), ActuatorError> {
        let percent = clamp_percent(percent);
        info!("Motor power: {percent:.2}%");
        self.last = Some(percent);
        Ok(())
    }

    fn describe(&self) -> String {
        "log".to_string()
    }
}
