//! In-memory output.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ActuatorError;
use crate::{ActuatorSink, clamp_percent};

/// Records every value written. Clones share one history, so a test can keep
/// a handle while the sink itself is moved into a control loop.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    history: Arc<Mutex<Vec<f32>>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every value written so far, after clamping.
    pub fn history(&self) -> Vec<f32> {
        self.history.lock().clone()
    }

    /// Most recent value written.
    pub fn last(&self) -> Option<f32> {
        self.history.lock().last().copied()
    }

    /// Forget the recorded values.
    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl ActuatorSink for RecordingSink {
    fn write_percent(&mut self, percent: f32) -> Result<(), ActuatorError> {
        self.history.lock().push(clamp_percent(percent));
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_clamped_values() -> Result<(), ActuatorError> {
        let mut sink = RecordingSink::new();
        for value in [10.0, -5.0, f32::NAN, 250.0] {
            sink.write_percent(value)?;
        }
        let history = sink.history();
        assert_eq!(history.len(), 4);
        let expected = [10.0, 0.0, 0.0, 100.0];
        for (got, want) in history.iter().zip(expected) {
            assert!((got - want).abs() < f32::EPSILON);
        }
        Ok(())
    }

    #[test]
    fn test_clones_share_history() -> Result<(), ActuatorError> {
        let observer = RecordingSink::new();
        let mut sink = observer.clone();
        sink.write_percent(55.0)?;
        assert!(observer.last().is_some_and(|v| (v - 55.0).abs() < f32::EPSILON));
        observer.clear();
        assert!(sink.history().is_empty());
        Ok(())
    }
}
