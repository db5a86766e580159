//! Shared, bounded top-speed value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::TopSpeedError;
use crate::{ABSOLUTE_MAX_TOP_SPEED_MPH, DEFAULT_TOP_SPEED_MPH};

/// Inclusive range a top speed must fall in.
///
/// The default `[1, 250]` matches the settings form; configuration may widen
/// the upper bound to 300.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSpeedBounds {
    /// Smallest accepted value (mph)
    pub min: u32,
    /// Largest accepted value (mph)
    pub max: u32,
}

impl Default for TopSpeedBounds {
    fn default() -> Self {
        Self { min: 1, max: 250 }
    }
}

impl TopSpeedBounds {
    /// Create bounds, checking `1 <= min <= max <= 300`.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::InvalidBounds`] otherwise.
    pub fn new(min: u32, max: u32) -> Result<Self, TopSpeedError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check an already-built (e.g. deserialized) range.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::InvalidBounds`] for an empty range, a zero
    /// minimum or a maximum above 300.
    pub fn validate(&self) -> Result<(), TopSpeedError> {
        let reason = if self.min == 0 {
            "minimum must be at least 1"
        } else if self.min > self.max {
            "minimum exceeds maximum"
        } else if self.max > ABSOLUTE_MAX_TOP_SPEED_MPH {
            "maximum exceeds 300"
        } else {
            return Ok(());
        };
        Err(TopSpeedError::InvalidBounds {
            min: self.min,
            max: self.max,
            reason: reason.to_string(),
        })
    }

    /// Whether `value` lies in the range.
    pub fn contains(&self, value: i64) -> bool {
        (i64::from(self.min)..=i64::from(self.max)).contains(&value)
    }

    /// Range-check `value`, narrowing it to `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::OutOfRange`] if `value` is outside the range.
    pub fn check(&self, value: i64) -> Result<u32, TopSpeedError> {
        match u32::try_from(value) {
            Ok(v) if self.contains(value) => Ok(v),
            _ => Err(TopSpeedError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            }),
        }
    }
}

/// Thread-safe top-speed setting.
///
/// Clones share one value. Writes are range-checked; a rejected write leaves
/// the previous value in place.
#[derive(Debug, Clone)]
pub struct TopSpeedCell {
    value: Arc<AtomicU32>,
    bounds: TopSpeedBounds,
}

impl Default for TopSpeedCell {
    fn default() -> Self {
        Self {
            value: Arc::new(AtomicU32::new(DEFAULT_TOP_SPEED_MPH)),
            bounds: TopSpeedBounds::default(),
        }
    }
}

impl TopSpeedCell {
    /// Create a cell holding `initial`.
    ///
    /// # Errors
    ///
    /// Returns an error if `bounds` is invalid or `initial` falls outside it.
    pub fn new(initial: u32, bounds: TopSpeedBounds) -> Result<Self, TopSpeedError> {
        bounds.validate()?;
        let initial = bounds.check(i64::from(initial))?;
        Ok(Self {
            value: Arc::new(AtomicU32::new(initial)),
            bounds,
        })
    }

    /// Current value (mph).
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Current value as a float, for the power curves.
    #[allow(clippy::cast_precision_loss)]
    pub fn get_mph(&self) -> f32 {
        // Bounded by 300, exactly representable.
        self.get() as f32
    }

    /// Replace the value.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::OutOfRange`] and keeps the previous value if
    /// `value` is outside the bounds.
    pub fn set(&self, value: i64) -> Result<(), TopSpeedError> {
        let value = self.bounds.check(value)?;
        self.value.store(value, Ordering::Release);
        Ok(())
    }

    /// Bounds enforced by [`set`](Self::set).
    pub fn bounds(&self) -> TopSpeedBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_default_cell() {
        let cell = TopSpeedCell::default();
        assert_eq!(cell.get(), 150);
        assert_eq!(cell.bounds(), TopSpeedBounds { min: 1, max: 250 });
    }

    #[test]
    fn test_set_within_bounds() -> TestResult {
        let cell = TopSpeedCell::default();
        cell.set(120)?;
        assert_eq!(cell.get(), 120);
        cell.set(1)?;
        cell.set(250)?;
        assert_eq!(cell.get(), 250);
        Ok(())
    }

    #[test]
    fn test_rejected_set_keeps_value() -> TestResult {
        let cell = TopSpeedCell::default();
        cell.set(90)?;
        for bad in [0, -5, 251, 999, i64::MAX, i64::MIN] {
            assert!(cell.set(bad).is_err(), "{bad} must be rejected");
            assert_eq!(cell.get(), 90);
        }
        Ok(())
    }

    #[test]
    fn test_clones_share_value() -> TestResult {
        let cell = TopSpeedCell::default();
        let reader = cell.clone();
        cell.set(42)?;
        assert_eq!(reader.get(), 42);
        Ok(())
    }

    #[test]
    fn test_widened_bounds() -> TestResult {
        let cell = TopSpeedCell::new(70, TopSpeedBounds::new(10, 300)?)?;
        cell.set(300)?;
        assert_eq!(cell.get(), 300);
        assert!(cell.set(5).is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(TopSpeedBounds::new(0, 250).is_err());
        assert!(TopSpeedBounds::new(200, 100).is_err());
        assert!(TopSpeedBounds::new(1, 301).is_err());
        assert!(TopSpeedBounds::new(150, 150).is_ok());
    }

    #[test]
    fn test_initial_outside_bounds() -> TestResult {
        let result = TopSpeedCell::new(260, TopSpeedBounds::default());
        assert!(matches!(result, Err(TopSpeedError::OutOfRange { value: 260, .. })));
        Ok(())
    }

    #[test]
    fn test_get_mph() -> TestResult {
        let cell = TopSpeedCell::default();
        cell.set(75)?;
        assert!((cell.get_mph() - 75.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn test_concurrent_writers_leave_valid_value() -> TestResult {
        let cell = TopSpeedCell::default();
        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let cell = cell.clone();
                std::thread::spawn(move || {
                    (0..100).all(|_| cell.set(i * 10).is_ok())
                })
            })
            .collect();
        for handle in handles {
            let Ok(all_accepted) = handle.join() else {
                return Err("writer thread panicked".into());
            };
            assert!(all_accepted);
        }
        assert!(cell.bounds().contains(i64::from(cell.get())));
        Ok(())
    }
}
