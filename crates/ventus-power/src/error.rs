//! Error types for power curve configuration.
//!
//! Evaluating a curve never fails. These errors are only raised when a curve
//! is built or parsed from configuration.

use ventus_errors::{ValidationError, VentusError};

/// Error type for power curve configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PowerError {
    /// Invalid curve parameter, e.g. a reference wind speed that is not a
    /// positive finite number.
    #[error("Invalid power curve configuration: {0}")]
    InvalidConfiguration(String),

    /// Curve name not recognised when parsing from text.
    #[error("Unknown power curve '{0}', expected one of: linear, two-stage, quadratic")]
    UnknownVariant(String),
}

impl From<PowerError> for VentusError {
    fn from(e: PowerError) -> Self {
        match e {
            PowerError::InvalidConfiguration(msg) => VentusError::Config(msg),
            PowerError::UnknownVariant(name) => VentusError::Validation(
                ValidationError::invalid_enum("curve", name, "linear, two-stage, quadratic"),
            ),
        }
    }
}
