//! Rejected configuration values and user input.
//!
//! A validation failure never changes state: the previous valid value stays
//! in effect. Field names use the dotted configuration path
//! (`top_speed.poll_interval_ms`) so a message points straight at the line
//! of YAML or the form field to fix.

use core::fmt;

use crate::common::ErrorSeverity;

/// A value that was refused at a configuration or input boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Numeric value outside its inclusive bounds
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Dotted field path
        field: String,
        /// Rejected value, as text
        value: String,
        /// Lowest accepted value
        min: String,
        /// Highest accepted value
        max: String,
    },

    /// Value present but not in the expected shape (not a URL, not an axis)
    #[error("{field} is malformed: {reason}")]
    InvalidFormat {
        /// Dotted field path
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Name that is not one of the known choices
    #[error("{field} has no choice '{value}' (known: {expected})")]
    UnknownChoice {
        /// Dotted field path
        field: String,
        /// Rejected name
        value: String,
        /// Comma separated list of accepted names
        expected: String,
    },

    /// Rule that spans a value and its context, e.g. a zero poll interval
    #[error("{0}")]
    Constraint(String),
}

impl ValidationError {
    /// Rejected input is always an error; the caller keeps its old value.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Dotted path of the offending field, when the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::UnknownChoice { field, .. } => Some(field),
            ValidationError::Constraint(_) => None,
        }
    }

    /// Value outside `[min, max]`.
    pub fn out_of_range<T: fmt::Display>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Value in the wrong shape.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name not among `expected`.
    pub fn invalid_enum(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ValidationError::UnknownChoice {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Free-form rule violation.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::Constraint(msg.into())
    }
}
