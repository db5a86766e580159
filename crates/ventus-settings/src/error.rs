//! Error types for the top-speed setting.

use std::net::SocketAddr;

use ventus_errors::{ValidationError, VentusError};

/// Error type for the top-speed cell, poller and settings server.
#[derive(Debug, thiserror::Error)]
pub enum TopSpeedError {
    /// A value outside the configured bounds was offered.
    #[error("Top speed {value} outside allowed range [{min}, {max}]")]
    OutOfRange {
        /// Offered value
        value: i64,
        /// Lower bound (inclusive)
        min: u32,
        /// Upper bound (inclusive)
        max: u32,
    },

    /// The bounds themselves are unusable.
    #[error("Invalid top speed bounds [{min}, {max}]: {reason}")]
    InvalidBounds {
        /// Requested lower bound
        min: u32,
        /// Requested upper bound
        max: u32,
        /// What is wrong with them
        reason: String,
    },

    /// The HTTP request failed (timeout, connection refused, error status).
    #[error("Top speed request failed: {0}")]
    Fetch(String),

    /// The response arrived but did not carry a usable top speed.
    #[error("Invalid top speed response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The settings server could not bind its address.
    #[error("Failed to bind settings server on {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl From<TopSpeedError> for VentusError {
    fn from(e: TopSpeedError) -> Self {
        match e {
            TopSpeedError::OutOfRange { value, min, max } => VentusError::Validation(
                ValidationError::out_of_range("top_speed", value, i64::from(min), i64::from(max)),
            ),
            TopSpeedError::InvalidBounds { .. } => VentusError::Config(e.to_string()),
            TopSpeedError::Bind { .. } => VentusError::Io(std::io::Error::other(e.to_string())),
            TopSpeedError::Fetch(_)
            | TopSpeedError::InvalidResponse(_)
            | TopSpeedError::Client(_) => VentusError::TopSpeed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventus_errors::{ErrorCategory, ErrorSeverity};

    #[test]
    fn test_out_of_range_message() {
        let err = TopSpeedError::OutOfRange {
            value: 999,
            min: 1,
            max: 250,
        };
        assert_eq!(err.to_string(), "Top speed 999 outside allowed range [1, 250]");
    }

    #[test]
    fn test_fetch_failures_are_warnings() {
        let err: VentusError = TopSpeedError::Fetch("timed out".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::TopSpeed);
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_out_of_range_maps_to_validation() {
        let err: VentusError = TopSpeedError::OutOfRange {
            value: 0,
            min: 1,
            max: 250,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
