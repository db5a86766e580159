//! Telemetry errors.
//!
//! Decoding never produces an error (malformed packets read as speed 0).
//! These cover the socket and configuration only.

use std::net::SocketAddr;

use ventus_errors::{ValidationError, VentusError};

/// Error type for the telemetry listener and its configuration.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The UDP socket could not be bound, typically because the port is in use.
    #[error("Failed to bind telemetry socket on {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A receive on a bound socket failed.
    #[error("Telemetry receive failed: {0}")]
    Receive(#[source] std::io::Error),

    /// The speed convention names an axis outside the vector.
    #[error("Invalid speed convention: {0}")]
    InvalidConvention(String),
}

impl From<TelemetryError> for VentusError {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::InvalidConvention(reason) => VentusError::Validation(
                ValidationError::invalid_format("telemetry.convention", reason),
            ),
            other => VentusError::Telemetry(other.to_string()),
        }
    }
}
