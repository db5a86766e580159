//! The shared error type and its classification.

use core::fmt;

use crate::ValidationError;

/// Error type every Ventus crate error converts into.
#[derive(Debug, thiserror::Error)]
pub enum VentusError {
    /// Refused configuration value or user input
    #[error("Invalid value: {0}")]
    Validation(#[from] ValidationError),

    /// UDP socket failure
    #[error("Telemetry: {0}")]
    Telemetry(String),

    /// Top speed could not be read or stored
    #[error("Top speed: {0}")]
    TopSpeed(String),

    /// Fan output could not be driven
    #[error("Fan output: {0}")]
    Actuator(String),

    /// Filesystem or socket error outside the categories above
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable configuration
    #[error("Configuration: {0}")]
    Config(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl VentusError {
    /// Subsystem the error came from.
    pub fn category(&self) -> ErrorCategory {
        match self {
            VentusError::Validation(_) => ErrorCategory::Validation,
            VentusError::Telemetry(_) => ErrorCategory::Telemetry,
            VentusError::TopSpeed(_) => ErrorCategory::TopSpeed,
            VentusError::Actuator(_) => ErrorCategory::Actuator,
            VentusError::Io(_) => ErrorCategory::Io,
            VentusError::Config(_) => ErrorCategory::Config,
            VentusError::Other(_) => ErrorCategory::Other,
        }
    }

    /// How bad the error is for a running control loop.
    ///
    /// A failed top-speed read is a warning since the last good value stays
    /// in effect. A failed fan write is critical since the fan may be left
    /// spinning at whatever it was last given.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VentusError::Validation(e) => e.severity(),
            VentusError::TopSpeed(_) => ErrorSeverity::Warning,
            VentusError::Actuator(_) => ErrorSeverity::Critical,
            VentusError::Telemetry(_)
            | VentusError::Io(_)
            | VentusError::Config(_)
            | VentusError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Whether the loop can carry on as if nothing happened.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }
}

/// Subsystem an error belongs to, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Telemetry socket
    Telemetry,
    /// Top-speed setting and its sources
    TopSpeed,
    /// Fan output
    Actuator,
    /// Configuration file and flags
    Config,
    /// Other I/O
    Io,
    /// Rejected values
    Validation,
    /// Anything else
    Other,
}

impl ErrorCategory {
    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Telemetry => "telemetry",
            ErrorCategory::TopSpeed => "top_speed",
            ErrorCategory::Actuator => "actuator",
            ErrorCategory::Config => "config",
            ErrorCategory::Io => "io",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Other => "other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Nothing to do
    Info,
    /// Degraded but still correct
    Warning,
    /// The operation failed
    Error,
    /// Output may be in an unknown state
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Critical => "critical",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_are_log_friendly() {
        assert_eq!(ErrorCategory::TopSpeed.to_string(), "top_speed");
        assert_eq!(ErrorCategory::Actuator.as_str(), "actuator");
    }

    #[test]
    fn test_severity_order() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_top_speed_failure_is_a_warning() {
        let err = VentusError::TopSpeed("request timed out".to_string());
        assert_eq!(err.category(), ErrorCategory::TopSpeed);
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fan_failure_is_critical() {
        let err = VentusError::Actuator("pwm channel vanished".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port 4444 in use");
        let err: VentusError = io.into();
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.to_string().contains("port 4444 in use"));
    }

    #[test]
    fn test_validation_keeps_field_in_message() {
        let err: VentusError = ValidationError::out_of_range("top_speed", 0, 1, 250).into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("top_speed = 0"));
    }
}
