//! Everything a config validator needs in one import, plus the early-return macros.

pub use crate::{
    Result,
    common::{ErrorCategory, ErrorSeverity, VentusError},
    validation::ValidationError,
};

/// Return early with a validation error when a condition does not hold.
#[macro_export]
macro_rules! validate {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}

/// Return early with an out of range validation error.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if !($min..=$max).contains(&$value) {
            return Err($crate::ValidationError::out_of_range($field, $value, $min, $max).into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_macro() {
        fn check(poll_ms: u64) -> Result<()> {
            validate!(
                poll_ms > 0,
                ValidationError::constraint("poll interval must be positive")
            );
            Ok(())
        }
        assert!(check(5000).is_ok());
        assert!(check(0).is_err());
    }

    #[test]
    fn test_validate_range_macro() {
        fn check(timeout_ms: u64) -> Result<()> {
            validate_range!("request_timeout_ms", timeout_ms, 1, 1000);
            Ok(())
        }
        assert!(check(500).is_ok());
        assert!(check(1500).is_err());
    }
}
