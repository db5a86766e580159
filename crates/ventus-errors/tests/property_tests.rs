//! Property-based tests for error classification and messages.

use proptest::prelude::*;
use ventus_errors::{ErrorSeverity, ValidationError, VentusError};

proptest! {
    #[test]
    fn test_out_of_range_mentions_value(value in 251u32..10_000) {
        let err = ValidationError::out_of_range("top_speed", value, 1, 250);
        prop_assert!(err.to_string().contains(&value.to_string()));
        prop_assert_eq!(err.field(), Some("top_speed"));
    }

    #[test]
    fn test_validation_is_never_critical(field in "[a-z_.]{1,24}", reason in "[a-z ]{1,40}") {
        let err: VentusError = ValidationError::invalid_format(field, reason).into();
        prop_assert!(err.is_recoverable());
        prop_assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_top_speed_message_is_kept(message in "[a-zA-Z ]{1,40}") {
        let err = VentusError::TopSpeed(message.clone());
        prop_assert!(err.to_string().contains(&message));
        prop_assert!(err.is_recoverable());
    }
}
