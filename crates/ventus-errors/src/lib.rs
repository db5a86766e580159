//! Shared error taxonomy for Ventus
//!
//! Every library crate in the workspace defines its own `thiserror` enum for
//! the failures it can produce, and converts it into [`VentusError`] at the
//! crate boundary. The shared type carries a classification used by the
//! control loop to decide whether a failure is a steady-state condition
//! (log and continue) or a startup failure (abort with a diagnostic).
//!
//! - [`common`]: the shared error, its category and severity
//! - [`validation`]: configuration and user-input validation errors
//!
//! # Example
//!
//! ```
//! use ventus_errors::{prelude::*, validate_range};
//!
//! fn check_top_speed(value: u32) -> Result<u32> {
//!     validate_range!("top_speed", value, 1, 300);
//!     Ok(value)
//! }
//!
//! assert!(check_top_speed(150).is_ok());
//! assert!(check_top_speed(999).is_err());
//! ```

#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod prelude;
pub mod validation;

pub use common::{ErrorCategory, ErrorSeverity, VentusError};
pub use validation::ValidationError;

/// A specialized `Result` type for Ventus operations.
pub type Result<T> = std::result::Result<T, VentusError>;
