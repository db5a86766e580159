//! Speed-to-power normalization for Ventus
//!
//! This crate maps an in-game vehicle speed and a configured top speed to a
//! fan power percentage. It is the numeric core of the controller: every
//! other crate in the workspace is I/O around it.
//!
//! # Overview
//!
//! Three response curves are supported, selected once per deployment:
//! - **Linear**: `speed / top_speed * 100`
//! - **Two-stage reference**: the same line, computed through an intermediate
//!   "real wind equivalent" scaled to a virtual reference wind speed
//! - **Quadratic curve**: the square of the normalized speed, giving a convex
//!   response where low speeds produce disproportionately little power
//!
//! # Numeric contract
//!
//! - The result is always in `[0, 100]`; overshoot clamps to 100
//! - Negative or NaN speed produces 0
//! - A degenerate top speed (`<= 0` for linear, `< 5` for the reference
//!   curves) produces 0 instead of dividing by zero
//! - No state is kept between calls
//!
//! # Example
//!
//! ```
//! use ventus_power::{PowerCurve, compute_motor_power};
//!
//! let linear = compute_motor_power(75.0, 150.0, PowerCurve::Linear);
//! assert!((linear - 50.0).abs() < f32::EPSILON);
//!
//! let quadratic = compute_motor_power(75.0, 150.0, PowerCurve::quadratic(70.0)?);
//! assert!((quadratic - 25.0).abs() < f32::EPSILON);
//! # Ok::<(), ventus_power::PowerError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod curve;
pub mod error;
pub mod sample;

pub use curve::PowerCurve;
pub use error::PowerError;
pub use sample::{PowerSample, compute_motor_power};

/// Virtual reference wind speed (mph) representing real wind at 100% output.
pub const DEFAULT_REFERENCE_WIND_MPH: f32 = 70.0;

/// Below this top speed the reference curves return 0.
pub const MIN_REFERENCE_TOP_SPEED_MPH: f32 = 5.0;

/// Upper bound of the power percentage.
pub const MAX_POWER_PERCENT: f32 = 100.0;
