//! Velocity telemetry for Ventus.
//!
//! The game streams JSON datagrams carrying a velocity vector in m/s:
//!
//! ```json
//! {"vel": [0.0, 31.3, 0.2], "other": "ignored"}
//! ```
//!
//! This crate turns those datagrams into a scalar speed in mph. Decoding is
//! fail-soft: anything malformed reads as a stationary vehicle, so a
//! corrupted packet can only ever slow the fan down.
//!
//! # Example
//!
//! ```
//! use ventus_telemetry::{SpeedConvention, decode_speed_mph};
//!
//! let speed = decode_speed_mph(br#"{"vel":[3,4,0]}"#, SpeedConvention::Magnitude);
//! assert!((speed - 11.185).abs() < 1e-3);
//!
//! let garbage = decode_speed_mph(b"not json", SpeedConvention::Magnitude);
//! assert!(garbage.abs() < f32::EPSILON);
//! ```

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod convention;
pub mod error;
pub mod listener;
pub mod packet;

pub use convention::{SpeedConvention, decode_speed_mph};
pub use error::TelemetryError;
pub use listener::TelemetryListener;
pub use packet::{VelocityVector, decode_velocity, encode_packet};

/// Conversion factor from m/s to mph.
pub const MPS_TO_MPH: f32 = 2.237;

/// Conversion factor from mph to m/s, used when synthesizing packets.
pub const MPH_TO_MPS: f32 = 0.44704;

/// Default UDP port the game sends telemetry to.
pub const DEFAULT_TELEMETRY_PORT: u16 = 4444;

/// Largest datagram read in one receive; longer datagrams are truncated.
pub const MAX_DATAGRAM_SIZE: usize = 1024;
