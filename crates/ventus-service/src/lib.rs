//! Ventus wind feedback daemon.
//!
//! Receives velocity telemetry from the game, maps speed to fan power
//! against the configured top speed and drives the fan. Optionally hosts the
//! settings page that changes the top speed.

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod shutdown;

pub use app::run_service;
pub use cli::Cli;
pub use config::{ServiceConfig, TopSpeedSourceKind};
pub use controller::{Controller, LoopStats};
pub use shutdown::shutdown_signal;
