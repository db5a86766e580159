//! Top-speed setting for Ventus.
//!
//! The top speed is the game speed (mph) that maps to 100% fan output. It is
//! an integer the user can change at any time through a small web page, and
//! the control loop reads it on every update.
//!
//! - [`TopSpeedCell`] holds the value. It is cheap to clone and every clone
//!   shares the same setting, so the web server and the control loop can run
//!   on different tasks.
//! - [`TopSpeedSource`] is what the control loop reads from. It is
//!   implemented by [`SharedTopSpeed`] (a cell in the same process),
//!   [`PolledTopSpeed`] (a remote settings server queried over HTTP) and
//!   [`FixedTopSpeed`] (a constant).
//! - [`server`] hosts the settings page and the JSON query endpoint.

#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

use std::time::Duration;

pub mod cell;
pub mod error;
pub mod poller;
pub mod server;
pub mod source;

pub use cell::{TopSpeedBounds, TopSpeedCell};
pub use error::TopSpeedError;
pub use poller::{PollConfig, PolledTopSpeed, fetch_top_speed};
pub use server::{SettingsServer, TopSpeedResponse, settings_router};
pub use source::{FixedTopSpeed, SharedTopSpeed, TopSpeedSource};

/// Top speed (mph) used until the user changes it.
pub const DEFAULT_TOP_SPEED_MPH: u32 = 150;

/// Largest top speed any configuration may allow.
pub const ABSOLUTE_MAX_TOP_SPEED_MPH: u32 = 300;

/// Path of the JSON query endpoint.
pub const TOP_SPEED_API_PATH: &str = "/get_top_speed_api";

/// Default port of the settings server.
pub const DEFAULT_SETTINGS_PORT: u16 = 5000;

/// Default URL the poller queries.
pub const DEFAULT_POLL_URL: &str = "http://127.0.0.1:5000/get_top_speed_api";

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default per-request timeout of the poller.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);
