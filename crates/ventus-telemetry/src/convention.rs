//! How a velocity vector becomes a scalar speed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::packet::{VelocityVector, decode_velocity};
use crate::MPS_TO_MPH;

const fn default_forward_axis() -> usize {
    1
}

/// Rule for reducing a velocity vector to a speed, fixed per deployment.
///
/// `Magnitude` is direction-independent and never negative. `ForwardAxis`
/// reads one component, so reversing yields a negative speed, which the
/// power curves clamp to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpeedConvention {
    /// Euclidean norm of the vector.
    Magnitude,
    /// A single component of the vector.
    ForwardAxis {
        /// Component index, 0 = x, 1 = y, 2 = z.
        #[serde(default = "default_forward_axis")]
        axis: usize,
    },
}

impl Default for SpeedConvention {
    fn default() -> Self {
        SpeedConvention::ForwardAxis {
            axis: default_forward_axis(),
        }
    }
}

impl SpeedConvention {
    /// Reject a forward axis outside `0..=2`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConvention`] for an out-of-range axis.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        match self {
            SpeedConvention::ForwardAxis { axis } if *axis > 2 => Err(
                TelemetryError::InvalidConvention(format!("forward axis must be 0, 1 or 2, got {axis}")),
            ),
            _ => Ok(()),
        }
    }

    /// Speed in m/s of `velocity` under this convention.
    ///
    /// An invalid axis reads as 0.
    pub fn speed_mps(&self, velocity: &VelocityVector) -> f32 {
        match self {
            SpeedConvention::Magnitude => velocity.magnitude(),
            SpeedConvention::ForwardAxis { axis } => velocity.component(*axis).unwrap_or(0.0),
        }
    }

    /// Speed in mph of `velocity` under this convention.
    pub fn speed_mph(&self, velocity: &VelocityVector) -> f32 {
        self.speed_mps(velocity) * MPS_TO_MPH
    }
}

impl fmt::Display for SpeedConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedConvention::Magnitude => f.write_str("magnitude"),
            SpeedConvention::ForwardAxis { axis } => match axis {
                0 => f.write_str("x"),
                1 => f.write_str("y"),
                2 => f.write_str("z"),
                other => write!(f, "axis {other}"),
            },
        }
    }
}

/// Parses `magnitude`, `forward` (the y axis) or a single axis name `x`, `y`, `z`.
impl FromStr for SpeedConvention {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axis = match s.trim().to_ascii_lowercase().as_str() {
            "magnitude" | "norm" => return Ok(SpeedConvention::Magnitude),
            "forward" | "forward-axis" | "y" => 1,
            "x" => 0,
            "z" => 2,
            other => {
                return Err(TelemetryError::InvalidConvention(format!(
                    "unknown convention '{other}', expected magnitude, forward, x, y or z"
                )));
            }
        };
        Ok(SpeedConvention::ForwardAxis { axis })
    }
}

/// Decode a datagram straight to mph, reading anything malformed as 0.
pub fn decode_speed_mph(payload: &[u8], convention: SpeedConvention) -> f32 {
    decode_velocity(payload)
        .map(|velocity| convention.speed_mph(&velocity))
        .unwrap_or(0.0)
}
