//! Supported response curves for speed-to-power mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_REFERENCE_WIND_MPH;
use crate::error::PowerError;

fn default_reference_wind() -> f32 {
    DEFAULT_REFERENCE_WIND_MPH
}

/// Supported response curves.
///
/// A deployment picks exactly one curve; the control loop never switches
/// between them at runtime.
///
/// In configuration files the curve is an internally tagged map:
///
/// ```yaml
/// curve:
///   variant: quadratic
///   reference_wind_mph: 70.0
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant")]
pub enum PowerCurve {
    /// `power = clamp(speed / top_speed * 100, 0, 100)`, zero when `top_speed <= 0`.
    #[serde(rename = "linear")]
    Linear,

    /// Linear response expressed through a virtual reference wind speed.
    ///
    /// `real_wind = speed / top_speed * reference`, then
    /// `power = clamp(real_wind / reference * 100, 0, 100)`.
    /// Zero when `top_speed < 5`.
    #[serde(rename = "two-stage")]
    TwoStageReference {
        /// Real wind speed (mph) that corresponds to 100% output.
        #[serde(default = "default_reference_wind")]
        reference_wind_mph: f32,
    },

    /// Convex response: `power = clamp((real_wind / reference)^2 * 100, 0, 100)`.
    ///
    /// Zero when `top_speed < 5`.
    #[serde(rename = "quadratic")]
    QuadraticCurve {
        /// Real wind speed (mph) that corresponds to 100% output.
        #[serde(default = "default_reference_wind")]
        reference_wind_mph: f32,
    },
}

impl Default for PowerCurve {
    fn default() -> Self {
        PowerCurve::TwoStageReference {
            reference_wind_mph: DEFAULT_REFERENCE_WIND_MPH,
        }
    }
}

impl PowerCurve {
    /// Create a two-stage reference curve.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::InvalidConfiguration`] if the reference wind
    /// speed is not a positive finite number.
    pub fn two_stage(reference_wind_mph: f32) -> Result<Self, PowerError> {
        check_reference(reference_wind_mph)?;
        Ok(PowerCurve::TwoStageReference { reference_wind_mph })
    }

    /// Create a quadratic curve.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::InvalidConfiguration`] if the reference wind
    /// speed is not a positive finite number.
    pub fn quadratic(reference_wind_mph: f32) -> Result<Self, PowerError> {
        check_reference(reference_wind_mph)?;
        Ok(PowerCurve::QuadraticCurve { reference_wind_mph })
    }

    /// Validate a curve that was built without a constructor (e.g. deserialized).
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::InvalidConfiguration`] for an invalid reference wind speed.
    pub fn validate(&self) -> Result<(), PowerError> {
        match self.reference_wind_mph() {
            Some(reference) => check_reference(reference),
            None => Ok(()),
        }
    }

    /// Reference wind speed, if the curve uses one.
    pub fn reference_wind_mph(&self) -> Option<f32> {
        match self {
            PowerCurve::Linear => None,
            PowerCurve::TwoStageReference { reference_wind_mph }
            | PowerCurve::QuadraticCurve { reference_wind_mph } => Some(*reference_wind_mph),
        }
    }

    /// Short name used in logs, configuration and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            PowerCurve::Linear => "linear",
            PowerCurve::TwoStageReference { .. } => "two-stage",
            PowerCurve::QuadraticCurve { .. } => "quadratic",
        }
    }
}

fn check_reference(reference_wind_mph: f32) -> Result<(), PowerError> {
    if !reference_wind_mph.is_finite() {
        return Err(PowerError::InvalidConfiguration(
            "reference wind speed must be finite".to_string(),
        ));
    }
    if reference_wind_mph <= 0.0 {
        return Err(PowerError::InvalidConfiguration(format!(
            "reference wind speed must be > 0, got {reference_wind_mph}"
        )));
    }
    Ok(())
}

impl fmt::Display for PowerCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference_wind_mph() {
            Some(reference) => write!(f, "{} (reference {reference} mph)", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Parses `linear`, `two-stage` or `quadratic`, using the default reference wind.
impl FromStr for PowerCurve {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(PowerCurve::Linear),
            "two-stage" | "two_stage" | "reference" => {
                PowerCurve::two_stage(DEFAULT_REFERENCE_WIND_MPH)
            }
            "quadratic" | "realistic" => PowerCurve::quadratic(DEFAULT_REFERENCE_WIND_MPH),
            other => Err(PowerError::UnknownVariant(other.to_string())),
        }
    }
}
