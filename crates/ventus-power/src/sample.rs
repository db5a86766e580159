//! Evaluation of a power curve for one telemetry sample.

use serde::{Deserialize, Serialize};

use crate::curve::PowerCurve;
use crate::{MAX_POWER_PERCENT, MIN_REFERENCE_TOP_SPEED_MPH};

/// One evaluation of a power curve, with its inputs and intermediates.
///
/// The reference curves also record the real wind equivalent, which is the
/// calibration quantity the reference wind speed exists for even though it
/// cancels out of the final power value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    /// Vehicle speed (mph) as decoded from telemetry.
    pub speed_mph: f32,
    /// Top speed (mph) the sample was normalized against.
    pub top_speed_mph: f32,
    /// Reference wind speed of the curve, if any.
    pub reference_wind_mph: Option<f32>,
    /// Real wind equivalent (mph), if the curve uses a reference and the top
    /// speed was not degenerate.
    pub real_wind_equivalent_mph: Option<f32>,
    /// Resulting power in `[0, 100]`.
    pub power_percent: f32,
}

impl PowerSample {
    /// Evaluate `curve` for the given speed and top speed.
    pub fn compute(speed_mph: f32, top_speed_mph: f32, curve: PowerCurve) -> Self {
        let reference_wind_mph = curve.reference_wind_mph();
        let mut sample = Self {
            speed_mph,
            top_speed_mph,
            reference_wind_mph,
            real_wind_equivalent_mph: None,
            power_percent: 0.0,
        };

        match curve {
            PowerCurve::Linear => {
                // NaN top speed fails this comparison too.
                if !(top_speed_mph > 0.0) {
                    return sample;
                }
                sample.power_percent = clamp_percent(speed_mph / top_speed_mph * MAX_POWER_PERCENT);
            }
            PowerCurve::TwoStageReference { reference_wind_mph }
            | PowerCurve::QuadraticCurve { reference_wind_mph } => {
                if !(top_speed_mph >= MIN_REFERENCE_TOP_SPEED_MPH) {
                    return sample;
                }
                let normalized_speed = speed_mph / top_speed_mph;
                let real_wind = normalized_speed * reference_wind_mph;
                sample.real_wind_equivalent_mph = Some(real_wind);

                let fraction = real_wind / reference_wind_mph;
                let scaled = if matches!(curve, PowerCurve::QuadraticCurve { .. }) {
                    // Negative speed must not square into positive power.
                    let fraction = fraction.max(0.0);
                    fraction * fraction
                } else {
                    fraction
                };
                sample.power_percent = clamp_percent(scaled * MAX_POWER_PERCENT);
            }
        }
        sample
    }
}

/// Map `speed_mph` to a fan power percentage in `[0, 100]` using `curve`.
///
/// Never fails: degenerate inputs resolve to 0 and overshoot clamps to 100.
pub fn compute_motor_power(speed_mph: f32, top_speed_mph: f32, curve: PowerCurve) -> f32 {
    PowerSample::compute(speed_mph, top_speed_mph, curve).power_percent
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_POWER_PERCENT)
}
