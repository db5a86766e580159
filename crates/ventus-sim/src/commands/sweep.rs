//! Fan wiring check: ramp the duty cycle up and back down.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use ventus_actuator::ActuatorSink;

use crate::commands::SweepArgs;

/// Duty increment between steps (percent).
pub const SWEEP_STEP_PERCENT: u8 = 5;

/// Duty values of one ramp: 0, 5, ..., 100, then 100, 95, ..., 0.
///
/// The peak is held for two steps.
pub fn ramp() -> impl Iterator<Item = f32> {
    let up = (0..=100_u8).step_by(usize::from(SWEEP_STEP_PERCENT));
    let down = (0..=100_u8).rev().step_by(usize::from(SWEEP_STEP_PERCENT));
    up.chain(down).map(f32::from)
}

/// Drive `sink` through [`ramp`] repeatedly, holding each value for `step`.
///
/// Stops after `cycles` ramps or when `shutdown` resolves, then drives the
/// output to zero. Returns the number of completed ramps.
pub async fn run_sweep<A: ActuatorSink>(
    sink: &mut A,
    step: Duration,
    cycles: Option<u32>,
    shutdown: impl Future<Output = ()>,
) -> Result<u32> {
    tokio::pin!(shutdown);
    let mut completed = 0_u32;

    'sweep: while cycles.is_none_or(|limit| completed < limit) {
        for duty in ramp() {
            sink.write_percent(duty)
                .with_context(|| format!("Failed to set duty cycle on {}", sink.describe()))?;
            info!("PWM duty cycle: {duty:.0}%");
            tokio::select! {
                biased;
                () = &mut shutdown => break 'sweep,
                () = tokio::time::sleep(step) => {}
            }
        }
        completed += 1;
    }

    sink.shutdown()
        .with_context(|| format!("Failed to stop {}", sink.describe()))?;
    Ok(completed)
}

pub async fn execute(args: &SweepArgs, shutdown: impl Future<Output = ()>) -> Result<()> {
    let config = args.actuator_config();
    config.validate()?;
    let mut sink = config.open().context("Failed to open fan output")?;
    info!(output = %sink.describe(), "Sweep started, press Ctrl+C to stop");

    let result = run_sweep(
        &mut sink,
        Duration::from_millis(args.step_ms),
        args.cycles,
        shutdown,
    )
    .await;
    if let Err(e) = &result {
        warn!("Sweep aborted: {e:#}");
        if let Err(stop) = sink.shutdown() {
            warn!("Could not zero the output: {stop}");
        }
    }
    let cycles = result?;
    info!(cycles, "Sweep finished");
    Ok(())
}
