//! Headless wind dashboard.
//!
//! Simulates the game speed, maps it to fan power with the linear curve and
//! keeps a rolling event log and history, the way the interactive dashboard
//! did. Each step prints one status line; a summary follows on exit.

use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};
use ventus_power::{PowerCurve, compute_motor_power};

use crate::commands::{DashboardArgs, make_rng};

pub const DEFAULT_TOP_SPEED_MPH: u32 = 70;
pub const MIN_TOP_SPEED_MPH: u32 = 10;
pub const MAX_TOP_SPEED_MPH: u32 = 300;

/// Entries kept in the event log.
pub const MAX_LOG_ENTRIES: usize = 30;
/// Points kept in the history.
pub const MAX_HISTORY_POINTS: usize = 100;

const BASELINE_FRACTION: f32 = 0.4;
const FLUCTUATION_FRACTION: f32 = 0.1;
const CHANGE_FACTOR: f32 = 0.3;
const MANUAL_CHANGE_EPSILON: f32 = 0.01;

/// One recorded step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    /// Seconds since the simulation was started
    pub elapsed_secs: f32,
    pub speed_mph: f32,
    pub power_percent: f32,
}

/// How the next speed is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedMode {
    /// Smoothed random walk around 40% of the top speed
    RandomWalk,
    /// Fixed setpoint (mph), clamped to the top speed
    Manual(f32),
}

/// Simulation state.
#[derive(Debug)]
pub struct Dashboard {
    top_speed_mph: u32,
    speed_mph: f32,
    power_percent: f32,
    mode: SpeedMode,
    running: bool,
    started: Instant,
    log: VecDeque<String>,
    history: VecDeque<HistoryPoint>,
}

impl Dashboard {
    pub fn new(top_speed_mph: u32) -> Result<Self> {
        check_top_speed(top_speed_mph)?;
        let mut dashboard = Self {
            top_speed_mph,
            speed_mph: 0.0,
            power_percent: 0.0,
            mode: SpeedMode::RandomWalk,
            running: false,
            started: Instant::now(),
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            history: VecDeque::with_capacity(MAX_HISTORY_POINTS),
        };
        dashboard.add_log("Simulator initialized".to_string());
        Ok(dashboard)
    }

    pub fn top_speed_mph(&self) -> u32 {
        self.top_speed_mph
    }

    pub fn speed_mph(&self) -> f32 {
        self.speed_mph
    }

    pub fn power_percent(&self) -> f32 {
        self.power_percent
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.history.iter()
    }

    /// Change the scaling top speed; power follows immediately.
    pub fn set_top_speed(&mut self, top_speed_mph: u32) -> Result<()> {
        check_top_speed(top_speed_mph)?;
        if top_speed_mph != self.top_speed_mph {
            self.top_speed_mph = top_speed_mph;
            self.add_log(format!("Vehicle top speed for scaling set to {top_speed_mph} mph"));
            self.power_percent = self.power_for(self.speed_mph);
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: SpeedMode) {
        self.mode = mode;
    }

    /// Start stepping; clears the history and restarts the clock.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.started = Instant::now();
        self.history.clear();
        self.add_log("Simulation started".to_string());
    }

    /// Stop stepping. The next [`step`](Self::step) resets speed and power.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.add_log("Simulation stopped".to_string());
    }

    /// Advance the simulation by one tick.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        if !self.running {
            if self.speed_mph.abs() > f32::EPSILON {
                self.speed_mph = 0.0;
                self.power_percent = self.power_for(0.0);
                self.record();
                self.add_log("Simulation stopped, speed and power set to 0".to_string());
            }
            return;
        }

        let top = self.top_speed_f32();
        let new_speed = match self.mode {
            SpeedMode::Manual(setpoint) => {
                let setpoint = if setpoint.is_nan() { 0.0 } else { setpoint.clamp(0.0, top) };
                if (setpoint - self.speed_mph).abs() > MANUAL_CHANGE_EPSILON {
                    self.add_log(format!("Manual speed updated to {setpoint:.2} mph"));
                }
                setpoint
            }
            SpeedMode::RandomWalk => {
                let spread = top * FLUCTUATION_FRACTION;
                let target = top * BASELINE_FRACTION + rng.random_range(-spread..=spread);
                let next = (self.speed_mph * (1.0 - CHANGE_FACTOR) + target * CHANGE_FACTOR)
                    .clamp(0.0, top);
                self.add_log(format!("Random speed generated: {next:.2} mph"));
                next
            }
        };

        self.speed_mph = new_speed;
        self.power_percent = self.power_for(new_speed);
        self.add_log(format!(
            "PWM: {:.2}% (speed {:.2} mph, top {} mph)",
            self.power_percent, self.speed_mph, self.top_speed_mph
        ));
        self.record();
    }

    pub fn status_line(&self) -> String {
        format!(
            "speed {:>6.1} mph | power {:>5.1}% | top {} mph",
            self.speed_mph, self.power_percent, self.top_speed_mph
        )
    }

    /// Multi-line report of the history and the most recent events.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let points = self.history.len();
        out.push_str(&format!("History: {points} points\n"));
        if points > 0 {
            let (sum_speed, peak_speed, sum_power, peak_power) = self.history.iter().fold(
                (0.0_f32, 0.0_f32, 0.0_f32, 0.0_f32),
                |(sum_s, peak_s, sum_p, peak_p), p| {
                    (
                        sum_s + p.speed_mph,
                        peak_s.max(p.speed_mph),
                        sum_p + p.power_percent,
                        peak_p.max(p.power_percent),
                    )
                },
            );
            #[allow(clippy::cast_precision_loss)]
            let n = points as f32;
            out.push_str(&format!(
                "  speed: mean {:.1} mph, peak {peak_speed:.1} mph\n",
                sum_speed / n
            ));
            out.push_str(&format!(
                "  power: mean {:.1}%, peak {peak_power:.1}%\n",
                sum_power / n
            ));
        }
        out.push_str("Event log (newest first):\n");
        for entry in self.log.iter().rev() {
            out.push_str("  ");
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    // Bounded to 300, exact in f32.
    #[allow(clippy::cast_precision_loss)]
    fn top_speed_f32(&self) -> f32 {
        self.top_speed_mph as f32
    }

    fn power_for(&self, speed_mph: f32) -> f32 {
        compute_motor_power(speed_mph, self.top_speed_f32(), PowerCurve::Linear)
    }

    fn add_log(&mut self, message: String) {
        debug!("{message}");
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.log.push_back(format!("{stamp}: {message}"));
        while self.log.len() > MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    fn record(&mut self) {
        self.history.push_back(HistoryPoint {
            elapsed_secs: self.started.elapsed().as_secs_f32(),
            speed_mph: self.speed_mph,
            power_percent: self.power_percent,
        });
        while self.history.len() > MAX_HISTORY_POINTS {
            self.history.pop_front();
        }
    }
}

fn check_top_speed(top_speed_mph: u32) -> Result<()> {
    anyhow::ensure!(
        (MIN_TOP_SPEED_MPH..=MAX_TOP_SPEED_MPH).contains(&top_speed_mph),
        "top speed must be between {MIN_TOP_SPEED_MPH} and {MAX_TOP_SPEED_MPH} mph, got {top_speed_mph}"
    );
    Ok(())
}

/// Step `dashboard` every `step` until `steps` ran or `shutdown` resolves,
/// printing a status line per step. Stops the simulation before returning.
pub async fn run_dashboard<R: Rng>(
    dashboard: &mut Dashboard,
    rng: &mut R,
    step: Duration,
    steps: Option<u64>,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(step);
    let mut taken = 0_u64;

    dashboard.start();
    while steps.is_none_or(|limit| taken < limit) {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                dashboard.step(rng);
                taken += 1;
                println!("{}", dashboard.status_line());
            }
        }
    }
    dashboard.stop();
    dashboard.step(rng);
    taken
}

pub async fn execute(args: &DashboardArgs, shutdown: impl Future<Output = ()>) -> Result<()> {
    let mut dashboard = Dashboard::new(args.top_speed)?;
    if let Some(setpoint) = args.manual {
        dashboard.set_mode(SpeedMode::Manual(setpoint));
    }
    let mut rng = make_rng(args.seed);
    info!(top_speed = args.top_speed, "Dashboard started, press Ctrl+C to stop");

    let steps = run_dashboard(
        &mut dashboard,
        &mut rng,
        Duration::from_millis(args.step_ms),
        args.steps,
        shutdown,
    )
    .await;

    info!(steps, "Dashboard stopped");
    print!("{}", dashboard.summary());
    Ok(())
}
