//! The control loop: telemetry in, fan power out.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};
use ventus_actuator::ActuatorSink;
use ventus_errors::VentusError;
use ventus_power::{PowerCurve, PowerSample};
use ventus_settings::TopSpeedSource;
use ventus_telemetry::TelemetryListener;

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopStats {
    /// Datagrams turned into a power update
    pub samples: u64,
    /// Receive timeouts with no datagram
    pub idle_turns: u64,
    /// Socket receive errors
    pub receive_errors: u64,
    /// Failed actuator writes
    pub actuator_errors: u64,
    /// Last value written to the output, including the zero written on
    /// shutdown
    pub last_power: Option<f32>,
    /// Last power computed from a datagram and written successfully
    pub last_telemetry_power: Option<f32>,
}

/// Single-task controller owning the socket, the top-speed source and the output.
///
/// Each turn reads the top speed (which polls only when due), waits up to
/// the receive timeout for one datagram and, if one arrived, writes the
/// resulting power. Without telemetry the output holds its last value.
pub struct Controller<S, A> {
    listener: TelemetryListener,
    top_speed: S,
    actuator: A,
    curve: PowerCurve,
    recv_timeout: Duration,
    stats: LoopStats,
}

impl<S, A> std::fmt::Debug for Controller<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("curve", &self.curve)
            .field("recv_timeout", &self.recv_timeout)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: TopSpeedSource, A: ActuatorSink> Controller<S, A> {
    /// Assemble a controller from its parts.
    pub fn new(
        listener: TelemetryListener,
        top_speed: S,
        actuator: A,
        curve: PowerCurve,
        recv_timeout: Duration,
    ) -> Self {
        Self {
            listener,
            top_speed,
            actuator,
            curve,
            recv_timeout,
            stats: LoopStats::default(),
        }
    }

    /// Run until `shutdown` resolves, then drive the output to zero.
    ///
    /// The socket and the output are released when the controller is
    /// dropped at the end of this call.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> LoopStats {
        info!(
            curve = %self.curve,
            top_speed = %self.top_speed.describe(),
            actuator = %self.actuator.describe(),
            convention = %self.listener.convention(),
            "Control loop started"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping control loop");
                    break;
                }
                () = self.turn() => {}
            }
        }

        if let Err(e) = self.actuator.shutdown() {
            error!("Failed to drive output to zero: {e}");
        } else {
            self.stats.last_power = Some(0.0);
        }
        info!(
            samples = self.stats.samples,
            idle_turns = self.stats.idle_turns,
            receive_errors = self.stats.receive_errors,
            actuator_errors = self.stats.actuator_errors,
            last_telemetry_power = ?self.stats.last_telemetry_power,
            "Control loop stopped"
        );
        self.stats
    }

    async fn turn(&mut self) {
        let top_speed = self.top_speed.top_speed().await;

        let speed = match self.listener.recv_speed(self.recv_timeout).await {
            Ok(Some(speed)) => speed,
            Ok(None) => {
                trace!("No telemetry within receive timeout");
                self.stats.idle_turns += 1;
                return;
            }
            Err(e) => {
                let e = VentusError::from(e);
                warn!(category = %e.category(), severity = %e.severity(), "{e}");
                self.stats.receive_errors += 1;
                return;
            }
        };

        let sample = PowerSample::compute(speed, top_speed, self.curve);
        debug!(
            speed_mph = sample.speed_mph,
            top_speed_mph = sample.top_speed_mph,
            reference_wind_mph = ?sample.reference_wind_mph,
            real_wind_equivalent_mph = ?sample.real_wind_equivalent_mph,
            power_percent = sample.power_percent,
            "Power sample"
        );

        self.stats.samples += 1;
        match self.actuator.write_percent(sample.power_percent) {
            Ok(()) => {
                self.stats.last_power = Some(sample.power_percent);
                self.stats.last_telemetry_power = Some(sample.power_percent);
            }
            Err(e) => {
                let e = VentusError::from(e);
                error!(
                    category = %e.category(),
                    severity = %e.severity(),
                    "Failed to write motor power: {e}"
                );
                self.stats.actuator_errors += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::UdpSocket;
    use tokio::sync::oneshot;
    use ventus_actuator::RecordingSink;
    use ventus_settings::{
        FixedTopSpeed, PollConfig, PolledTopSpeed, SharedTopSpeed, TopSpeedBounds, TopSpeedCell,
    };
    use ventus_telemetry::SpeedConvention;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    async fn wait_for_samples(recorder: &RecordingSink, count: usize) -> TestResult {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while recorder.history().len() < count {
            if tokio::time::Instant::now() > deadline {
                return Err(format!("only {} samples recorded", recorder.history().len()).into());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_samples_drive_actuator_then_zero() -> TestResult {
        let listener = TelemetryListener::bind(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            SpeedConvention::Magnitude,
        )
        .await?;
        let target = listener.local_addr()?;
        let recorder = RecordingSink::new();
        let controller = Controller::new(
            listener,
            FixedTopSpeed(150.0),
            recorder.clone(),
            PowerCurve::Linear,
            Duration::from_millis(20),
        );

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(controller.run(async move {
            stop_rx.await.unwrap_or_default();
        }));

        let sender = UdpSocket::bind("127.0.0.1:0").await?;
        // 33.528 m/s is 75 mph with 2.237 mph per m/s (to within rounding).
        sender.send_to(br#"{"vel":[0,33.528,0]}"#, target).await?;
        wait_for_samples(&recorder, 1).await?;
        sender.send_to(b"garbage", target).await?;
        wait_for_samples(&recorder, 2).await?;

        if stop_tx.send(()).is_err() {
            return Err("controller stopped early".into());
        }
        let stats = task.await?;

        let history = recorder.history();
        assert_eq!(history.len(), 3);
        let first = history.first().copied().ok_or("missing first sample")?;
        assert!((first - 50.0).abs() < 0.1, "first sample {first}");
        assert!(history.iter().skip(1).all(|v| v.abs() < f32::EPSILON));
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.last_power, Some(0.0));
        // The garbage datagram decodes to 0 mph.
        assert_eq!(stats.last_telemetry_power, Some(0.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_idle_loop_holds_output_and_stops() -> TestResult {
        let listener = TelemetryListener::bind(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            SpeedConvention::default(),
        )
        .await?;
        let recorder = RecordingSink::new();
        let controller = Controller::new(
            listener,
            FixedTopSpeed(150.0),
            recorder.clone(),
            PowerCurve::default(),
            Duration::from_millis(10),
        );

        let stats = controller
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await;
        assert!(stats.idle_turns > 0);
        assert_eq!(stats.samples, 0);
        // Only the shutdown write.
        assert_eq!(recorder.history().len(), 1);
        assert_eq!(stats.last_power, Some(0.0));
        assert_eq!(stats.last_telemetry_power, None);
        Ok(())
    }

    /// 20 m/s along the forward axis, 44.74 mph.
    const FORWARD_20_MS: &[u8] = br#"{"vel":[0,20,0]}"#;
    const RECV_TIMEOUT: Duration = Duration::from_millis(20);

    struct Running {
        target: SocketAddr,
        sender: UdpSocket,
        stop: oneshot::Sender<()>,
        task: tokio::task::JoinHandle<LoopStats>,
    }

    impl Running {
        async fn start<S: TopSpeedSource + 'static>(
            top_speed: S,
            recorder: &RecordingSink,
        ) -> Result<Self, Box<dyn std::error::Error>> {
            let listener = TelemetryListener::bind(
                SocketAddr::from(([127, 0, 0, 1], 0)),
                SpeedConvention::default(),
            )
            .await?;
            let target = listener.local_addr()?;
            let controller = Controller::new(
                listener,
                top_speed,
                recorder.clone(),
                PowerCurve::default(),
                RECV_TIMEOUT,
            );
            let (stop, stop_rx) = oneshot::channel::<()>();
            let task = tokio::spawn(controller.run(async move {
                stop_rx.await.unwrap_or_default();
            }));
            Ok(Self {
                target,
                sender: UdpSocket::bind("127.0.0.1:0").await?,
                stop,
                task,
            })
        }

        async fn send_forward_20(&self) -> Result<(), std::io::Error> {
            self.sender.send_to(FORWARD_20_MS, self.target).await?;
            Ok(())
        }

        async fn stop(self) -> Result<LoopStats, Box<dyn std::error::Error>> {
            if self.stop.send(()).is_err() {
                return Err("controller stopped early".into());
            }
            Ok(self.task.await?)
        }
    }

    fn assert_power(history: &[f32], index: usize, expected: f32) -> TestResult {
        let value = history.get(index).copied().ok_or("missing sample")?;
        assert!((value - expected).abs() < 0.05, "sample {index} was {value}, expected {expected}");
        Ok(())
    }

    #[tokio::test]
    async fn test_settings_change_applies_to_next_sample() -> TestResult {
        let cell = TopSpeedCell::new(150, TopSpeedBounds::default())?;
        let recorder = RecordingSink::new();
        let running = Running::start(SharedTopSpeed::new(cell.clone()), &recorder).await?;

        running.send_forward_20().await?;
        wait_for_samples(&recorder, 1).await?;

        cell.set(100)?;
        // Let the turn that read 150 run out before sending again.
        tokio::time::sleep(RECV_TIMEOUT * 5).await;
        running.send_forward_20().await?;
        wait_for_samples(&recorder, 2).await?;

        let stats = running.stop().await?;
        let history = recorder.history();
        assert_power(&history, 0, 29.83)?;
        assert_power(&history, 1, 44.74)?;
        assert_eq!(stats.samples, 2);
        let last = stats.last_telemetry_power.ok_or("no telemetry power")?;
        assert!((last - 44.74).abs() < 0.05);
        assert_eq!(stats.last_power, Some(0.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_polled_change_applies_to_next_sample() -> TestResult {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_top_speed_api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 150 })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get_top_speed_api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 100 })))
            .mount(&mock_server)
            .await;

        let interval = Duration::from_millis(300);
        let poller = PolledTopSpeed::new(
            PollConfig::new(format!("{}/get_top_speed_api", mock_server.uri())).with_interval(interval),
            70.0,
        )?;
        let recorder = RecordingSink::new();
        let running = Running::start(poller, &recorder).await?;

        running.send_forward_20().await?;
        wait_for_samples(&recorder, 1).await?;

        // Past the next poll, which reports 100.
        tokio::time::sleep(interval + RECV_TIMEOUT * 10).await;
        running.send_forward_20().await?;
        wait_for_samples(&recorder, 2).await?;

        running.stop().await?;
        let history = recorder.history();
        assert_power(&history, 0, 29.83)?;
        assert_power(&history, 1, 44.74)?;
        Ok(())
    }
}
