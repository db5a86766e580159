//! Top speed fetched from a remote settings server.
//!
//! The server answers `GET /get_top_speed_api` with `{"top_speed": <number>}`.
//! Polling is fail-soft: a timeout, connection failure, error status or bad
//! body leaves the last good value in effect and is logged at `warn`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::TopSpeedError;
use crate::source::TopSpeedSource;
use crate::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_URL, DEFAULT_REQUEST_TIMEOUT};

/// Where and how often to poll.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Full URL of the query endpoint
    pub url: String,
    /// Minimum time between two poll attempts
    pub interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_POLL_URL.to_string(),
            interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl PollConfig {
    /// Poll `url` with the default interval and timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Fetch and validate the top speed once.
///
/// # Errors
///
/// Returns [`TopSpeedError::Fetch`] for transport failures and error
/// statuses, and [`TopSpeedError::InvalidResponse`] when the body is not JSON
/// or `top_speed` is missing, non-numeric, non-finite or not positive.
pub async fn fetch_top_speed(client: &Client, url: &str) -> Result<f32, TopSpeedError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| TopSpeedError::Fetch(e.to_string()))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| TopSpeedError::InvalidResponse(format!("body is not JSON: {e}")))?;

    let value = body
        .get("top_speed")
        .ok_or_else(|| TopSpeedError::InvalidResponse("missing top_speed".to_string()))?;
    let number = value.as_f64().ok_or_else(|| {
        TopSpeedError::InvalidResponse(format!("top_speed is not a number: {value}"))
    })?;

    #[allow(clippy::cast_possible_truncation)]
    let top_speed = number as f32;
    if !top_speed.is_finite() || top_speed <= 0.0 {
        return Err(TopSpeedError::InvalidResponse(format!(
            "top_speed must be a positive number, got {number}"
        )));
    }
    Ok(top_speed)
}

/// Top speed cached from a remote settings server.
///
/// The first read polls immediately; later reads poll only once the interval
/// has elapsed since the previous attempt, whether it succeeded or not. A
/// read therefore waits at most one request timeout.
#[derive(Debug)]
pub struct PolledTopSpeed {
    client: Client,
    config: PollConfig,
    current: f32,
    last_attempt: Option<Instant>,
}

impl PolledTopSpeed {
    /// Create a poller that reports `initial` until the first successful poll.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::Client`] if the HTTP client cannot be built.
    pub fn new(config: PollConfig, initial: f32) -> Result<Self, TopSpeedError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("ventus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TopSpeedError::Client(e.to_string()))?;
        Ok(Self {
            client,
            config,
            current: initial,
            last_attempt: None,
        })
    }

    /// Last accepted value, without polling.
    pub fn cached(&self) -> f32 {
        self.current
    }

    /// Whether the next read will poll.
    pub fn is_due(&self) -> bool {
        self.last_attempt
            .is_none_or(|last| last.elapsed() >= self.config.interval)
    }

    /// Poll now regardless of the interval and update the cache on success.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the cached value is unchanged in that case.
    pub async fn refresh(&mut self) -> Result<f32, TopSpeedError> {
        self.last_attempt = Some(Instant::now());
        let fetched = fetch_top_speed(&self.client, &self.config.url).await?;
        if (fetched - self.current).abs() > f32::EPSILON {
            info!(
                previous = self.current,
                top_speed = fetched,
                "Top speed updated from settings server"
            );
        }
        self.current = fetched;
        Ok(fetched)
    }
}

#[async_trait]
impl TopSpeedSource for PolledTopSpeed {
    async fn top_speed(&mut self) -> f32 {
        if self.is_due() {
            match self.refresh().await {
                Ok(value) => debug!(top_speed = value, "Polled top speed"),
                Err(e) => warn!(
                    url = %self.config.url,
                    retained = self.current,
                    "Keeping previous top speed: {e}"
                ),
            }
        }
        self.current
    }

    fn describe(&self) -> String {
        format!("polled {} every {:?}", self.config.url, self.config.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    async fn server_returning(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_top_speed_api"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn api_url(server: &MockServer) -> String {
        format!("{}/get_top_speed_api", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_accepts_positive_number() -> TestResult {
        let mock_server = server_returning(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 120 })),
        )
        .await;

        let value = fetch_top_speed(&Client::new(), &api_url(&mock_server)).await?;
        assert!((value - 120.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_accepts_fractional_value() -> TestResult {
        let mock_server = server_returning(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 87.5 })),
        )
        .await;

        let value = fetch_top_speed(&Client::new(), &api_url(&mock_server)).await?;
        assert!((value - 87.5).abs() < f32::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_values() -> TestResult {
        let bodies = [
            serde_json::json!({ "top_speed": -5 }),
            serde_json::json!({ "top_speed": 0 }),
            serde_json::json!({ "top_speed": "fast" }),
            serde_json::json!({ "top_speed": null }),
            serde_json::json!({ "speed": 120 }),
        ];
        for body in bodies {
            let mock_server = server_returning(ResponseTemplate::new(200).set_body_json(&body)).await;
            let result = fetch_top_speed(&Client::new(), &api_url(&mock_server)).await;
            assert!(
                matches!(result, Err(TopSpeedError::InvalidResponse(_))),
                "body {body} gave {result:?}"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_error_status() -> TestResult {
        let mock_server = server_returning(ResponseTemplate::new(500)).await;
        let result = fetch_top_speed(&Client::new(), &api_url(&mock_server)).await;
        assert!(matches!(result, Err(TopSpeedError::Fetch(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_non_json_body() -> TestResult {
        let mock_server =
            server_returning(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
        let result = fetch_top_speed(&Client::new(), &api_url(&mock_server)).await;
        assert!(matches!(result, Err(TopSpeedError::InvalidResponse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_value_keeps_cached() -> TestResult {
        let mock_server = server_returning(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": -5 })),
        )
        .await;

        let mut source = PolledTopSpeed::new(PollConfig::new(api_url(&mock_server)), 150.0)?;
        assert!((source.top_speed().await - 150.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_valid_value_updates_cache() -> TestResult {
        let mock_server = server_returning(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 120 })),
        )
        .await;

        let mut source = PolledTopSpeed::new(PollConfig::new(api_url(&mock_server)), 150.0)?;
        assert!((source.top_speed().await - 120.0).abs() < f32::EPSILON);
        assert!((source.cached() - 120.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_polls_at_most_once_per_interval() -> TestResult {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_top_speed_api"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 90 })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = PollConfig::new(api_url(&mock_server)).with_interval(Duration::from_secs(60));
        let mut source = PolledTopSpeed::new(config, 150.0)?;
        for _ in 0..5 {
            assert!((source.top_speed().await - 90.0).abs() < f32::EPSILON);
        }
        assert!(!source.is_due());
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_interval_polls_every_read() -> TestResult {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_top_speed_api"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "top_speed": 90 })),
            )
            .expect(3)
            .mount(&mock_server)
            .await;

        let config = PollConfig::new(api_url(&mock_server)).with_interval(Duration::ZERO);
        let mut source = PolledTopSpeed::new(config, 150.0)?;
        for _ in 0..3 {
            source.top_speed().await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_server_times_out_and_keeps_value() -> TestResult {
        let mock_server = server_returning(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "top_speed": 200 }))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let config = PollConfig::new(api_url(&mock_server))
            .with_request_timeout(Duration::from_millis(100));
        let mut source = PolledTopSpeed::new(config, 150.0)?;

        let started = std::time::Instant::now();
        let value = source.top_speed().await;
        assert!((value - 150.0).abs() < f32::EPSILON);
        assert!(started.elapsed() < Duration::from_secs(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_value() -> TestResult {
        // Port 9 (discard) on loopback is not expected to run an HTTP server.
        let config = PollConfig::new("http://127.0.0.1:9/get_top_speed_api")
            .with_request_timeout(Duration::from_millis(200));
        let mut source = PolledTopSpeed::new(config, 70.0)?;
        assert!((source.top_speed().await - 70.0).abs() < f32::EPSILON);
        Ok(())
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failed_poll_logs_warning() -> TestResult {
        let mock_server = server_returning(ResponseTemplate::new(503)).await;
        let mut source = PolledTopSpeed::new(PollConfig::new(api_url(&mock_server)), 150.0)?;
        source.top_speed().await;
        assert!(logs_contain("Keeping previous top speed"));
        Ok(())
    }
}
