//! Synthetic BeamNG telemetry.
//!
//! Every tick picks a speed uniformly in `[0, max_speed]` mph and sends it as
//! the forward (y) velocity component, the same shape the game emits.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tokio::net::UdpSocket;
use tracing::{debug, info};
use ventus_telemetry::{MPH_TO_MPS, VelocityVector, encode_packet};

use crate::commands::{GenerateArgs, make_rng};

/// Highest speed the generator picks by default (mph).
pub const DEFAULT_MAX_SPEED_MPH: f32 = 200.0;

/// Forward velocity datagram for `speed_mph`.
pub fn forward_packet(speed_mph: f32) -> Vec<u8> {
    encode_packet(VelocityVector::new(0.0, speed_mph * MPH_TO_MPS, 0.0))
}

/// Sends datagrams to a fixed target until stopped.
#[derive(Debug)]
pub struct TelemetryGenerator<R> {
    socket: UdpSocket,
    target: SocketAddr,
    max_speed_mph: f32,
    rng: R,
}

impl<R: Rng> TelemetryGenerator<R> {
    pub async fn connect(target: SocketAddr, max_speed_mph: f32, rng: R) -> Result<Self> {
        anyhow::ensure!(
            max_speed_mph.is_finite() && max_speed_mph >= 0.0,
            "max speed must be a non-negative number, got {max_speed_mph}"
        );
        let local = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0);
        let socket = UdpSocket::bind(local)
            .await
            .context("Failed to open UDP socket")?;
        Ok(Self {
            socket,
            target,
            max_speed_mph,
            rng,
        })
    }

    /// Send one datagram and return the speed it carries.
    pub async fn send_one(&mut self) -> Result<f32> {
        let speed_mph = self.rng.random_range(0.0..=self.max_speed_mph);
        let payload = forward_packet(speed_mph);
        self.socket
            .send_to(&payload, self.target)
            .await
            .with_context(|| format!("Failed to send telemetry to {}", self.target))?;
        debug!(bytes = payload.len(), "Sent datagram");
        Ok(speed_mph)
    }

    /// Send every `interval` until `count` datagrams went out or `shutdown`
    /// resolves. Returns the number sent.
    pub async fn run(
        &mut self,
        interval: Duration,
        count: Option<u64>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<u64> {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);
        let mut sent = 0_u64;

        while count.is_none_or(|limit| sent < limit) {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let speed_mph = self.send_one().await?;
                    sent += 1;
                    info!("Sent: speed {speed_mph:.2} mph to {}", self.target);
                }
            }
        }
        Ok(sent)
    }
}

pub async fn execute(args: &GenerateArgs, shutdown: impl Future<Output = ()>) -> Result<()> {
    let mut generator =
        TelemetryGenerator::connect(args.target, args.max_speed, make_rng(args.seed)).await?;
    info!(
        target = %args.target,
        interval_ms = args.interval_ms,
        "Telemetry generator started, press Ctrl+C to stop"
    );
    let sent = generator
        .run(Duration::from_millis(args.interval_ms), args.count, shutdown)
        .await?;
    info!(sent, "Telemetry generator stopped");
    Ok(())
}
