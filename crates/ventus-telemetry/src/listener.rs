//! Async UDP listener producing one speed reading per datagram.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::convention::{SpeedConvention, decode_speed_mph};
use crate::error::TelemetryError;
use crate::{DEFAULT_TELEMETRY_PORT, MAX_DATAGRAM_SIZE};

/// Telemetry socket bound for the lifetime of the control loop.
///
/// The socket closes when the listener is dropped.
#[derive(Debug)]
pub struct TelemetryListener {
    socket: UdpSocket,
    convention: SpeedConvention,
    buf: Box<[u8; MAX_DATAGRAM_SIZE]>,
}

impl TelemetryListener {
    /// Default listen address, all interfaces on port 4444.
    pub const fn default_addr() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_TELEMETRY_PORT))
    }

    /// Bind the telemetry socket.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Bind`] naming the address if the socket
    /// cannot be bound, and [`TelemetryError::InvalidConvention`] if the
    /// convention does not validate.
    pub async fn bind(addr: SocketAddr, convention: SpeedConvention) -> Result<Self, TelemetryError> {
        convention.validate()?;
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TelemetryError::Bind { addr, source })?;
        let local = socket.local_addr().unwrap_or(addr);
        info!(%local, %convention, "Telemetry listener bound");
        Ok(Self {
            socket,
            convention,
            buf: Box::new([0u8; MAX_DATAGRAM_SIZE]),
        })
    }

    /// Address the socket is actually bound to (resolves port 0).
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Receive`] if the OS cannot report the address.
    pub fn local_addr(&self) -> Result<SocketAddr, TelemetryError> {
        self.socket.local_addr().map_err(TelemetryError::Receive)
    }

    /// Convention used to reduce velocity to speed.
    pub fn convention(&self) -> SpeedConvention {
        self.convention
    }

    /// Wait at most `timeout` for one datagram and decode it to mph.
    ///
    /// Returns `Ok(None)` when nothing arrived in time. A malformed datagram
    /// is still a sample and yields `Ok(Some(0.0))`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Receive`] if the socket reports an error.
    /// Callers treat this as transient.
    pub async fn recv_speed(&mut self, timeout: Duration) -> Result<Option<f32>, TelemetryError> {
        let received = tokio::time::timeout(timeout, self.socket.recv(self.buf.as_mut_slice())).await;
        match received {
            Ok(Ok(len)) => {
                let payload = self.buf.get(..len).unwrap_or_default();
                let speed = decode_speed_mph(payload, self.convention);
                debug!(len, speed_mph = speed, "Telemetry sample");
                Ok(Some(speed))
            }
            Ok(Err(e)) => Err(TelemetryError::Receive(e)),
            Err(_elapsed) => Ok(None),
        }
    }
}
