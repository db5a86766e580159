//! Wire format of a telemetry datagram.

use serde::Deserialize;
use tracing::debug;

/// Velocity in m/s along the game's x, y and z axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityVector {
    /// x component (m/s)
    pub x: f32,
    /// y component (m/s), the forward axis for BeamNG vehicles
    pub y: f32,
    /// z component (m/s)
    pub z: f32,
}

impl VelocityVector {
    /// Build a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude in m/s.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Component by index: 0 = x, 1 = y, 2 = z.
    pub fn component(&self, axis: usize) -> Option<f32> {
        match axis {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            _ => None,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Deserialize)]
struct WirePacket {
    vel: Vec<f64>,
}

/// Strictly parse a datagram into a velocity vector.
///
/// Returns `None` when the payload is not UTF-8 JSON, has no `vel` array,
/// has fewer than three numeric components or any of the first three is not
/// finite in `f32`. Components past the third are ignored, as are unknown
/// top-level fields.
pub fn decode_velocity(payload: &[u8]) -> Option<VelocityVector> {
    let packet: WirePacket = match serde_json::from_slice(payload) {
        Ok(packet) => packet,
        Err(e) => {
            debug!(len = payload.len(), "Discarding malformed telemetry packet: {e}");
            return None;
        }
    };

    let [x, y, z, ..] = packet.vel.as_slice() else {
        debug!(
            components = packet.vel.len(),
            "Discarding telemetry packet with short velocity vector"
        );
        return None;
    };

    #[allow(clippy::cast_possible_truncation)]
    let velocity = VelocityVector::new(*x as f32, *y as f32, *z as f32);
    if !velocity.is_finite() {
        debug!("Discarding telemetry packet with non-finite velocity");
        return None;
    }
    Some(velocity)
}

/// Serialize a velocity vector as `{"vel":[x,y,z]}`.
///
/// Non-finite components are written as `null`, which [`decode_velocity`]
/// rejects.
pub fn encode_packet(velocity: VelocityVector) -> Vec<u8> {
    serde_json::json!({ "vel": [velocity.x, velocity.y, velocity.z] })
        .to_string()
        .into_bytes()
}
