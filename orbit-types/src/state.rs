use crate::time::UtcTimestamp;
use derive_more::Display;

/// Position and velocity in the TEME frame (the ECI frame of SGP4) at an instant
#[derive(Copy, Clone, PartialEq, Debug, Display)]
#[display(fmt = "{{t: {}, pos: {}, vel: {}}}", "timestamp", "position", "velocity")]
pub struct StateVector {
    pub timestamp: UtcTimestamp,

    /// Position [km], expressed in TEME
    pub position: na::Vector3<f64>,

    /// Velocity [km/s], expressed in TEME
    pub velocity: na::Vector3<f64>,
}

impl StateVector {
    pub fn new(
        timestamp: UtcTimestamp,
        position: na::Vector3<f64>,
        velocity: na::Vector3<f64>,
    ) -> Self {
        Self {
            timestamp,
            position,
            velocity,
        }
    }

    /// Distance from the earth's center [km]
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}
