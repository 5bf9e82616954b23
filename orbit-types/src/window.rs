use derive_more::Display;
use serde::Serialize;

/// A circular-ish angular search window around a point
#[derive(Copy, Clone, PartialEq, Debug, Display, Serialize)]
#[display(
    fmt = "{{lat: {}, lon: {}, radius: {}}}",
    "latitude",
    "longitude",
    "radius"
)]
pub struct QueryWindow {
    latitude: f64,
    longitude: f64,
    radius: f64,
}

#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Window latitude {0} is outside of [-90, 90] degrees")]
    Latitude(f64),

    #[error("Window longitude {0} is outside of [-180, 180] degrees")]
    Longitude(f64),

    #[error("Window radius {0} must be finite and non-negative")]
    Radius(f64),
}

impl QueryWindow {
    /// Center latitude and longitude and the radius, all in degrees
    pub fn new(latitude: f64, longitude: f64, radius: f64) -> Result<Self, WindowError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(WindowError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(WindowError::Longitude(longitude));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(WindowError::Radius(radius));
        }
        Ok(Self {
            latitude,
            longitude,
            radius,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}
