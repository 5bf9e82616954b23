use derive_more::Display;
use serde::Serialize;

/// Geodetic, WGS-84 coordinates
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Display, Serialize)]
#[display(
    fmt = "{{lat: {:.4}, lon: {:.4}, alt: {:.3}}}",
    "latitude",
    "longitude",
    "altitude"
)]
pub struct GeodeticPosition {
    /// [deg], in [-90, 90]
    pub latitude: f64,

    /// [deg], in [-180, 180]
    pub longitude: f64,

    /// Height above the ellipsoid [km]
    pub altitude: f64,
}

impl GeodeticPosition {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Wrap a longitude into [-180, 180] degrees
pub fn normalize_longitude(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}
