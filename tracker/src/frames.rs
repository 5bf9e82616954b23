//! TEME to earth-fixed and geodetic coordinates.
//!
//! The earth-fixed frame is reached by a single rotation through Greenwich
//! mean sidereal time (IAU-82). Polar motion and the equation of the
//! equinoxes are ignored, which is the precision SGP4 output supports.

use orbit_types::{prelude::*, time::julian_date};
use std::f64::consts::TAU;

/// WGS-84 ellipsoid
pub mod wgs84 {
    /// Semi-major axis [km]
    pub const SEMI_MAJOR_AXIS_KM: f64 = 6378.137;
    pub const FLATTENING: f64 = 1.0 / 298.257_223_563;
    /// First eccentricity squared
    pub const E2: f64 = FLATTENING * (2.0 - FLATTENING);
}

/// Latitude iteration stops once successive iterates differ by less than this [rad]
const LATITUDE_TOLERANCE: f64 = 1.0e-12;
const MAX_LATITUDE_ITERATIONS: usize = 20;

const JD_J2000: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Computed latitude {0} is outside of [-90, 90] degrees")]
    LatitudeOutOfRange(f64),

    #[error("Coordinate transform produced a non-finite value")]
    NonFinite,
}

/// Greenwich mean sidereal time of a UT1 Julian date [rad], in [0, 2pi)
pub fn gstime(jd_ut1: f64) -> f64 {
    let t = (jd_ut1 - JD_J2000) / DAYS_PER_JULIAN_CENTURY;
    let seconds = -6.2e-6 * t * t * t
        + 0.093_104 * t * t
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * t
        + 67_310.548_41;
    // 240 seconds of time per degree
    let gmst = (seconds.to_radians() / 240.0) % TAU;
    if gmst < 0.0 {
        gmst + TAU
    } else {
        gmst
    }
}

/// Greenwich mean sidereal time at an instant [rad], taking UT1 as UTC
pub fn gmst(instant: UtcTimestamp) -> f64 {
    gstime(julian_date(instant))
}

/// Rotate a TEME position into the earth-fixed frame [km]
pub fn teme_to_ecef(state: &StateVector) -> na::Vector3<f64> {
    let rotation = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), -gmst(state.timestamp));
    rotation * state.position
}

/// Geodetic coordinates on the WGS-84 ellipsoid of an earth-fixed position [km]
pub fn ecef_to_geodetic(ecef: na::Vector3<f64>) -> Result<GeodeticPosition, FrameError> {
    use wgs84::{E2, SEMI_MAJOR_AXIS_KM as A};

    if !ecef.iter().all(|c| c.is_finite()) {
        return Err(FrameError::NonFinite);
    }
    let (x, y, z) = (ecef.x, ecef.y, ecef.z);
    let rxy = x.hypot(y);
    let longitude = y.atan2(x);

    let prime_vertical = |lat: f64| A / (1.0 - E2 * lat.sin() * lat.sin()).sqrt();
    let mut latitude = z.atan2(rxy * (1.0 - E2));
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let n = prime_vertical(latitude);
        let next = (z + n * E2 * latitude.sin()).atan2(rxy);
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < LATITUDE_TOLERANCE {
            break;
        }
    }

    let (sin_lat, cos_lat) = latitude.sin_cos();
    let n = prime_vertical(latitude);
    let altitude = rxy * cos_lat + (z + E2 * n * sin_lat) * sin_lat - n;

    let latitude = latitude.to_degrees();
    let longitude = normalize_longitude(longitude.to_degrees());
    if !latitude.is_finite() || !longitude.is_finite() || !altitude.is_finite() {
        return Err(FrameError::NonFinite);
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(FrameError::LatitudeOutOfRange(latitude));
    }
    Ok(GeodeticPosition::new(latitude, longitude, altitude))
}

/// Geodetic position of a TEME state vector at its own instant
pub fn to_geodetic(state: &StateVector) -> Result<GeodeticPosition, FrameError> {
    ecef_to_geodetic(teme_to_ecef(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn utc(s: &str) -> UtcTimestamp {
        s.parse().unwrap()
    }

    #[test]
    fn sidereal_time_at_j2000() {
        assert_relative_eq!(gstime(JD_J2000).to_degrees(), 280.460_618_375, epsilon = 1e-6);
        assert_relative_eq!(
            gmst(utc("2000-01-01T12:00:00Z")).to_degrees(),
            280.460_618_375,
            epsilon = 1e-6
        );
    }

    #[test]
    fn sidereal_time_is_wrapped() {
        for jd in [2_400_000.5, 2_451_545.0, 2_460_000.25, 2_470_000.75] {
            let g = gstime(jd);
            assert!((0.0..TAU).contains(&g), "{g}");
        }
    }

    #[test]
    fn ecef_rotation_preserves_radius_and_z() {
        let state = StateVector::new(
            utc("2024-03-01T06:00:00Z"),
            na::Vector3::new(7000.0, -1200.0, 300.0),
            na::Vector3::new(1.0, 7.0, 0.5),
        );
        let ecef = teme_to_ecef(&state);
        assert_relative_eq!(ecef.norm(), state.position.norm(), epsilon = 1e-9);
        assert_relative_eq!(ecef.z, state.position.z);
    }

    #[test]
    fn equator_and_poles() {
        let p = ecef_to_geodetic(na::Vector3::new(wgs84::SEMI_MAJOR_AXIS_KM + 500.0, 0.0, 0.0))
            .unwrap();
        assert_relative_eq!(p.latitude, 0.0);
        assert_relative_eq!(p.longitude, 0.0);
        assert_relative_eq!(p.altitude, 500.0, epsilon = 1e-9);

        let b = wgs84::SEMI_MAJOR_AXIS_KM * (1.0 - wgs84::FLATTENING);
        let p = ecef_to_geodetic(na::Vector3::new(0.0, 0.0, -(b + 100.0))).unwrap();
        assert_relative_eq!(p.latitude, -90.0);
        assert_relative_eq!(p.altitude, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn longitude_on_the_antimeridian() {
        let p = ecef_to_geodetic(na::Vector3::new(-7000.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(p.longitude.abs(), 180.0);
        let p = ecef_to_geodetic(na::Vector3::new(-7000.0, -1.0e-9, 0.0)).unwrap();
        assert!(p.longitude < -179.9);
    }

    #[test]
    fn non_finite_input() {
        assert_eq!(
            ecef_to_geodetic(na::Vector3::new(f64::NAN, 0.0, 0.0)),
            Err(FrameError::NonFinite)
        );
        assert_eq!(
            ecef_to_geodetic(na::Vector3::new(f64::INFINITY, 1.0, 0.0)),
            Err(FrameError::NonFinite)
        );
    }

    #[test]
    fn matches_nav_types() {
        for (x, y, z) in [
            (4083.9, -993.6, 5243.6),
            (-38226.9, 17705.5, 1607.5),
            (-1200.0, 6500.0, -2500.0),
        ] {
            let ours = ecef_to_geodetic(na::Vector3::new(x, y, z)).unwrap();
            let theirs = nav_types::WGS84::from(nav_types::ECEF::new(x * 1e3, y * 1e3, z * 1e3));
            assert_relative_eq!(ours.latitude, theirs.latitude_degrees(), epsilon = 1e-5);
            assert_relative_eq!(ours.longitude, theirs.longitude_degrees(), epsilon = 1e-5);
            assert_relative_eq!(ours.altitude, theirs.altitude() / 1e3, epsilon = 1e-2);
        }
    }
}
