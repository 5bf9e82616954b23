//! Propagation of well known element sets against published reference vectors

use approx::assert_relative_eq;
use orbit_types::prelude::*;
use tracker_lib::{
    frames::to_geodetic,
    sgp4::{orbit_model, OrbitModel, PropagationFailure, Propagator},
};

const CATALOG: &str = include_str!("../test_fixtures/batch.txt");

fn object(id: u32) -> TrackedObject {
    let out = tle_parser::parse(CATALOG);
    assert!(out.failures.is_empty(), "{:?}", out.failures);
    out.objects
        .into_iter()
        .find(|o| o.catalog_id().get() == id)
        .unwrap()
}

fn propagator(id: u32) -> Propagator {
    Propagator::new(&object(id).elements).unwrap()
}

fn assert_position(p: &Propagator, tsince: f64, expected: [f64; 3], epsilon: f64) {
    let (r, v) = p.propagate_minutes(tsince).unwrap();
    for i in 0..3 {
        assert_relative_eq!(r[i], expected[i], epsilon = epsilon);
    }
    assert!(v.iter().all(|x| x.is_finite()));
}

#[test]
fn near_earth_reference_vectors() {
    let vanguard = propagator(5);
    assert_eq!(vanguard.model(), OrbitModel::NearEarth);
    assert_position(&vanguard, 720.0, [-7134.59340119, 6531.68641334, 3260.27186483], 1e-3);
    assert_position(&vanguard, 1440.0, [-938.55923943, -6268.18748831, -4294.02924751], 1e-3);

    let debris = propagator(6251);
    assert_eq!(debris.model(), OrbitModel::NearEarth);
    assert_position(&debris, 720.0, [3692.60030028, -976.24265255, -5623.36447493], 1e-3);
    assert_position(&debris, 1440.0, [-2777.14682335, -5663.16031708, -2462.54889123], 1e-3);

    let iss = propagator(25544);
    assert_position(&iss, 0.0, [4083.90246352, -993.63199961, 5243.60366537], 1e-3);
    assert_position(&iss, 720.0, [832.51332926, -5440.63667382, 3865.86353890], 1e-3);
}

#[test]
fn deep_space_reference_vectors() {
    let unnamed = propagator(11801);
    assert_eq!(unnamed.model(), OrbitModel::DeepSpace);
    assert_position(&unnamed, 0.0, [7473.37102491, 428.94748312, 5828.74846783], 1e-2);
    assert_position(&unnamed, 720.0, [14271.29083858, 24110.44309009, -4725.76320143], 1e-2);
    assert_position(&unnamed, 1440.0, [9787.87836256, 33753.32249667, -15030.79874625], 1e-2);

    let geo = propagator(37481);
    assert_eq!(geo.model(), OrbitModel::DeepSpace);
    assert_position(&geo, 0.0, [-38226.86643626, 17705.52466566, 1607.53182213], 1e-2);
    assert_position(&geo, 720.0, [38379.69710459, -17397.79635332, -1601.98643824], 1e-2);

    let molniya = propagator(9880);
    assert_eq!(molniya.model(), OrbitModel::DeepSpace);
    assert_position(&molniya, 0.0, [13020.06750784, -2449.07193500, 1.15896030], 1e-2);
    assert_position(&molniya, 1440.0, [14369.90303735, -1903.85601062, 1722.15319852], 1e-2);
}

#[test]
fn model_selection_matches_initialization() {
    for obj in tle_parser::parse(CATALOG).objects {
        let Ok(p) = Propagator::new(&obj.elements) else {
            continue;
        };
        assert_eq!(orbit_model(&obj.elements), p.model(), "{}", obj.label());
    }
    assert_eq!(orbit_model(&object(37481).elements), OrbitModel::DeepSpace);
    assert_eq!(orbit_model(&object(25544).elements), OrbitModel::NearEarth);
}

#[test]
fn state_at_uses_elapsed_time_since_epoch() {
    let iss = propagator(25544);
    let state = iss.state_at(iss.epoch()).unwrap();
    assert_eq!(state.timestamp, iss.epoch());
    let (r, v) = iss.propagate_minutes(0.0).unwrap();
    assert_eq!(state.position, r);
    assert_eq!(state.velocity, v);
    assert_relative_eq!(state.radius(), r.norm());
    assert!(iss.semi_major_axis() > 1.0);
    assert!(iss.mean_motion() > 0.0);
}

#[test]
fn geodetic_at_epoch() {
    let cases = [
        (5, 0.000322, 149.955736, 782.536928),
        (6251, 0.007644, -156.443416, 414.892710),
        (11801, 38.031548, -69.201338, 3117.286751),
    ];
    for (id, lat, lon, alt) in cases {
        let p = propagator(id);
        let geo = to_geodetic(&p.state_at(p.epoch()).unwrap()).unwrap();
        assert_relative_eq!(geo.latitude, lat, epsilon = 1e-4);
        assert_relative_eq!(geo.longitude, lon, epsilon = 1e-4);
        assert_relative_eq!(geo.altitude, alt, epsilon = 1e-2);
    }

    let p = propagator(5);
    let geo = to_geodetic(&p.state_at(p.epoch() + chrono::Duration::minutes(360)).unwrap()).unwrap();
    assert_relative_eq!(geo.latitude, -23.705347, epsilon = 1e-4);
    assert_relative_eq!(geo.longitude, -81.144676, epsilon = 1e-4);
    assert_relative_eq!(geo.altitude, 2456.906202, epsilon = 1e-2);
}

#[test]
fn decayed_orbit() {
    let p = propagator(90001);
    assert_eq!(p.propagate_minutes(0.0), Err(PropagationFailure::Decayed));
}

#[test]
fn semi_major_axis_below_limit() {
    let obj = object(90002);
    assert_eq!(
        Propagator::new(&obj.elements),
        Err(PropagationFailure::InvalidSemiMajorAxis)
    );
}

#[test]
fn zero_mean_motion() {
    let mut raw = object(25544).elements.raw().clone();
    raw.mean_motion = 0.0;
    let elements = ElementSet::try_from(raw).unwrap();
    assert_eq!(
        Propagator::new(&elements),
        Err(PropagationFailure::InvalidSemiMajorAxis)
    );
}

#[test]
fn eccentricity_driven_out_of_range_by_drag() {
    let unnamed = propagator(11801);
    let t = minutes_between(unnamed.epoch(), "2006-06-25T12:00:00Z".parse().unwrap());
    assert_eq!(
        unnamed.propagate_minutes(t),
        Err(PropagationFailure::InvalidEccentricity)
    );
}
