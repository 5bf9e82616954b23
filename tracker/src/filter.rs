//! Selection of positions inside a latitude/longitude box around a point.
//!
//! The box spans `radius` degrees either side of the center on both axes.
//! Latitude is clamped at the poles while longitude wraps across the
//! antimeridian.

use crate::batch::NamedPosition;
use orbit_types::prelude::*;
use regex::Regex;
use std::ops::RangeInclusive;

/// Longitudes covered by a window [deg]
#[derive(Clone, PartialEq, Debug)]
pub enum LongitudeRange {
    Full,
    Single(RangeInclusive<f64>),
    /// A range crossing ±180, as its eastern and western parts
    Split(RangeInclusive<f64>, RangeInclusive<f64>),
}

impl LongitudeRange {
    pub fn new(center: f64, radius: f64) -> Self {
        if radius >= 180.0 {
            return LongitudeRange::Full;
        }
        let (lo, hi) = (center - radius, center + radius);
        if lo < -180.0 {
            LongitudeRange::Split(lo + 360.0..=180.0, -180.0..=hi)
        } else if hi > 180.0 {
            LongitudeRange::Split(lo..=180.0, -180.0..=hi - 360.0)
        } else {
            LongitudeRange::Single(lo..=hi)
        }
    }

    pub fn contains(&self, longitude: f64) -> bool {
        match self {
            LongitudeRange::Full => true,
            LongitudeRange::Single(r) => r.contains(&longitude),
            LongitudeRange::Split(a, b) => a.contains(&longitude) || b.contains(&longitude),
        }
    }
}

/// The latitude and longitude ranges a window selects
#[derive(Clone, PartialEq, Debug)]
pub struct WindowBounds {
    pub latitude: RangeInclusive<f64>,
    pub longitude: LongitudeRange,
}

impl WindowBounds {
    pub fn new(window: &QueryWindow) -> Self {
        let (lat, r) = (window.latitude(), window.radius());
        Self {
            latitude: (lat - r).max(-90.0)..=(lat + r).min(90.0),
            longitude: LongitudeRange::new(window.longitude(), r),
        }
    }

    pub fn contains(&self, p: &GeodeticPosition) -> bool {
        self.latitude.contains(&p.latitude) && self.longitude.contains(p.longitude)
    }
}

/// The positions inside `window`, in their original order
pub fn filter_by_window(positions: &[NamedPosition], window: &QueryWindow) -> Vec<NamedPosition> {
    let bounds = WindowBounds::new(window);
    positions
        .iter()
        .filter(|p| bounds.contains(&p.position))
        .cloned()
        .collect()
}

/// Objects whose label matches `pattern`
pub fn select_by_name(objects: Vec<TrackedObject>, pattern: &Regex) -> Vec<TrackedObject> {
    objects
        .into_iter()
        .filter(|o| pattern.is_match(&o.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(label: &str, latitude: f64, longitude: f64) -> NamedPosition {
        NamedPosition {
            label: label.to_owned(),
            catalog_id: CatalogId::new(1).unwrap(),
            position: GeodeticPosition::new(latitude, longitude, 550.0),
        }
    }

    fn labels(positions: &[NamedPosition]) -> Vec<&str> {
        positions.iter().map(|p| p.label.as_str()).collect()
    }

    #[test]
    fn longitude_ranges() {
        assert_eq!(LongitudeRange::new(10.0, 5.0), LongitudeRange::Single(5.0..=15.0));
        assert_eq!(
            LongitudeRange::new(179.0, 5.0),
            LongitudeRange::Split(174.0..=180.0, -180.0..=-176.0)
        );
        assert_eq!(
            LongitudeRange::new(-178.0, 4.0),
            LongitudeRange::Split(178.0..=180.0, -180.0..=-174.0)
        );
        assert_eq!(LongitudeRange::new(0.0, 180.0), LongitudeRange::Full);
        assert_eq!(LongitudeRange::new(-180.0, 0.0), LongitudeRange::Single(-180.0..=-180.0));
    }

    #[test]
    fn window_across_the_antimeridian() {
        let window = QueryWindow::new(0.0, 179.0, 5.0).unwrap();
        let positions = [
            at("west", 1.0, -179.0),
            at("east", -1.0, 177.0),
            at("far-west", 0.0, -170.0),
            at("north", 6.0, 179.0),
        ];
        assert_eq!(labels(&filter_by_window(&positions, &window)), ["west", "east"]);
    }

    #[test]
    fn latitude_is_clamped_not_wrapped() {
        let window = QueryWindow::new(88.0, 0.0, 5.0).unwrap();
        let bounds = WindowBounds::new(&window);
        assert_eq!(bounds.latitude, 83.0..=90.0);
        let positions = [at("pole", 90.0, 0.0), at("south", -88.0, 0.0)];
        assert_eq!(labels(&filter_by_window(&positions, &window)), ["pole"]);
    }

    #[test]
    fn wide_radius_covers_every_longitude() {
        let window = QueryWindow::new(0.0, 0.0, 180.0).unwrap();
        let positions = [at("a", 45.0, 180.0), at("b", -45.0, -180.0), at("c", 0.0, 0.0)];
        assert_eq!(filter_by_window(&positions, &window).len(), 3);
    }

    #[test]
    fn filtering_is_idempotent() {
        let window = QueryWindow::new(-10.0, -175.0, 20.0).unwrap();
        let positions: Vec<NamedPosition> = (-8..=4)
            .flat_map(|lat| (-36..36).map(move |lon| (lat as f64 * 5.0, lon as f64 * 5.0)))
            .map(|(lat, lon)| at(&format!("{lat},{lon}"), lat, lon))
            .collect();
        let once = filter_by_window(&positions, &window);
        // Both sides of the seam, -30..=10 latitude in 5 degree steps
        assert!(once.iter().any(|p| p.position.longitude > 0.0));
        assert!(once.iter().any(|p| p.position.longitude < 0.0));
        assert_eq!(once.len(), 9 * 9);
        assert_eq!(filter_by_window(&once, &window), once);
    }

    #[test]
    fn zero_radius_matches_the_center_only() {
        let window = QueryWindow::new(10.0, 20.0, 0.0).unwrap();
        let positions = [at("hit", 10.0, 20.0), at("miss", 10.0, 20.001)];
        assert_eq!(labels(&filter_by_window(&positions, &window)), ["hit"]);
    }
}
