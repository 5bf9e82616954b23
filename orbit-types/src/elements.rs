use crate::{catalog::CatalogId, time::UtcTimestamp};
use derive_more::Display;
use serde::Serialize;
use std::fmt;

/// Security classification (line 1, column 8)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Serialize)]
pub enum Classification {
    #[display(fmt = "U")]
    Unclassified,
    #[display(fmt = "C")]
    Classified,
    #[display(fmt = "S")]
    Secret,
}

impl Classification {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'U' => Classification::Unclassified,
            'C' => Classification::Classified,
            'S' => Classification::Secret,
            _ => return None,
        })
    }
}

/// Decoded TLE fields, before the element set invariants are checked.
///
/// Angles are in degrees and mean motion in revolutions per day, as written
/// in the TLE. The checksum digits are taken as read: verifying them needs the
/// line text, so only element sets produced by `tle_parser` are known to
/// match their lines. Anything else constructing these is trusted input.
#[derive(Clone, PartialEq, Debug)]
pub struct RawElements {
    pub catalog_id: CatalogId,
    pub classification: Classification,
    pub international_designator: String,
    pub epoch: UtcTimestamp,
    /// First derivative of mean motion divided by two [rev/day^2]
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six [rev/day^3]
    pub mean_motion_ddot: f64,
    /// B* drag term [1/earth radii]
    pub bstar: f64,
    pub ephemeris_type: u8,
    pub element_set_number: u16,
    pub inclination: f64,
    pub right_ascension: f64,
    pub eccentricity: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    pub mean_motion: f64,
    pub revolution_number: u32,
    /// Checksum digit of line 1, 0 to 9
    pub line1_checksum: u8,
    /// Checksum digit of line 2, 0 to 9
    pub line2_checksum: u8,
}

#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum ElementError {
    #[error("Eccentricity {0} is outside of [0, 1)")]
    Eccentricity(f64),

    #[error("Inclination {0} is outside of [0, 180] degrees")]
    Inclination(f64),

    #[error("The '{0}' field is not a finite number")]
    NonFinite(&'static str),

    #[error("Line {line} checksum {digit} is not a single digit")]
    ChecksumDigit { line: u8, digit: u8 },
}

impl ElementError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ElementError::Eccentricity(_) => "eccentricity",
            ElementError::Inclination(_) => "inclination",
            ElementError::NonFinite(f) => f,
            ElementError::ChecksumDigit { .. } => "checksum",
        }
    }
}

/// A validated mean element set.
///
/// Only constructed through `TryFrom<RawElements>`, which enforces
/// eccentricity in [0, 1), inclination in [0, 180] degrees and single digit
/// checksums. See [`RawElements`] for what the checksums guarantee.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(into = "ElementSummary")]
pub struct ElementSet {
    raw: RawElements,
}

impl TryFrom<RawElements> for ElementSet {
    type Error = ElementError;

    fn try_from(raw: RawElements) -> Result<Self, Self::Error> {
        let finite = [
            ("mean_motion_dot", raw.mean_motion_dot),
            ("mean_motion_ddot", raw.mean_motion_ddot),
            ("bstar", raw.bstar),
            ("inclination", raw.inclination),
            ("right_ascension", raw.right_ascension),
            ("eccentricity", raw.eccentricity),
            ("argument_of_perigee", raw.argument_of_perigee),
            ("mean_anomaly", raw.mean_anomaly),
            ("mean_motion", raw.mean_motion),
        ];
        if let Some((name, _)) = finite.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ElementError::NonFinite(name));
        }
        if !(0.0..1.0).contains(&raw.eccentricity) {
            return Err(ElementError::Eccentricity(raw.eccentricity));
        }
        if !(0.0..=180.0).contains(&raw.inclination) {
            return Err(ElementError::Inclination(raw.inclination));
        }
        for (line, digit) in [(1, raw.line1_checksum), (2, raw.line2_checksum)] {
            if digit > 9 {
                return Err(ElementError::ChecksumDigit { line, digit });
            }
        }
        Ok(ElementSet { raw })
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{catalog_id: {}, epoch: {}, incl: {}, ecc: {}, n: {}}}",
            self.raw.catalog_id,
            self.raw.epoch,
            self.raw.inclination,
            self.raw.eccentricity,
            self.raw.mean_motion
        )
    }
}

impl ElementSet {
    pub fn catalog_id(&self) -> CatalogId {
        self.raw.catalog_id
    }

    pub fn classification(&self) -> Classification {
        self.raw.classification
    }

    pub fn international_designator(&self) -> &str {
        &self.raw.international_designator
    }

    pub fn epoch(&self) -> UtcTimestamp {
        self.raw.epoch
    }

    pub fn mean_motion_dot(&self) -> f64 {
        self.raw.mean_motion_dot
    }

    pub fn mean_motion_ddot(&self) -> f64 {
        self.raw.mean_motion_ddot
    }

    pub fn bstar(&self) -> f64 {
        self.raw.bstar
    }

    pub fn ephemeris_type(&self) -> u8 {
        self.raw.ephemeris_type
    }

    pub fn element_set_number(&self) -> u16 {
        self.raw.element_set_number
    }

    /// [deg]
    pub fn inclination(&self) -> f64 {
        self.raw.inclination
    }

    /// Right ascension of the ascending node [deg]
    pub fn right_ascension(&self) -> f64 {
        self.raw.right_ascension
    }

    pub fn eccentricity(&self) -> f64 {
        self.raw.eccentricity
    }

    /// [deg]
    pub fn argument_of_perigee(&self) -> f64 {
        self.raw.argument_of_perigee
    }

    /// [deg]
    pub fn mean_anomaly(&self) -> f64 {
        self.raw.mean_anomaly
    }

    /// Kozai mean motion [rev/day]
    pub fn mean_motion(&self) -> f64 {
        self.raw.mean_motion
    }

    pub fn revolution_number(&self) -> u32 {
        self.raw.revolution_number
    }

    pub fn line1_checksum(&self) -> u8 {
        self.raw.line1_checksum
    }

    pub fn line2_checksum(&self) -> u8 {
        self.raw.line2_checksum
    }

    /// Nominal period from the Kozai mean motion [min]
    pub fn period_minutes(&self) -> f64 {
        crate::time::MINUTES_PER_DAY / self.raw.mean_motion
    }

    /// The decoded fields this set was built from
    pub fn raw(&self) -> &RawElements {
        &self.raw
    }
}

/// Flattened, serializable view of an element set
#[derive(Clone, Debug, Serialize)]
struct ElementSummary {
    catalog_id: CatalogId,
    classification: Classification,
    international_designator: String,
    epoch: UtcTimestamp,
    bstar: f64,
    inclination: f64,
    right_ascension: f64,
    eccentricity: f64,
    argument_of_perigee: f64,
    mean_anomaly: f64,
    mean_motion: f64,
    revolution_number: u32,
}

impl From<ElementSet> for ElementSummary {
    fn from(e: ElementSet) -> Self {
        let r = e.raw;
        ElementSummary {
            catalog_id: r.catalog_id,
            classification: r.classification,
            international_designator: r.international_designator,
            epoch: r.epoch,
            bstar: r.bstar,
            inclination: r.inclination,
            right_ascension: r.right_ascension,
            eccentricity: r.eccentricity,
            argument_of_perigee: r.argument_of_perigee,
            mean_anomaly: r.mean_anomaly,
            mean_motion: r.mean_motion,
            revolution_number: r.revolution_number,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// ISS (ZARYA), 2008-264
    pub(crate) fn iss_raw() -> RawElements {
        RawElements {
            catalog_id: CatalogId::new(25544).unwrap(),
            classification: Classification::Unclassified,
            international_designator: "98067A".to_owned(),
            epoch: "2008-09-20T12:25:40.104192Z".parse().unwrap(),
            mean_motion_dot: -0.00002182,
            mean_motion_ddot: 0.0,
            bstar: -0.11606e-4,
            ephemeris_type: 0,
            element_set_number: 292,
            inclination: 51.6416,
            right_ascension: 247.4627,
            eccentricity: 0.0006703,
            argument_of_perigee: 130.5360,
            mean_anomaly: 325.0288,
            mean_motion: 15.72125391,
            revolution_number: 56353,
            line1_checksum: 7,
            line2_checksum: 7,
        }
    }

    #[test]
    fn valid_elements() {
        let e = ElementSet::try_from(iss_raw()).unwrap();
        assert_eq!(e.catalog_id().get(), 25544);
        assert_eq!(e.international_designator(), "98067A");
        assert_relative_eq!(e.period_minutes(), 91.59575, epsilon = 1e-4);
    }

    #[test]
    fn eccentricity_bounds() {
        let mut raw = iss_raw();
        raw.eccentricity = 1.0;
        assert_eq!(
            ElementSet::try_from(raw.clone()),
            Err(ElementError::Eccentricity(1.0))
        );
        raw.eccentricity = 0.0;
        assert!(ElementSet::try_from(raw).is_ok());
    }

    #[test]
    fn inclination_bounds() {
        let mut raw = iss_raw();
        raw.inclination = 180.0;
        assert!(ElementSet::try_from(raw.clone()).is_ok());
        raw.inclination = 180.5;
        let err = ElementSet::try_from(raw).unwrap_err();
        assert_eq!(err.field(), "inclination");
    }

    #[test]
    fn non_finite_fields() {
        let mut raw = iss_raw();
        raw.bstar = f64::NAN;
        assert_eq!(
            ElementSet::try_from(raw),
            Err(ElementError::NonFinite("bstar"))
        );
    }

    #[test]
    fn checksum_digits() {
        let mut raw = iss_raw();
        raw.line2_checksum = 12;
        let err = ElementSet::try_from(raw.clone()).unwrap_err();
        assert_eq!(err, ElementError::ChecksumDigit { line: 2, digit: 12 });
        assert_eq!(err.field(), "checksum");
        raw.line2_checksum = 9;
        let e = ElementSet::try_from(raw).unwrap();
        assert_eq!(e.line1_checksum(), 7);
        assert_eq!(e.line2_checksum(), 9);
    }
}
