use serde::Serialize;
use std::{fmt, str::FromStr};

/// NORAD catalog number (AKA satcat ID)
///
/// Numbers above 99999 are written in the Alpha-5 scheme: the leading
/// digit is replaced by a letter, skipping `I` and `O`, so `A0001` is 100001.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct CatalogId(u32);

/// Letters usable as the Alpha-5 leading character, in value order starting at 10
const ALPHA5_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

impl CatalogId {
    pub const MAX: u32 = 339_999;

    pub fn new(id: u32) -> Option<Self> {
        (id <= Self::MAX).then_some(CatalogId(id))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<CatalogId> for u32 {
    fn from(value: CatalogId) -> Self {
        value.0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("Invalid catalog number")]
pub struct InvalidCatalogId;

impl FromStr for CatalogId {
    type Err = InvalidCatalogId;

    /// Parses the 5-column catalog field, leading blanks allowed
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let mut chars = s.chars();
        let first = chars.next().ok_or(InvalidCatalogId)?;
        let rest = chars.as_str();

        if first.is_ascii_digit() {
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InvalidCatalogId);
            }
            let id: u32 = s.parse().map_err(|_| InvalidCatalogId)?;
            return CatalogId::new(id).ok_or(InvalidCatalogId);
        }

        let lead = ALPHA5_LETTERS
            .iter()
            .position(|l| *l as char == first.to_ascii_uppercase())
            .ok_or(InvalidCatalogId)? as u32
            + 10;
        if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidCatalogId);
        }
        let tail: u32 = rest.parse().map_err(|_| InvalidCatalogId)?;
        CatalogId::new(lead * 10_000 + tail).ok_or(InvalidCatalogId)
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 100_000 {
            write!(f, "{:05}", self.0)
        } else {
            let lead = ALPHA5_LETTERS[(self.0 / 10_000 - 10) as usize] as char;
            write!(f, "{}{:04}", lead, self.0 % 10_000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids() {
        assert_eq!("25544".parse::<CatalogId>().unwrap().get(), 25544);
        assert_eq!("    5".parse::<CatalogId>().unwrap().get(), 5);
        assert_eq!(CatalogId::new(5).unwrap().to_string(), "00005");
        assert!("25a44".parse::<CatalogId>().is_err());
        assert!("".parse::<CatalogId>().is_err());
    }

    #[test]
    fn alpha5_ids() {
        assert_eq!("A0001".parse::<CatalogId>().unwrap().get(), 100_001);
        assert_eq!("J0000".parse::<CatalogId>().unwrap().get(), 180_000);
        assert_eq!("Z9999".parse::<CatalogId>().unwrap().get(), 339_999);
        assert!("I0001".parse::<CatalogId>().is_err());
        assert!("O0001".parse::<CatalogId>().is_err());
        assert_eq!(CatalogId::new(270_123).unwrap().to_string(), "T0123");
    }
}
