pub use crate::catalog::CatalogId;
pub use crate::elements::{Classification, ElementError, ElementSet, RawElements};
pub use crate::geodetic::{normalize_longitude, GeodeticPosition};
pub use crate::state::StateVector;
pub use crate::time::{minutes_between, UtcTimestamp};
pub use crate::tracked::TrackedObject;
pub use crate::window::{QueryWindow, WindowError};
