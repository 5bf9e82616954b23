pub extern crate nalgebra as na;

pub mod batch;
pub mod config;
pub mod filter;
pub mod frames;
pub mod report;
pub mod sgp4;
pub mod source;

pub use batch::{compute_batch, BatchOptions, BatchOutput, NamedPosition};
pub use filter::filter_by_window;
pub use frames::to_geodetic;
pub use sgp4::{propagate, Propagator};
