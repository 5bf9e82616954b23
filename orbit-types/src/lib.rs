extern crate nalgebra as na;

pub mod catalog;
pub mod elements;
pub mod geodetic;
pub mod prelude;
pub mod state;
pub mod time;
pub mod tracked;
pub mod window;
