//! Navigation geometry
//!
//! Great-circle helpers shared by the path resolver and the statistics engine.

pub mod geo;

pub use geo::{calculate_distance, item_distance, GeoPoint, EARTH_RADIUS_M};
