//! Core coordinate utilities shared by the rings, layers and camera modules.

pub mod coordinates;
pub mod space;

pub use coordinates::{CartesianPoint, Ellipsoid, GeodeticPoint, GeodeticTransform};
