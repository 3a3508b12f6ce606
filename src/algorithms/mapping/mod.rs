//! Mapping module.
//!
//! Static floor-plan model used by localization and planning.
//!
//! # Components
//!
//! - [`OccupancyMap`]: Boundary and obstacle polygons with ray casting
//! - [`Polygon`]: Closed polygon with containment and ray hits
//! - [`MapDescription`]: Serializable floor plan (YAML)

mod description;
mod occupancy_map;
mod polygon;

pub use description::{MapDescription, Rect, Seat};
pub use occupancy_map::{DEFAULT_MAX_RANGE, OccupancyMap, ScanRays};
pub use polygon::{Bounds, Polygon, ray_segment_intersection};
