// src/bsp/mod.rs
pub mod bsp_closure;
pub mod bsp_error;
pub mod bsp_level;
pub mod bsp_node;
pub mod bsp_polygon;
pub mod bsp_util;
pub mod debug_viz;
mod bsp_implicit;
mod bsp_locate;
mod bsp_partition;

pub use bsp_error::BspError;
pub use bsp_level::BspLevel;
pub use bsp_node::{BspNode, Child};
pub use bsp_polygon::is_closed_loop;
pub use bsp_util::{BoundingBox, Line2D, Side};

/// Map units within which a vertex counts as lying on a partition line.
pub const DISTANCE_THRESHOLD: f64 = 5.0;
/// Splices allowed while closing one subsector.
pub const MAX_CLOSURE_ITERATIONS: usize = 100;
/// Vertices closer than this share a position in the closure graph.
pub const COINCIDENT_EPSILON: f64 = 1e-3;
