// src/map/mod.rs
pub mod level;
pub mod linedef;
pub mod sector;
pub mod segment;
pub mod sidedef;
pub mod subsector;
pub mod thing;
pub mod vertex;

pub use level::{Map, MapError};
pub use linedef::LineDef;
pub use sector::Sector;
pub use segment::{SegRef, Segment};
pub use sidedef::SideDef;
pub use subsector::{LoopEdge, SubSector};
pub use thing::Thing;
pub use vertex::Vertex;

#[cfg(test)]
pub(crate) mod fixtures;
