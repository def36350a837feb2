// src/bsp/bsp_error.rs

use thiserror::Error;

use crate::map::MapError;

/// Reasons a level cannot be reconstructed. All of them are fatal for the
/// level: no partial result is kept.
#[derive(Debug, Error, PartialEq)]
pub enum BspError {
    #[error("partition line of node {node} could not split its bounding box ({intersections} intersections)")]
    MalformedTree { node: usize, intersections: usize },

    #[error("node {node} has a zero-length partition direction")]
    DegeneratePartition { node: usize },

    #[error("subsector {subsector} cannot be closed at vertex {vertex}: {reason}")]
    UnclosableLeaf {
        subsector: usize,
        vertex: usize,
        reason: String,
    },

    #[error("probable infinite loop while closing subsector {subsector} (gave up after {cap} iterations)")]
    IterationCap { subsector: usize, cap: usize },

    #[error(transparent)]
    Map(#[from] MapError),
}
