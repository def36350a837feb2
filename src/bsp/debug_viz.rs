// src/bsp/debug_viz.rs

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::bsp::{BoundingBox, BspLevel, Child, Line2D};
use crate::map::LoopEdge;
use crate::utils::geometry::Point2D;

/// Summary counts shown at the top of a dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugStats {
    pub nodes: usize,
    pub subsectors: usize,
    pub segs: usize,
    pub implicit_segs: usize,
    pub open_subsectors: usize,
    pub tree_height: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub index: usize,
    pub partition: Option<Line2D>,
    pub right_bb: BoundingBox,
    pub left_bb: BoundingBox,
    pub right: Child,
    pub left: Child,
    pub implicit_segments: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubSectorSnapshot {
    pub index: usize,
    pub sector: Option<usize>,
    pub outline: Vec<Point2D>,
    pub edges: Vec<LoopEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentSnapshot {
    pub index: usize,
    pub start: Point2D,
    pub end: Point2D,
}

/// Everything the reconstruction produced for one level, ready to be
/// written out as JSON and inspected in an external viewer.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub map: String,
    pub bounds: BoundingBox,
    pub stats: DebugStats,
    pub nodes: Vec<NodeSnapshot>,
    pub subsectors: Vec<SubSectorSnapshot>,
    pub implicit_segments: Vec<SegmentSnapshot>,
}

impl DebugSnapshot {
    pub fn capture(level: &BspLevel) -> Self {
        let map = level.map();

        let nodes = map
            .nodes
            .iter()
            .enumerate()
            .map(|(index, n)| NodeSnapshot {
                index,
                partition: n.complete_partition_line,
                right_bb: n.right_bb,
                left_bb: n.left_bb,
                right: n.right,
                left: n.left,
                implicit_segments: n.implicit_segments.clone(),
            })
            .collect();

        let subsectors: Vec<SubSectorSnapshot> = map
            .subsectors
            .iter()
            .enumerate()
            .map(|(index, ss)| SubSectorSnapshot {
                index,
                sector: ss.sector,
                outline: level.polygon(index),
                edges: ss.complete_segments.clone(),
            })
            .collect();

        let implicit_segments = map
            .implicit_segs
            .iter()
            .enumerate()
            .map(|(index, s)| SegmentSnapshot {
                index,
                start: map.point(s.start_vertex),
                end: map.point(s.end_vertex),
            })
            .collect();

        let stats = DebugStats {
            nodes: map.nodes.len(),
            subsectors: map.subsectors.len(),
            segs: map.segs.len(),
            implicit_segs: map.implicit_segs.len(),
            open_subsectors: subsectors.iter().filter(|s| s.edges.is_empty()).count(),
            tree_height: tree_height(level),
        };

        DebugSnapshot {
            map: map.name.clone(),
            bounds: map.bounds(),
            stats,
            nodes,
            subsectors,
            implicit_segments,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

/// Number of node levels on the longest root-to-leaf path.
fn tree_height(level: &BspLevel) -> usize {
    let map = level.map();
    let Some(root) = map.root_node() else {
        return 0;
    };
    let mut height = 0;
    let mut queue = VecDeque::from([(root, 1)]);
    while let Some((node, depth)) = queue.pop_front() {
        height = height.max(depth);
        for child in [map.nodes[node].right, map.nodes[node].left] {
            if let Child::Node(c) = child {
                queue.push_back((c, depth + 1));
            }
        }
    }
    height
}
