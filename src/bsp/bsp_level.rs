// src/bsp/bsp_level.rs

use std::collections::VecDeque;

use log::info;

use crate::bsp::{BspError, Child};
use crate::config::ReconstructionConfig;
use crate::map::{Map, MapError};

/// A level going through, or done with, BSP reconstruction.
///
/// Owns the [`Map`] for the whole pass. The passes live in sibling modules
/// as further `impl BspLevel` blocks:
///
/// 1. partition lines (`bsp_partition`)
/// 2. implicit segments along them (`bsp_implicit`)
/// 3. leaf closure (`bsp_closure`)
/// 4. outlines and point location (`bsp_polygon`, `bsp_locate`)
pub struct BspLevel {
    pub(crate) map: Map,
    pub(crate) config: ReconstructionConfig,
}

impl BspLevel {
    /// Wraps a parsed map, cross-referencing it first if that has not
    /// happened yet.
    pub fn new(mut map: Map, config: ReconstructionConfig) -> Result<Self, BspError> {
        if !map.is_cross_referenced() {
            map.build_cross_references()?;
        }
        Ok(BspLevel { map, config })
    }

    /// Runs every pass and hands back the finished level. On error the
    /// partially rebuilt level is dropped.
    pub fn reconstruct(map: Map, config: ReconstructionConfig) -> Result<Self, BspError> {
        let mut level = Self::new(map, config)?;
        level.build()?;
        Ok(level)
    }

    pub fn build(&mut self) -> Result<(), BspError> {
        // 1. Clip every partition line, root first.
        self.resolve_partition_lines()?;
        info!(
            "{}: resolved {} partition lines",
            self.map.name,
            self.map.nodes.len()
        );

        // 2. Synthesize implicit segments along them, breadth-first.
        let added = self.synthesize_implicit_segments()?;
        info!("{}: synthesized {} implicit segments", self.map.name, added);

        // 3. Close each leaf.
        let closed = self.close_subsectors()?;
        info!(
            "{}: closed {} of {} subsectors",
            self.map.name,
            closed,
            self.map.subsectors.len()
        );

        Ok(())
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn into_map(self) -> Map {
        self.map
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Node indices in breadth-first order from the root. Each node is
    /// listed once, even if the tree was edited to share a subtree.
    pub fn nodes_breadth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.map.nodes.len());
        let Some(root) = self.map.root_node() else {
            return order;
        };
        let mut seen = vec![false; self.map.nodes.len()];
        seen[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for child in [self.map.nodes[node].right, self.map.nodes[node].left] {
                if let Child::Node(c) = child {
                    if c < seen.len() && !seen[c] {
                        seen[c] = true;
                        queue.push_back(c);
                    }
                }
            }
        }
        order
    }

    pub(crate) fn check_node(&self, node: usize) -> Result<(), BspError> {
        let len = self.map.nodes.len();
        if node < len {
            Ok(())
        } else {
            Err(MapError::DanglingReference { kind: "node", index: node, len }.into())
        }
    }

    pub(crate) fn check_subsector(&self, subsector: usize) -> Result<(), BspError> {
        let len = self.map.subsectors.len();
        if subsector < len {
            Ok(())
        } else {
            Err(MapError::DanglingReference {
                kind: "subsector",
                index: subsector,
                len,
            }
            .into())
        }
    }
}
