// src/bsp/bsp_polygon.rs
// Ordered outlines of closed subsectors.

use crate::bsp::bsp_closure::SegmentGraph;
use crate::bsp::{BspError, BspLevel};
use crate::map::LoopEdge;
use crate::utils::geometry::Point2D;

impl SegmentGraph {
    /// Follows the edges from the first edge's start until it gets back
    /// there. Only meaningful once the graph is a single cycle.
    pub(crate) fn walk(&self) -> Vec<LoopEdge> {
        let Some(first) = self.edges.first() else {
            return Vec::new();
        };
        let start = first.from;
        let mut key = start;
        let mut out = Vec::with_capacity(self.edges.len());
        while let Some(edge) = self.edges.iter().find(|e| e.from == key) {
            out.push(LoopEdge {
                start_vertex: self.vertices[edge.from],
                end_vertex: self.vertices[edge.to],
                seg: edge.seg,
            });
            key = edge.to;
            if key == start || out.len() == self.edges.len() {
                break;
            }
        }
        out
    }
}

/// True when each edge ends where the next one starts, the last one leads
/// back to the first, and no vertex is visited twice.
pub fn is_closed_loop(edges: &[LoopEdge]) -> bool {
    if edges.is_empty() {
        return false;
    }
    let chained = edges
        .iter()
        .zip(edges.iter().cycle().skip(1))
        .all(|(e, next)| e.end_vertex == next.start_vertex);
    let mut starts: Vec<usize> = edges.iter().map(|e| e.start_vertex).collect();
    starts.sort_unstable();
    starts.dedup();
    chained && starts.len() == edges.len()
}

impl BspLevel {
    /// The closed outline of `subsector`, closing and caching it on first
    /// use.
    pub fn subsector_loop(&mut self, subsector: usize) -> Result<Vec<LoopEdge>, BspError> {
        self.check_subsector(subsector)?;
        if !self.map.subsectors[subsector].is_closed() {
            let edges = self.close_subsector(subsector)?;
            self.map.subsectors[subsector].complete_segments = edges;
        }
        Ok(self.map.subsectors[subsector].complete_segments.clone())
    }

    /// Outline points of a closed subsector in loop order (clockwise).
    /// Empty if the subsector does not exist or has not been closed.
    pub fn polygon(&self, subsector: usize) -> Vec<Point2D> {
        let Some(ss) = self.map.subsectors.get(subsector) else {
            return Vec::new();
        };
        ss.complete_segments
            .iter()
            .map(|e| self.map.point(e.start_vertex))
            .collect()
    }

    pub fn polygons(&self) -> Vec<Vec<Point2D>> {
        (0..self.map.subsectors.len())
            .map(|ss| self.polygon(ss))
            .collect()
    }

    /// Drops every cached loop so the next query rebuilds it.
    pub fn clear_subsector_loops(&mut self) {
        for ss in self.map.subsectors.iter_mut() {
            ss.complete_segments.clear();
        }
    }
}
