// src/bsp/bsp_implicit.rs
// Implicit segments along partition lines.
//
// A partition line that runs between two walls marks an edge of both leaves
// it separates, but no seg is stored for it. This pass walks the tree from
// the root and adds those edges wherever at least two vertices sit on the
// resolved line.

use log::{debug, trace};

use crate::bsp::{BspError, BspLevel, COINCIDENT_EPSILON};
use crate::map::SegRef;
use crate::utils::geometry::{segments_close_or_intersect, Aabb};

impl BspLevel {
    /// Runs the node pass breadth-first from the root and returns how many
    /// implicit segments were added in total.
    pub fn synthesize_implicit_segments(&mut self) -> Result<usize, BspError> {
        let mut added = 0;
        for node in self.nodes_breadth_first() {
            added += self.synthesize_node_segments(node)?.len();
        }
        Ok(added)
    }

    /// Adds the implicit segments lying along `node`'s partition line and
    /// returns their indices. Implicit segments crossing the line are split
    /// where they cross it.
    pub fn synthesize_node_segments(&mut self, node: usize) -> Result<Vec<usize>, BspError> {
        let line = self.resolve_partition_line(node)?;
        let threshold = self.config.distance_threshold;
        let mut region = Aabb::around_segment(line.start, line.end);
        region.grow(threshold);

        let mut on_line: Vec<usize> = Vec::new();

        let candidates: Vec<SegRef> = self.map.segment_refs().collect();
        for seg in candidates {
            let (a, b) = self.map.segment_points(seg);
            if !region.segment_inside(a, b) {
                continue;
            }
            let near_a = line.distance_to_point(a) <= threshold;
            let near_b = line.distance_to_point(b) <= threshold;

            if near_a || near_b {
                let s = self.map.segment(seg);
                let (start, end) = (s.start_vertex, s.end_vertex);
                if near_a {
                    push_unique(&mut on_line, start);
                }
                if near_b {
                    push_unique(&mut on_line, end);
                }
            } else if let SegRef::Implicit(i) = seg {
                let Some(hit) = segments_close_or_intersect(line.start, line.end, a, b, threshold)
                else {
                    continue;
                };
                let tail = self.map.split_implicit_segment(i, hit.x, hit.y)?;
                let cut = self.map.implicit_segs[tail].start_vertex;
                trace!(
                    "node {}: split implicit segment {} at ({:.1}, {:.1})",
                    node,
                    i,
                    hit.x,
                    hit.y
                );
                push_unique(&mut on_line, cut);
            }
        }

        if on_line.len() < 2 {
            debug!("node {}: no vertices along the partition line", node);
            return Ok(Vec::new());
        }

        on_line.sort_by(|&a, &b| {
            let along_a = line.reference_frame(self.map.point(a)).along;
            let along_b = line.reference_frame(self.map.point(b)).along;
            along_a.total_cmp(&along_b)
        });

        let mut added = Vec::new();
        for pair in on_line.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if self.map.point(a).distance_to(self.map.point(b)) < COINCIDENT_EPSILON {
                continue;
            }
            if self.map.segment_exists(a, b, false) || self.map.is_on_same_linedef(a, b) {
                trace!("node {}: {} -> {} already bounded", node, a, b);
                continue;
            }
            added.push(self.map.add_implicit_segment(a, b));
        }

        debug!(
            "node {}: {} vertices on the line, {} implicit segments added",
            node,
            on_line.len(),
            added.len()
        );
        self.map.nodes[node].implicit_segments.extend(&added);
        Ok(added)
    }
}

fn push_unique(vertices: &mut Vec<usize>, v: usize) {
    if !vertices.contains(&v) {
        vertices.push(v);
    }
}
