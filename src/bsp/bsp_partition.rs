// src/bsp/bsp_partition.rs
// Clipping of node partition lines to the region each node governs.

use log::{debug, trace};

use crate::bsp::{BoundingBox, BspError, BspLevel, Line2D};
use crate::utils::geometry::{ray_aabb_intersect, segments_close_or_intersect, Point2D};

impl BspLevel {
    /// Resolves every node's complete partition line, root first.
    pub fn resolve_partition_lines(&mut self) -> Result<(), BspError> {
        for node in self.nodes_breadth_first() {
            self.resolve_partition_line(node)?;
        }
        Ok(())
    }

    /// Returns the complete partition line of `node`, computing and caching
    /// it (and any unresolved ancestors, top-down) on first use.
    pub fn resolve_partition_line(&mut self, node: usize) -> Result<Line2D, BspError> {
        self.check_node(node)?;
        if let Some(line) = self.map.nodes[node].complete_partition_line {
            return Ok(line);
        }

        let mut pending = vec![node];
        let mut current = self.map.nodes[node].parent;
        while let Some(parent) = current {
            if self.map.nodes[parent].complete_partition_line.is_some() {
                break;
            }
            pending.push(parent);
            current = self.map.nodes[parent].parent;
        }

        let mut resolved = None;
        for &n in pending.iter().rev() {
            let line = self.compute_complete_partition_line(n)?;
            debug!(
                "node {}: partition ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                n, line.start.x, line.start.y, line.end.x, line.end.y
            );
            self.map.nodes[n].complete_partition_line = Some(line);
            resolved = Some(line);
        }
        // `pending` always holds `node`, so the loop ran at least once.
        Ok(resolved.unwrap_or_else(|| self.map.nodes[node].partition_line()))
    }

    /// Complete partition lines of every ancestor of `node`, root first.
    /// Ancestors that are not resolved yet are skipped. Empty for an
    /// unknown node.
    pub fn ancestor_partition_lines(&self, node: usize) -> Vec<Line2D> {
        let mut lines = Vec::new();
        let mut current = self.map.nodes.get(node).and_then(|n| n.parent);
        while let Some(parent) = current {
            if let Some(line) = self.map.nodes[parent].complete_partition_line {
                lines.push(line);
            }
            current = self.map.nodes[parent].parent;
        }
        lines.reverse();
        lines
    }

    fn compute_complete_partition_line(&self, node: usize) -> Result<Line2D, BspError> {
        let n = &self.map.nodes[node];
        if n.dx == 0.0 && n.dy == 0.0 {
            return Err(BspError::DegeneratePartition { node });
        }

        let region = match (n.parent, n.branch) {
            (Some(parent), Some(side)) => *self.map.nodes[parent].bbox(side),
            _ => self.map.bounds(),
        };
        let [raw_start, raw_end] = self.clip_partition(node, &region)?;
        if n.parent.is_none() {
            return Ok(Line2D::new(raw_start, raw_end));
        }

        // Trim against ancestors using the line as it spans the whole map,
        // so crossings outside the (possibly loose) region still count.
        let [outer_start, outer_end] = self.clip_partition(node, &self.map.bounds())?;
        let mut crossings: Vec<Point2D> = Vec::new();
        for ancestor in self.ancestor_partition_lines(node) {
            if let Some(p) =
                segments_close_or_intersect(outer_start, outer_end, ancestor.start, ancestor.end, 0.0)
            {
                if !crossings.contains(&p) {
                    crossings.push(p);
                }
            }
        }
        if crossings.is_empty() {
            return Ok(Line2D::new(raw_start, raw_end));
        }

        let partition = n.partition_line();
        let mut ordered: Vec<(f64, Point2D)> = crossings
            .into_iter()
            .map(|p| (partition.reference_frame(p).along, p))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
        trace!("node {}: ancestor crossings {:?}", node, ordered);

        let threshold = self.config.distance_threshold;
        let start = ordered
            .iter()
            .filter(|(along, _)| *along < threshold)
            .last()
            .map_or(raw_start, |&(_, p)| p);
        let end = ordered
            .iter()
            .find(|(along, _)| *along >= threshold)
            .map_or(raw_end, |&(_, p)| p);
        Ok(Line2D::new(start, end))
    }

    /// Clips the infinite partition line of `node` against `bbox`; anything
    /// but two crossings means the tree is broken.
    fn clip_partition(&self, node: usize, bbox: &BoundingBox) -> Result<[Point2D; 2], BspError> {
        let n = &self.map.nodes[node];
        let hits = ray_aabb_intersect(
            n.origin(),
            n.direction(),
            &bbox.to_aabb(),
            -f64::MAX,
            f64::MAX,
        );
        match hits.as_slice() {
            [a, b] => Ok([*a, *b]),
            _ => Err(BspError::MalformedTree {
                node,
                intersections: hits.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{fixtures, MapError};

    fn level(map: crate::map::Map) -> BspLevel {
        BspLevel::new(map, Default::default()).unwrap()
    }

    #[test]
    fn test_root_clipped_to_map_bounds() {
        let mut level = level(fixtures::halved_room());
        let line = level.resolve_partition_line(0).unwrap();
        assert_eq!(line, Line2D::new(Point2D::new(64.0, 0.0), Point2D::new(64.0, 128.0)));
    }

    #[test]
    fn test_child_resolves_ancestors_first() {
        let mut level = level(fixtures::three_leaf_room());
        // Asking for the child first must resolve the root on the way.
        let child = level.resolve_partition_line(0).unwrap();
        assert!(level.map().nodes[1].complete_partition_line.is_some());
        assert!(child.start.approx_eq(Point2D::new(64.0, 64.0), 1e-9));
        assert!(child.end.approx_eq(Point2D::new(128.0, 64.0), 1e-9));
        assert_eq!(level.ancestor_partition_lines(0).len(), 1);
    }

    #[test]
    fn test_ancestor_trims_loose_region() {
        let mut map = fixtures::three_leaf_room();
        // A right box spanning the whole room leaves the raw clip too long.
        map.nodes[1].right_bb = BoundingBox::new(128.0, 0.0, 0.0, 128.0);
        let mut level = level(map);
        level.resolve_partition_lines().unwrap();
        let line = level.map().nodes[0].complete_partition_line.unwrap();
        assert!(line.start.approx_eq(Point2D::new(64.0, 64.0), 1e-9));
        assert!(line.end.approx_eq(Point2D::new(128.0, 64.0), 1e-9));
    }

    #[test]
    fn test_resolved_line_is_cached() {
        let mut level = level(fixtures::halved_room());
        let first = level.resolve_partition_line(0).unwrap();
        level.map.nodes[0].x = 10.0;
        assert_eq!(level.resolve_partition_line(0).unwrap(), first);
    }

    #[test]
    fn test_partition_outside_box_is_malformed() {
        let mut map = fixtures::halved_room();
        map.nodes[0].x = 500.0;
        let mut level = level(map);
        assert_eq!(
            level.resolve_partition_lines(),
            Err(BspError::MalformedTree { node: 0, intersections: 0 })
        );
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        let mut map = fixtures::halved_room();
        map.nodes[0].dy = 0.0;
        let mut level = level(map);
        assert_eq!(
            level.resolve_partition_line(0),
            Err(BspError::DegeneratePartition { node: 0 })
        );
    }

    #[test]
    fn test_unknown_node() {
        let mut level = level(fixtures::halved_room());
        assert_eq!(
            level.resolve_partition_line(3),
            Err(BspError::Map(MapError::DanglingReference {
                kind: "node",
                index: 3,
                len: 1,
            }))
        );
        assert!(level.ancestor_partition_lines(3).is_empty());
    }
}
