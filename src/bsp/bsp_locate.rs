// src/bsp/bsp_locate.rs
// Point location: which subsector contains a map position.

use crate::bsp::{BspLevel, Child, Side};
use crate::utils::geometry::Point2D;

impl BspLevel {
    /// Subsector containing `(x, y)`, or `None` outside every node box.
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        match self.map.root_node() {
            Some(root) => self.locate_from(root, x, y),
            // A single-leaf map has no nodes at all.
            None if self.map.subsectors.len() == 1 => self
                .map
                .bounds()
                .contains_point(x, y)
                .then_some(0),
            None => None,
        }
    }

    /// Walks down from `node`. A point inside both child boxes goes to the
    /// side of the partition it lies on; points on the line go right.
    pub fn locate_from(&self, node: usize, x: f64, y: f64) -> Option<usize> {
        let point = Point2D::new(x, y);
        let mut current = node;
        loop {
            let n = self.map.nodes.get(current)?;
            let in_right = n.right_bb.contains_point(x, y);
            let in_left = n.left_bb.contains_point(x, y);
            let side = match (in_right, in_left) {
                (true, true) => n.splitting_line().side_of(point),
                (true, false) => Side::Right,
                (false, true) => Side::Left,
                (false, false) => return None,
            };
            match n.child(side) {
                Child::Node(c) => current = c,
                Child::SubSector(s) => return Some(s),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{fixtures, Map, SubSector};

    #[test]
    fn test_locate_quarters() {
        let level = BspLevel::new(fixtures::three_leaf_room(), Default::default()).unwrap();
        assert_eq!(level.locate(96.0, 96.0), Some(0));
        assert_eq!(level.locate(96.0, 32.0), Some(1));
        assert_eq!(level.locate(38.4, 64.0), Some(2));
        assert_eq!(level.locate(30.0, 30.0), Some(2));
        assert_eq!(level.locate(200.0, 200.0), None);
    }

    #[test]
    fn test_locate_on_shared_boundary() {
        let mut level = BspLevel::new(fixtures::three_leaf_room(), Default::default()).unwrap();
        level.resolve_partition_lines().unwrap();
        // On the root line: in both boxes, so the right side wins.
        assert_eq!(level.locate(64.0, 100.0), Some(0));
        assert_eq!(level.locate(64.0, 10.0), Some(1));
        // On node 0's line.
        assert_eq!(level.locate(100.0, 64.0), Some(1));
    }

    #[test]
    fn test_locate_from_inner_node() {
        let level = BspLevel::new(fixtures::three_leaf_room(), Default::default()).unwrap();
        assert_eq!(level.locate_from(0, 100.0, 100.0), Some(0));
        assert_eq!(level.locate_from(0, 10.0, 100.0), None);
        assert_eq!(level.locate_from(9, 10.0, 100.0), None);
    }

    #[test]
    fn test_single_leaf_map() {
        let mut map = Map::new("ONE");
        map.add_vertex(0.0, 0.0).unwrap();
        map.add_vertex(32.0, 32.0).unwrap();
        map.subsectors.push(SubSector::new(0, 0));
        let level = BspLevel::new(map, Default::default()).unwrap();
        assert_eq!(level.locate(16.0, 16.0), Some(0));
        assert_eq!(level.locate(40.0, 16.0), None);
    }
}
