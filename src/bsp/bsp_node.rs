//! src/bsp/bsp_node.rs

use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};
use serde::Serialize;

use crate::bsp::bsp_util::{BoundingBox, Line2D, Side};
use crate::utils::geometry::Point2D;

/// Bit 15 of a child reference marks a subsector.
pub const SUBSECTOR_BIT: u16 = 0x8000;
pub const CHILD_MASK: u16 = 0x7FFF;

/// A child slot of a node: another node, or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Child {
    Node(usize),
    SubSector(usize),
}

impl Child {
    pub fn from_raw(raw: u16) -> Self {
        let index = (raw & CHILD_MASK) as usize;
        if raw & SUBSECTOR_BIT != 0 {
            Child::SubSector(index)
        } else {
            Child::Node(index)
        }
    }
}

/// A node of the BSP tree as stored in the NODES lump (28 bytes), plus the
/// links and derived data the reconstruction passes attach to it.
///
/// ```text
///  0-7   partition x, y, dx, dy   (4 x i16)
///  8-15  right bounding box       (top, bottom, left, right)
/// 16-23  left bounding box        (top, bottom, left, right)
/// 24-25  right child              (u16, bit 15 = subsector)
/// 26-27  left child               (u16)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub right_bb: BoundingBox,
    pub left_bb: BoundingBox,
    pub right: Child,
    pub left: Child,
    /// Parent node and the side of its partition we hang from. Both stay
    /// `None` for the root.
    pub parent: Option<usize>,
    pub branch: Option<Side>,
    /// Partition line clipped to this node's region. Resolved once.
    pub complete_partition_line: Option<Line2D>,
    /// Implicit segments synthesized along this node's partition line.
    pub implicit_segments: Vec<usize>,
}

impl BspNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        right_bb: BoundingBox,
        left_bb: BoundingBox,
        right: Child,
        left: Child,
    ) -> Self {
        BspNode {
            x,
            y,
            dx,
            dy,
            right_bb,
            left_bb,
            right,
            left,
            parent: None,
            branch: None,
            complete_partition_line: None,
            implicit_segments: Vec::new(),
        }
    }

    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let x = reader.read_i16::<LE>()? as f64;
        let y = reader.read_i16::<LE>()? as f64;
        let dx = reader.read_i16::<LE>()? as f64;
        let dy = reader.read_i16::<LE>()? as f64;
        let right_bb = BoundingBox::from_wad(reader)?;
        let left_bb = BoundingBox::from_wad(reader)?;
        let right = Child::from_raw(reader.read_u16::<LE>()?);
        let left = Child::from_raw(reader.read_u16::<LE>()?);
        Ok(BspNode::new(x, y, dx, dy, right_bb, left_bb, right, left))
    }

    pub fn origin(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn direction(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }

    /// The stored partition, from the partition point to the tip of the
    /// direction vector.
    pub fn partition_line(&self) -> Line2D {
        Line2D::new(self.origin(), self.origin() + self.direction())
    }

    pub fn child(&self, side: Side) -> Child {
        match side {
            Side::Right => self.right,
            Side::Left => self.left,
        }
    }

    pub fn bbox(&self, side: Side) -> &BoundingBox {
        match side {
            Side::Right => &self.right_bb,
            Side::Left => &self.left_bb,
        }
    }

    /// Side on which `child` hangs, if it is a child of this node at all.
    pub fn side_of_child(&self, child: Child) -> Option<Side> {
        if self.right == child {
            Some(Side::Right)
        } else if self.left == child {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// Line used for side tests: the clipped one when resolved, else the
    /// raw partition, which lies on the same infinite line.
    pub fn splitting_line(&self) -> Line2D {
        self.complete_partition_line.unwrap_or_else(|| self.partition_line())
    }
}
