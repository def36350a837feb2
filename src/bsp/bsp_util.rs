// src/bsp/bsp_util.rs
// Geometry helpers specific to BSP nodes.

use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};
use serde::Serialize;

use crate::utils::geometry::{
    point_segment_distance, project_onto_reference_frame, signed_area2, Aabb, Point2D,
    ReferenceFrame,
};

/// Which side of a partition line something lies on. Right is the
/// front side in DOOM terms and holds the node's first child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Right,
    Left,
}

/// A node bounding box, kept in the on-disk field order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl BoundingBox {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        BoundingBox { top, bottom, left, right }
    }

    /// Inverted box at the limits of 16-bit map space, ready for
    /// [`expand_point`](Self::expand_point).
    pub fn new_empty() -> Self {
        BoundingBox {
            top: -32767.0,
            bottom: 32767.0,
            left: 32767.0,
            right: -32767.0,
        }
    }

    /// Reads `top, bottom, left, right` as four `i16`.
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let top = reader.read_i16::<LE>()? as f64;
        let bottom = reader.read_i16::<LE>()? as f64;
        let left = reader.read_i16::<LE>()? as f64;
        let right = reader.read_i16::<LE>()? as f64;
        Ok(BoundingBox::new(top, bottom, left, right))
    }

    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.left = self.left.min(x);
        self.bottom = self.bottom.min(y);
        self.right = self.right.max(x);
        self.top = self.top.max(y);
    }

    // Boundary counts as inside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    pub fn center(&self) -> Point2D {
        Point2D::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_corners(
            Point2D::new(self.left, self.bottom),
            Point2D::new(self.right, self.top),
        )
    }
}

/// A directed, finite line. Used for partition lines once they have been
/// clipped to the region their node governs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line2D {
    pub start: Point2D,
    pub end: Point2D,
}

impl Line2D {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Line2D { start, end }
    }

    pub fn direction(&self) -> Point2D {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn midpoint(&self) -> Point2D {
        (self.start + self.end) * 0.5
    }

    /// Positive left of the line, negative right of it, zero on it.
    pub fn classify_point(&self, point: Point2D) -> f64 {
        signed_area2(self.start, self.end, point)
    }

    /// Perpendicular offset of `point` from the infinite line, in map
    /// units, with the sign of [`classify_point`](Self::classify_point).
    pub fn signed_distance(&self, point: Point2D) -> f64 {
        let len = self.length();
        if len == 0.0 {
            return 0.0;
        }
        self.classify_point(point) / len
    }

    /// Points on the line count as right, matching DOOM's front-side rule.
    pub fn side_of(&self, point: Point2D) -> Side {
        if self.classify_point(point) > 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn reference_frame(&self, point: Point2D) -> ReferenceFrame {
        project_onto_reference_frame(self.start, self.end, point)
    }

    pub fn distance_to_point(&self, point: Point2D) -> f64 {
        point_segment_distance(self.start, self.end, point)
    }
}
