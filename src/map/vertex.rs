// src/map/vertex.rs
use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};
use serde::Serialize;

use crate::utils::geometry::Point2D;

/// A map vertex. Stored on disk as two `i16`, held as `f64` because
/// reconstruction appends vertices at fractional intersection points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Vertex { x, y }
    }

    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        Ok(Vertex {
            x: reader.read_i16::<LE>()? as f64,
            y: reader.read_i16::<LE>()? as f64,
        })
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}
