// src/map/segment.rs
use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};
use serde::Serialize;

/// A directed piece of a linedef as stored in the SEGS lump (12 bytes),
/// or a boundary edge synthesized during reconstruction.
///
/// ```text
///  0-1   start vertex (u16)
///  2-3   end vertex   (u16)
///  4-5   angle        (i16, binary angle)
///  6-7   linedef      (u16)
///  8-9   direction    (i16, 0 = same as linedef)
/// 10-11  offset       (i16)
/// ```
///
/// The subsector a seg belongs to always lies on its right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_vertex: usize,
    pub end_vertex: usize,
    pub angle: i32,
    /// `None` for implicit segments.
    pub linedef: Option<usize>,
    pub direction: u16,
    pub offset: i32,
    pub implicit: bool,
}

impl Segment {
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        Ok(Segment {
            start_vertex: reader.read_u16::<LE>()? as usize,
            end_vertex: reader.read_u16::<LE>()? as usize,
            angle: reader.read_i16::<LE>()? as i32,
            linedef: Some(reader.read_u16::<LE>()? as usize),
            direction: reader.read_i16::<LE>()? as u16,
            offset: reader.read_i16::<LE>()? as i32,
            implicit: false,
        })
    }

    pub fn new_implicit(start_vertex: usize, end_vertex: usize) -> Self {
        Segment {
            start_vertex,
            end_vertex,
            angle: 0,
            linedef: None,
            direction: 0,
            offset: 0,
            implicit: true,
        }
    }

    /// True when this segment joins `a` and `b`; with `order_sensitive`
    /// it must also run from `a` to `b`.
    pub fn connects(&self, a: usize, b: usize, order_sensitive: bool) -> bool {
        (self.start_vertex == a && self.end_vertex == b)
            || (!order_sensitive && self.start_vertex == b && self.end_vertex == a)
    }

    pub fn other_end(&self, vertex: usize) -> Option<usize> {
        if self.start_vertex == vertex {
            Some(self.end_vertex)
        } else if self.end_vertex == vertex {
            Some(self.start_vertex)
        } else {
            None
        }
    }
}

/// Addresses a segment in either of the map's two segment lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegRef {
    Real(usize),
    Implicit(usize),
}

impl SegRef {
    pub fn is_implicit(&self) -> bool {
        matches!(self, SegRef::Implicit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_seg_from_wad() {
        let mut bytes = Vec::new();
        for v in [4i16, 2, 16384, 1, 1, 64] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let seg = Segment::from_wad(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(seg.start_vertex, 4);
        assert_eq!(seg.end_vertex, 2);
        assert_eq!(seg.angle, 16384);
        assert_eq!(seg.linedef, Some(1));
        assert_eq!(seg.direction, 1);
        assert_eq!(seg.offset, 64);
        assert!(!seg.implicit);
    }

    #[test]
    fn test_connects() {
        let seg = Segment::new_implicit(5, 9);
        assert!(seg.connects(5, 9, true));
        assert!(seg.connects(9, 5, false));
        assert!(!seg.connects(9, 5, true));
        assert_eq!(seg.other_end(9), Some(5));
        assert_eq!(seg.other_end(1), None);
    }
}
