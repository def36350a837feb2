// src/map/linedef.rs
use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};

/// Sidedef slot value meaning "no sidedef on this side".
pub const NO_SIDEDEF: u16 = 0xFFFF;

pub const ML_BLOCKING: i32 = 0x0001;
pub const ML_TWO_SIDED: i32 = 0x0004;

/// A linedef in classic DOOM format (14 bytes).
///
/// ```text
///  0-1   start vertex  (u16)
///  2-3   end vertex    (u16)
///  4-5   flags         (i16)
///  6-7   special type  (i16)
///  8-9   sector tag    (i16)
/// 10-11  right sidedef (u16, 0xFFFF = none)
/// 12-13  left sidedef  (u16, 0xFFFF = none)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LineDef {
    pub start: usize,
    pub end: usize,
    pub flags: i32,
    pub line_type: i32,
    pub tag: i32,
    pub right: Option<usize>,
    pub left: Option<usize>,
}

impl LineDef {
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        Ok(LineDef {
            start: reader.read_u16::<LE>()? as usize,
            end: reader.read_u16::<LE>()? as usize,
            flags: reader.read_i16::<LE>()? as i32,
            line_type: reader.read_i16::<LE>()? as i32,
            tag: reader.read_i16::<LE>()? as i32,
            right: side_index(reader.read_u16::<LE>()?),
            left: side_index(reader.read_u16::<LE>()?),
        })
    }

    pub fn is_two_sided(&self) -> bool {
        self.flags & ML_TWO_SIDED != 0 && self.left.is_some()
    }

    /// Sidedef facing a seg with the given direction: 0 follows the
    /// linedef and sees the right side, anything else sees the left.
    pub fn front_side(&self, direction: u16) -> Option<usize> {
        if direction == 0 { self.right } else { self.left }
    }

    pub fn back_side(&self, direction: u16) -> Option<usize> {
        if direction == 0 { self.left } else { self.right }
    }
}

fn side_index(raw: u16) -> Option<usize> {
    if raw == NO_SIDEDEF {
        None
    } else {
        Some(raw as usize)
    }
}
