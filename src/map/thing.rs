// src/map/thing.rs

use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};

use crate::utils::geometry::Point2D;

/// A placed map object (10 bytes on disk).
///
/// ```text
/// offset  field    type
/// ------  -------  ----
///  0-1    x        i16
///  2-3    y        i16
///  4-5    facing   i16 (degrees)
///  6-7    doomednum i16
///  8-9    flags    i16
/// ```
///
/// Only the position matters for reconstruction; things are used to check
/// that every spawn point lands inside some subsector.
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub x: i32,
    pub y: i32,
    pub facing: i32,
    pub doomednum: i32,
    pub flags: i32,
}

impl Thing {
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let mut fields = [0i32; 5];
        for f in fields.iter_mut() {
            *f = reader.read_i16::<LE>()? as i32;
        }
        let [x, y, facing, doomednum, flags] = fields;
        Ok(Thing { x, y, facing, doomednum, flags })
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x as f64, self.y as f64)
    }

    /// Doomednums 1-4 are the cooperative player starts.
    pub fn is_player_start(&self) -> bool {
        (1..=4).contains(&self.doomednum)
    }
}
