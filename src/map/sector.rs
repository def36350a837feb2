// src/map/sector.rs

use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};

use crate::map::sidedef::read_tex8;

/// One 26-byte SECTORS record. Every subsector outline is rendered with the
/// floor and ceiling of the sector its segs face.
///
/// ```text
/// offset  field          type
/// ------  -------------  ----
///  0-1    floor_height   i16
///  2-3    ceiling_height i16
///  4-11   floor_tex      [u8; 8]
/// 12-19   ceiling_tex    [u8; 8]
/// 20-21   light_level    i16
/// 22-23   special_type   i16
/// 24-25   tag            i16
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub floor_height: i32,
    pub ceiling_height: i32,
    /// Flat names, uppercased.
    pub floor_tex: String,
    pub ceiling_tex: String,
    pub light: i32,
    /// Sector special ("effect").
    pub r#type: i32,
    pub tag: i32,
}

impl Sector {
    pub fn new(
        floor_height: i32,
        ceiling_height: i32,
        floor_tex: String,
        ceiling_tex: String,
        light: i32,
        r#type: i32,
        tag: i32,
    ) -> Self {
        Sector {
            floor_height,
            ceiling_height,
            floor_tex,
            ceiling_tex,
            light,
            r#type,
            tag,
        }
    }

    /// Decodes one record from a SECTORS lump.
    /// Flat names are uppercased and trimmed like texture names.
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let floor_height = reader.read_i16::<LE>()? as i32;
        let ceiling_height = reader.read_i16::<LE>()? as i32;
        let floor_tex = read_tex8(reader)?;
        let ceiling_tex = read_tex8(reader)?;
        let light = reader.read_i16::<LE>()? as i32;
        let r#type = reader.read_i16::<LE>()? as i32;
        let tag = reader.read_i16::<LE>()? as i32;

        Ok(Sector {
            floor_height,
            ceiling_height,
            floor_tex,
            ceiling_tex,
            light,
            r#type,
            tag,
        })
    }

    /// Vertical opening of the sector.
    pub fn headroom(&self) -> i32 {
        self.ceiling_height - self.floor_height
    }

    /// Sky ceilings are left open in exported meshes.
    pub fn has_sky_ceiling(&self) -> bool {
        self.ceiling_tex.contains("SKY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sector_from_wad() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-16i16).to_le_bytes());
        bytes.extend_from_slice(&112i16.to_le_bytes());
        bytes.extend_from_slice(b"FLOOR4_8");
        bytes.extend_from_slice(b"F_SKY1\0\0");
        bytes.extend_from_slice(&160i16.to_le_bytes());
        bytes.extend_from_slice(&9i16.to_le_bytes());
        bytes.extend_from_slice(&2i16.to_le_bytes());

        let sector = Sector::from_wad(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(sector.floor_height, -16);
        assert_eq!(sector.ceiling_height, 112);
        assert_eq!(sector.headroom(), 128);
        assert_eq!(sector.floor_tex, "FLOOR4_8");
        assert!(sector.has_sky_ceiling());
        assert_eq!(sector.light, 160);
        assert_eq!(sector.r#type, 9);
        assert_eq!(sector.tag, 2);
    }
}
