// src/map/sidedef.rs

use std::io::{self, Read, Seek};
use byteorder::{LE, ReadBytesExt};

/// Texture slot value that DOOM uses for "nothing drawn here".
pub const NO_TEXTURE: &str = "-";

/// One 30-byte SIDEDEFS record; wall textures for one side of a linedef.
///
/// ```text
/// offset  field       type
/// ------  ----------  ----
///  0-1    x_offset    i16
///  2-3    y_offset    i16
///  4-11   upper_tex   [u8; 8]
/// 12-19   lower_tex   [u8; 8]
/// 20-27   mid_tex     [u8; 8]
/// 28-29   sector      u16  (index into sector list)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SideDef {
    pub x_offset: i32,
    pub y_offset: i32,
    /// Drawn where the facing ceiling is lower than ours.
    pub upper_tex: String,
    /// Drawn where the facing floor is higher than ours.
    pub lower_tex: String,
    /// Solid wall on one-sided lines.
    pub mid_tex: String,
    pub sector: usize,
}

impl SideDef {
    pub fn new(
        x_offset: i32,
        y_offset: i32,
        upper_tex: String,
        lower_tex: String,
        mid_tex: String,
        sector: usize,
    ) -> Self {
        SideDef {
            x_offset,
            y_offset,
            upper_tex,
            lower_tex,
            mid_tex,
            sector,
        }
    }

    /// Reads a `SideDef` from a DOOM WAD in the 30-byte classic format.
    ///
    /// Texture names are uppercased with trailing zeros and spaces trimmed.
    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let x_offset = reader.read_i16::<LE>()? as i32;
        let y_offset = reader.read_i16::<LE>()? as i32;

        let upper_tex = read_tex8(reader)?;
        let lower_tex = read_tex8(reader)?;
        let mid_tex = read_tex8(reader)?;

        let sector = reader.read_u16::<LE>()? as usize;

        Ok(SideDef {
            x_offset,
            y_offset,
            upper_tex,
            lower_tex,
            mid_tex,
            sector,
        })
    }
}

/// True when a texture slot actually names a texture.
pub fn texture_present(name: &str) -> bool {
    !name.is_empty() && name != NO_TEXTURE
}

/// Reads an 8-byte texture name, trimming trailing `\0` and spaces.
pub(crate) fn read_tex8<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;

    let raw = buf
        .iter()
        .map(|&c| c as char)
        .collect::<String>()
        .to_uppercase();

    let trimmed = raw.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sidedef_from_wad() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&8i16.to_le_bytes());
        bytes.extend_from_slice(&(-4i16).to_le_bytes());
        bytes.extend_from_slice(b"-\0\0\0\0\0\0\0");
        bytes.extend_from_slice(b"step1\0\0\0");
        bytes.extend_from_slice(b"STARTAN2");
        bytes.extend_from_slice(&3u16.to_le_bytes());

        let side = SideDef::from_wad(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(side.x_offset, 8);
        assert_eq!(side.y_offset, -4);
        assert_eq!(side.upper_tex, "-");
        assert_eq!(side.lower_tex, "STEP1");
        assert_eq!(side.mid_tex, "STARTAN2");
        assert_eq!(side.sector, 3);
    }

    #[test]
    fn test_texture_present() {
        assert!(texture_present("STARTAN2"));
        assert!(!texture_present("-"));
        assert!(!texture_present(""));
    }
}
