// src/document/document.rs

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::str;

use byteorder::{LE, ReadBytesExt};
use log::{debug, info, warn};
use thiserror::Error;

use crate::bsp::BspNode;
use crate::map::{LineDef, Map, MapError, Sector, Segment, SideDef, SubSector, Thing, Vertex};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid WAD identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("directory offset {offset} exceeds total file size {size}")]
    DirectoryOutOfBounds { offset: i64, size: u64 },

    #[error("level {0} not found")]
    LevelNotFound(String),

    #[error("level {level} has no {lump} lump")]
    MissingLump { level: String, lump: &'static str },

    #[error("{lump} lump is {size} bytes, not a whole number of {record}-byte records")]
    BadLumpSize {
        lump: &'static str,
        size: usize,
        record: usize,
    },

    #[error(transparent)]
    Map(#[from] MapError),
}

/// A single lump entry from the WAD directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LumpEntry {
    pub offset: usize,
    pub size: usize,
    pub name: String,
}

/// A level marker and the map lumps following it.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    pub name: String,
    pub lump_indices: Vec<usize>,
}

const FILELUMP_SIZE: usize = 16; // 4 bytes (filepos) + 4 bytes (size) + 8 bytes (name)

/// Lumps that may follow a level marker.
const LEVEL_LUMPS: [&str; 10] = [
    "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
    "REJECT", "BLOCKMAP",
];

/// A WAD file held in memory together with its directory.
#[derive(Debug, Default)]
pub struct Document {
    data: Vec<u8>,
    directory: Vec<LumpEntry>,
    levels: Vec<LevelInfo>,
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::load_wad(&mut reader)
    }

    /// Reads the whole WAD into memory, then its header and directory.
    /// Lumps pointing outside the file are dropped with a warning.
    pub fn load_wad<R: Read + Seek>(reader: &mut R) -> Result<Self, DocumentError> {
        let total_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::with_capacity(total_size as usize);
        reader.read_to_end(&mut data)?;
        let mut cursor = Cursor::new(&data[..]);

        // --- Read Header ---
        let mut ident = [0u8; 4];
        cursor.read_exact(&mut ident)?;
        if &ident != b"IWAD" && &ident != b"PWAD" {
            return Err(DocumentError::InvalidIdentifier(
                String::from_utf8_lossy(&ident).into_owned(),
            ));
        }
        let num_lumps = cursor.read_i32::<LE>()?.max(0) as usize;
        let infotableofs = cursor.read_i32::<LE>()? as i64;
        let dir_size = (num_lumps * FILELUMP_SIZE) as u64;
        if infotableofs < 0 || infotableofs as u64 + dir_size > total_size {
            return Err(DocumentError::DirectoryOutOfBounds {
                offset: infotableofs,
                size: total_size,
            });
        }

        // --- Read Directory ---
        cursor.seek(SeekFrom::Start(infotableofs as u64))?;
        let mut directory = Vec::with_capacity(num_lumps);
        let mut name_bytes = [0u8; 8];
        for _ in 0..num_lumps {
            let lump_offset = cursor.read_i32::<LE>()?;
            let lump_size = cursor.read_i32::<LE>()?;
            cursor.read_exact(&mut name_bytes)?;
            let lump_name = str::from_utf8(&name_bytes)
                .unwrap_or("")
                .trim_end_matches(|c: char| c == '\0' || c == ' ')
                .to_string();
            if lump_offset < 0
                || lump_size < 0
                || lump_offset as u64 + lump_size as u64 > total_size
            {
                warn!(
                    "lump '{}' has invalid offset/size ({}+{} > {})",
                    lump_name, lump_offset, lump_size, total_size
                );
                continue;
            }
            directory.push(LumpEntry {
                offset: lump_offset as usize,
                size: lump_size as usize,
                name: lump_name,
            });
        }

        // --- Group Lumps into Levels ---
        let levels = Self::group_levels(&directory);
        info!(
            "read WAD with {} lumps and {} levels",
            directory.len(),
            levels.len()
        );
        Ok(Document {
            data,
            directory,
            levels,
        })
    }

    /// Groups lumps from the directory into levels based on markers (e.g.
    /// "MAP01" or "E1M1"). A level ends at the first lump that is not a map
    /// lump.
    fn group_levels(directory: &[LumpEntry]) -> Vec<LevelInfo> {
        let mut levels = Vec::new();
        let mut current_level: Option<LevelInfo> = None;
        for (i, entry) in directory.iter().enumerate() {
            if Self::is_level_marker(&entry.name) {
                levels.extend(current_level.take());
                current_level = Some(LevelInfo {
                    name: entry.name.clone(),
                    lump_indices: vec![i],
                });
            } else if LEVEL_LUMPS.contains(&entry.name.as_str()) {
                if let Some(ref mut lvl) = current_level {
                    lvl.lump_indices.push(i);
                }
            } else {
                levels.extend(current_level.take());
            }
        }
        levels.extend(current_level);
        levels
    }

    /// Returns true if the lump name indicates a level marker.
    fn is_level_marker(name: &str) -> bool {
        let upper = name.trim().to_uppercase();
        let bytes = upper.as_bytes();
        match bytes {
            [b'M', b'A', b'P', d1, d2] => d1.is_ascii_digit() && d2.is_ascii_digit(),
            [b'E', e, b'M', m] => e.is_ascii_digit() && m.is_ascii_digit(),
            _ => false,
        }
    }

    /// Returns a list of available level markers.
    pub fn available_levels(&self) -> Vec<String> {
        self.levels.iter().map(|lvl| lvl.name.clone()).collect()
    }

    pub fn directory(&self) -> &[LumpEntry] {
        &self.directory
    }

    /// Reads every map lump of `level_name` into a cross-referenced
    /// [`Map`]. THINGS may be missing; every other lump is required.
    pub fn load_map(&self, level_name: &str) -> Result<Map, DocumentError> {
        let level = self
            .levels
            .iter()
            .find(|lvl| lvl.name.eq_ignore_ascii_case(level_name))
            .ok_or_else(|| DocumentError::LevelNotFound(level_name.to_string()))?;

        let mut map = Map::new(&level.name);
        map.things = match self.read_lump(level, "THINGS", 10, Thing::from_wad) {
            Err(DocumentError::MissingLump { .. }) => Vec::new(),
            other => other?,
        };
        map.vertices = self.read_lump(level, "VERTEXES", 4, Vertex::from_wad)?;
        map.linedefs = self.read_lump(level, "LINEDEFS", 14, LineDef::from_wad)?;
        map.sidedefs = self.read_lump(level, "SIDEDEFS", 30, SideDef::from_wad)?;
        map.sectors = self.read_lump(level, "SECTORS", 26, Sector::from_wad)?;
        map.segs = self.read_lump(level, "SEGS", 12, Segment::from_wad)?;
        map.subsectors = self.read_lump(level, "SSECTORS", 4, SubSector::from_wad)?;
        map.nodes = self.read_lump(level, "NODES", 28, BspNode::from_wad)?;

        info!(
            "{}: {} vertices, {} linedefs, {} sectors, {} segs, {} subsectors, {} nodes",
            map.name,
            map.vertices.len(),
            map.linedefs.len(),
            map.sectors.len(),
            map.segs.len(),
            map.subsectors.len(),
            map.nodes.len()
        );
        map.build_cross_references()?;
        Ok(map)
    }

    // --- Lump-loading helper functions ---

    fn read_lump<'d, T, F>(
        &'d self,
        level: &LevelInfo,
        lump: &'static str,
        record: usize,
        read: F,
    ) -> Result<Vec<T>, DocumentError>
    where
        F: Fn(&mut Cursor<&'d [u8]>) -> io::Result<T>,
    {
        let entry = level
            .lump_indices
            .iter()
            .map(|&i| &self.directory[i])
            .find(|e| e.name == lump)
            .ok_or_else(|| DocumentError::MissingLump {
                level: level.name.clone(),
                lump,
            })?;
        if entry.size % record != 0 {
            return Err(DocumentError::BadLumpSize {
                lump,
                size: entry.size,
                record,
            });
        }

        let mut reader = Cursor::new(&self.data[entry.offset..entry.offset + entry.size]);
        let count = entry.size / record;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(read(&mut reader)?);
        }
        debug!("{}: read {} {} records", level.name, count, lump);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::{BoundingBox, BspLevel, Child};
    use crate::config::ReconstructionConfig;
    use crate::map::fixtures;
    use crate::map::linedef::NO_SIDEDEF;
    use byteorder::WriteBytesExt;

    fn tex8(out: &mut Vec<u8>, name: &str) {
        let mut buf = [0u8; 8];
        buf[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&buf);
    }

    fn bbox(out: &mut Vec<u8>, bb: &BoundingBox) {
        for v in [bb.top, bb.bottom, bb.left, bb.right] {
            out.write_i16::<LE>(v as i16).unwrap();
        }
    }

    fn child(c: Child) -> u16 {
        match c {
            Child::Node(i) => i as u16,
            Child::SubSector(i) => i as u16 | 0x8000,
        }
    }

    /// Writes the map records of `map` as DOOM lumps.
    fn map_lumps(map: &Map) -> Vec<(&'static str, Vec<u8>)> {
        let mut things = Vec::new();
        for t in &map.things {
            for v in [t.x, t.y, t.facing, t.doomednum, t.flags] {
                things.write_i16::<LE>(v as i16).unwrap();
            }
        }
        let mut vertexes = Vec::new();
        for v in &map.vertices {
            vertexes.write_i16::<LE>(v.x as i16).unwrap();
            vertexes.write_i16::<LE>(v.y as i16).unwrap();
        }
        let mut linedefs = Vec::new();
        for l in &map.linedefs {
            linedefs.write_u16::<LE>(l.start as u16).unwrap();
            linedefs.write_u16::<LE>(l.end as u16).unwrap();
            for v in [l.flags, l.line_type, l.tag] {
                linedefs.write_i16::<LE>(v as i16).unwrap();
            }
            for side in [l.right, l.left] {
                linedefs
                    .write_u16::<LE>(side.map_or(NO_SIDEDEF, |s| s as u16))
                    .unwrap();
            }
        }
        let mut sidedefs = Vec::new();
        for s in &map.sidedefs {
            sidedefs.write_i16::<LE>(s.x_offset as i16).unwrap();
            sidedefs.write_i16::<LE>(s.y_offset as i16).unwrap();
            tex8(&mut sidedefs, &s.upper_tex);
            tex8(&mut sidedefs, &s.lower_tex);
            tex8(&mut sidedefs, &s.mid_tex);
            sidedefs.write_u16::<LE>(s.sector as u16).unwrap();
        }
        let mut sectors = Vec::new();
        for s in &map.sectors {
            sectors.write_i16::<LE>(s.floor_height as i16).unwrap();
            sectors.write_i16::<LE>(s.ceiling_height as i16).unwrap();
            tex8(&mut sectors, &s.floor_tex);
            tex8(&mut sectors, &s.ceiling_tex);
            for v in [s.light, s.r#type, s.tag] {
                sectors.write_i16::<LE>(v as i16).unwrap();
            }
        }
        let mut segs = Vec::new();
        for s in &map.segs {
            segs.write_u16::<LE>(s.start_vertex as u16).unwrap();
            segs.write_u16::<LE>(s.end_vertex as u16).unwrap();
            segs.write_i16::<LE>(s.angle as i16).unwrap();
            segs.write_u16::<LE>(s.linedef.unwrap_or(0) as u16).unwrap();
            segs.write_i16::<LE>(s.direction as i16).unwrap();
            segs.write_i16::<LE>(s.offset as i16).unwrap();
        }
        let mut ssectors = Vec::new();
        for ss in &map.subsectors {
            ssectors.write_u16::<LE>(ss.num_segs as u16).unwrap();
            ssectors.write_u16::<LE>(ss.first_seg as u16).unwrap();
        }
        let mut nodes = Vec::new();
        for n in &map.nodes {
            for v in [n.x, n.y, n.dx, n.dy] {
                nodes.write_i16::<LE>(v as i16).unwrap();
            }
            bbox(&mut nodes, &n.right_bb);
            bbox(&mut nodes, &n.left_bb);
            nodes.write_u16::<LE>(child(n.right)).unwrap();
            nodes.write_u16::<LE>(child(n.left)).unwrap();
        }
        vec![
            ("THINGS", things),
            ("LINEDEFS", linedefs),
            ("SIDEDEFS", sidedefs),
            ("VERTEXES", vertexes),
            ("SEGS", segs),
            ("SSECTORS", ssectors),
            ("NODES", nodes),
            ("SECTORS", sectors),
        ]
    }

    fn build_wad(ident: &[u8; 4], lumps: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut dir = Vec::new();
        for (name, data) in lumps {
            dir.write_i32::<LE>(12 + body.len() as i32).unwrap();
            dir.write_i32::<LE>(data.len() as i32).unwrap();
            tex8(&mut dir, name);
            body.extend_from_slice(data);
        }
        let mut wad = Vec::new();
        wad.extend_from_slice(ident);
        wad.write_i32::<LE>(lumps.len() as i32).unwrap();
        wad.write_i32::<LE>(12 + body.len() as i32).unwrap();
        wad.extend(body);
        wad.extend(dir);
        wad
    }

    fn halved_room_wad() -> Vec<u8> {
        let mut lumps = vec![("E1M1", Vec::new())];
        lumps.extend(map_lumps(&fixtures::halved_room()));
        lumps.push(("DEMO1", vec![0; 4]));
        build_wad(b"PWAD", &lumps)
    }

    #[test]
    fn test_load_map_matches_source() {
        let doc = Document::load_wad(&mut Cursor::new(halved_room_wad())).unwrap();
        assert_eq!(doc.available_levels(), vec!["E1M1".to_string()]);
        assert_eq!(doc.directory().len(), 10);

        let expected = fixtures::halved_room();
        let map = doc.load_map("e1m1").unwrap();
        assert_eq!(map.name, "E1M1");
        assert_eq!(map.things, expected.things);
        assert_eq!(map.vertices, expected.vertices);
        assert_eq!(map.linedefs, expected.linedefs);
        assert_eq!(map.sidedefs, expected.sidedefs);
        assert_eq!(map.sectors, expected.sectors);
        assert_eq!(map.segs, expected.segs);
        assert_eq!(map.subsectors, expected.subsectors);
        assert_eq!(map.nodes, expected.nodes);
        assert!(map.is_cross_referenced());
    }

    #[test]
    fn test_loaded_map_reconstructs() {
        let doc = Document::load_wad(&mut Cursor::new(halved_room_wad())).unwrap();
        let map = doc.load_map("E1M1").unwrap();
        let level = BspLevel::reconstruct(map, ReconstructionConfig::default()).unwrap();
        assert!(level.map().subsectors.iter().all(|ss| ss.is_closed()));
        assert_eq!(level.locate(32.0, 32.0), Some(1));
    }

    #[test]
    fn test_invalid_identifier() {
        let wad = build_wad(b"JUNK", &[]);
        assert!(matches!(
            Document::load_wad(&mut Cursor::new(wad)),
            Err(DocumentError::InvalidIdentifier(ident)) if ident == "JUNK"
        ));
    }

    #[test]
    fn test_directory_out_of_bounds() {
        let mut wad = build_wad(b"IWAD", &[]);
        wad[8..12].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            Document::load_wad(&mut Cursor::new(wad)),
            Err(DocumentError::DirectoryOutOfBounds { offset: 1000, .. })
        ));
    }

    #[test]
    fn test_missing_level_and_lumps() {
        let mut lumps = map_lumps(&fixtures::halved_room());
        lumps.retain(|(name, _)| *name != "NODES" && *name != "THINGS");
        lumps.insert(0, ("MAP01", Vec::new()));
        let doc = Document::load_wad(&mut Cursor::new(build_wad(b"PWAD", &lumps))).unwrap();

        assert!(matches!(doc.load_map("MAP02"), Err(DocumentError::LevelNotFound(_))));
        assert!(matches!(
            doc.load_map("MAP01"),
            Err(DocumentError::MissingLump { lump: "NODES", .. })
        ));
    }

    #[test]
    fn test_bad_lump_size() {
        let mut lumps = map_lumps(&fixtures::halved_room());
        for (name, data) in lumps.iter_mut() {
            if *name == "VERTEXES" {
                data.extend_from_slice(&[0, 0]);
            }
        }
        lumps.insert(0, ("MAP01", Vec::new()));
        let doc = Document::load_wad(&mut Cursor::new(build_wad(b"PWAD", &lumps))).unwrap();
        assert!(matches!(
            doc.load_map("MAP01"),
            Err(DocumentError::BadLumpSize { lump: "VERTEXES", size: 26, record: 4 })
        ));
    }

    #[test]
    fn test_level_markers() {
        assert!(Document::is_level_marker("MAP01"));
        assert!(Document::is_level_marker("e2m9"));
        assert!(!Document::is_level_marker("MAP1"));
        assert!(!Document::is_level_marker("EXM1"));
        assert!(!Document::is_level_marker("THINGS"));
    }

    #[test]
    fn test_group_levels_stops_at_other_lumps() {
        let entry = |name: &str| LumpEntry {
            offset: 0,
            size: 0,
            name: name.to_string(),
        };
        let directory = vec![
            entry("PLAYPAL"),
            entry("MAP01"),
            entry("THINGS"),
            entry("VERTEXES"),
            entry("ENDOOM"),
            entry("NODES"),
            entry("MAP02"),
            entry("SEGS"),
        ];
        let levels = Document::group_levels(&directory);
        assert_eq!(
            levels,
            vec![
                LevelInfo {
                    name: "MAP01".into(),
                    lump_indices: vec![1, 2, 3],
                },
                LevelInfo {
                    name: "MAP02".into(),
                    lump_indices: vec![6, 7],
                },
            ]
        );
    }
}
