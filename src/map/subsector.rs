// src/map/subsector.rs
use std::io::{self, Read, Seek};
use std::ops::Range;
use byteorder::{LE, ReadBytesExt};
use serde::Serialize;

use crate::map::segment::SegRef;

/// One oriented edge of a closed subsector outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopEdge {
    pub start_vertex: usize,
    pub end_vertex: usize,
    pub seg: SegRef,
}

/// A BSP leaf (SSECTORS lump, 4 bytes: seg count then first seg).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubSector {
    pub num_segs: usize,
    pub first_seg: usize,
    /// Node whose child this leaf is. Set by the cross-reference pass.
    pub node: Option<usize>,
    pub sector: Option<usize>,
    /// Closed outline, filled in by leaf closure.
    pub complete_segments: Vec<LoopEdge>,
}

impl SubSector {
    pub fn new(first_seg: usize, num_segs: usize) -> Self {
        SubSector {
            num_segs,
            first_seg,
            ..Default::default()
        }
    }

    pub fn from_wad<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let num_segs = reader.read_u16::<LE>()? as usize;
        let first_seg = reader.read_u16::<LE>()? as usize;
        Ok(SubSector::new(first_seg, num_segs))
    }

    pub fn seg_range(&self) -> Range<usize> {
        self.first_seg..self.first_seg + self.num_segs
    }

    pub fn is_closed(&self) -> bool {
        !self.complete_segments.is_empty()
    }
}
