// src/map/level.rs

use log::debug;
use thiserror::Error;

use crate::bsp::{BoundingBox, BspNode, Child, Side};
use crate::map::{LineDef, SegRef, Sector, Segment, SideDef, SubSector, Thing, Vertex};
use crate::utils::geometry::Point2D;

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("vertex coordinates must be numbers, got ({x}, {y})")]
    InvalidVertex { x: f64, y: f64 },

    #[error("{kind} index {index} is out of range ({len} available)")]
    DanglingReference {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("node {node} refers to node {child}, which does not precede it")]
    TreeOrder { node: usize, child: usize },

    #[error("{kind} {index} hangs under more than one node")]
    SharedChild { kind: &'static str, index: usize },
}

/// All geometry of one level, addressed by index.
///
/// Real segments are fixed once loaded. Vertices and implicit segments only
/// grow, so indices handed out earlier stay valid for the whole pass.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pub name: String,
    pub things: Vec<Thing>,
    pub vertices: Vec<Vertex>,
    pub linedefs: Vec<LineDef>,
    pub sidedefs: Vec<SideDef>,
    pub sectors: Vec<Sector>,
    pub segs: Vec<Segment>,
    pub implicit_segs: Vec<Segment>,
    pub subsectors: Vec<SubSector>,
    pub nodes: Vec<BspNode>,
    bounds: Option<BoundingBox>,
    vertex_linedefs: Vec<Vec<usize>>,
}

impl Map {
    pub fn new(name: &str) -> Self {
        Map {
            name: name.to_string(),
            ..Default::default()
        }
    }

    // --- Creation ---

    /// Appends a vertex and returns its index. NaN coordinates are refused.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Result<usize, MapError> {
        if x.is_nan() || y.is_nan() {
            return Err(MapError::InvalidVertex { x, y });
        }
        self.vertices.push(Vertex::new(x, y));
        Ok(self.vertices.len() - 1)
    }

    pub fn add_implicit_segment(&mut self, start: usize, end: usize) -> usize {
        self.implicit_segs.push(Segment::new_implicit(start, end));
        self.implicit_segs.len() - 1
    }

    /// Cuts implicit segment `index` at `(x, y)`.
    ///
    /// The existing segment keeps its start and now ends at the new vertex;
    /// a new implicit segment covers the rest. Returns the new segment's
    /// index.
    pub fn split_implicit_segment(&mut self, index: usize, x: f64, y: f64) -> Result<usize, MapError> {
        let len = self.implicit_segs.len();
        if index >= len {
            return Err(MapError::DanglingReference {
                kind: "implicit segment",
                index,
                len,
            });
        }
        let vertex = self.add_vertex(x, y)?;
        let old_end = self.implicit_segs[index].end_vertex;
        self.implicit_segs[index].end_vertex = vertex;
        Ok(self.add_implicit_segment(vertex, old_end))
    }

    // --- Queries ---

    pub fn point(&self, vertex: usize) -> Point2D {
        self.vertices[vertex].point()
    }

    pub fn segment(&self, seg: SegRef) -> &Segment {
        match seg {
            SegRef::Real(i) => &self.segs[i],
            SegRef::Implicit(i) => &self.implicit_segs[i],
        }
    }

    pub fn segment_points(&self, seg: SegRef) -> (Point2D, Point2D) {
        let s = self.segment(seg);
        (self.point(s.start_vertex), self.point(s.end_vertex))
    }

    /// Every segment, real ones first.
    pub fn segment_refs(&self) -> impl Iterator<Item = SegRef> {
        (0..self.segs.len())
            .map(SegRef::Real)
            .chain((0..self.implicit_segs.len()).map(SegRef::Implicit))
    }

    pub fn subsector_segs(&self, subsector: usize) -> &[Segment] {
        &self.segs[self.subsectors[subsector].seg_range()]
    }

    /// Linear scan over real and implicit segments.
    pub fn segment_exists(&self, a: usize, b: usize, order_sensitive: bool) -> bool {
        self.segs
            .iter()
            .chain(self.implicit_segs.iter())
            .any(|s| s.connects(a, b, order_sensitive))
    }

    /// True when some linedef touches both vertices, either directly or
    /// through the segs cut from it.
    pub fn is_on_same_linedef(&self, a: usize, b: usize) -> bool {
        match (self.vertex_linedefs.get(a), self.vertex_linedefs.get(b)) {
            (Some(la), Some(lb)) => la.iter().any(|l| lb.contains(l)),
            _ => false,
        }
    }

    pub fn root_node(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    /// Bounds of the loaded vertices. Cached by the cross-reference pass.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds.unwrap_or_else(|| self.compute_bounds())
    }

    fn compute_bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new_empty();
        for v in &self.vertices {
            bounds.expand_point(v.x, v.y);
        }
        bounds
    }

    pub fn sector_of_subsector(&self, subsector: usize) -> Option<&Sector> {
        self.subsectors[subsector]
            .sector
            .and_then(|s| self.sectors.get(s))
    }

    // --- Cross references ---

    pub fn is_cross_referenced(&self) -> bool {
        self.bounds.is_some()
    }

    /// Validates every stored index and fills in the back-references the
    /// reconstruction relies on: node parents, each subsector's node and
    /// sector, the vertex-to-linedef index and the map bounds.
    pub fn build_cross_references(&mut self) -> Result<(), MapError> {
        self.validate_references()?;

        for node in self.nodes.iter_mut() {
            node.parent = None;
            node.branch = None;
        }
        for ss in self.subsectors.iter_mut() {
            ss.node = None;
        }

        for i in 0..self.nodes.len() {
            for side in [Side::Right, Side::Left] {
                match self.nodes[i].child(side) {
                    Child::Node(c) => {
                        if c >= i {
                            return Err(MapError::TreeOrder { node: i, child: c });
                        }
                        if self.nodes[c].parent.is_some() {
                            return Err(MapError::SharedChild { kind: "node", index: c });
                        }
                        self.nodes[c].parent = Some(i);
                        self.nodes[c].branch = Some(side);
                    }
                    Child::SubSector(s) => {
                        if self.subsectors[s].node.is_some() {
                            return Err(MapError::SharedChild { kind: "subsector", index: s });
                        }
                        self.subsectors[s].node = Some(i);
                    }
                }
            }
        }

        for i in 0..self.subsectors.len() {
            let sector = self.subsector_segs(i).first().and_then(|seg| {
                let line = &self.linedefs[seg.linedef?];
                let side = line.front_side(seg.direction)?;
                self.sidedefs.get(side).map(|sd| sd.sector)
            });
            self.subsectors[i].sector = sector;
        }

        let mut vertex_linedefs = vec![Vec::new(); self.vertices.len()];
        for (i, line) in self.linedefs.iter().enumerate() {
            vertex_linedefs[line.start].push(i);
            vertex_linedefs[line.end].push(i);
        }
        for seg in &self.segs {
            if let Some(l) = seg.linedef {
                for v in [seg.start_vertex, seg.end_vertex] {
                    if !vertex_linedefs[v].contains(&l) {
                        vertex_linedefs[v].push(l);
                    }
                }
            }
        }
        self.vertex_linedefs = vertex_linedefs;
        self.bounds = Some(self.compute_bounds());

        debug!(
            "{}: cross-referenced {} nodes, {} subsectors, {} segs",
            self.name,
            self.nodes.len(),
            self.subsectors.len(),
            self.segs.len()
        );
        Ok(())
    }

    fn validate_references(&self) -> Result<(), MapError> {
        let check = |kind: &'static str, index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(MapError::DanglingReference { kind, index, len })
            }
        };

        let nv = self.vertices.len();
        for line in &self.linedefs {
            check("vertex", line.start, nv)?;
            check("vertex", line.end, nv)?;
            for side in [line.right, line.left].into_iter().flatten() {
                check("sidedef", side, self.sidedefs.len())?;
            }
        }
        for side in &self.sidedefs {
            check("sector", side.sector, self.sectors.len())?;
        }
        for seg in &self.segs {
            check("vertex", seg.start_vertex, nv)?;
            check("vertex", seg.end_vertex, nv)?;
            if let Some(l) = seg.linedef {
                check("linedef", l, self.linedefs.len())?;
            }
        }
        for ss in &self.subsectors {
            if ss.num_segs > 0 {
                check("seg", ss.first_seg + ss.num_segs - 1, self.segs.len())?;
            }
        }
        for node in &self.nodes {
            for child in [node.right, node.left] {
                match child {
                    Child::Node(c) => check("node", c, self.nodes.len())?,
                    Child::SubSector(s) => check("subsector", s, self.subsectors.len())?,
                }
            }
        }
        Ok(())
    }
}
