// src/bsp/bsp_closure.rs
//! Leaf closure.
//!
//! The segs stored for a subsector only cover its walls. Wherever the leaf
//! borders another leaf the outline has gaps, and those gaps lie along
//! partition lines, so the implicit segments synthesized there can fill
//! them.
//!
//! Each leaf's segs go into a [`SegmentGraph`] as directed edges (a seg
//! keeps its subsector on the right, so a closed outline runs clockwise).
//! Open chains are then extended one implicit segment at a time from their
//! open end until the graph is a single cycle.

use log::{debug, trace, warn};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::bsp::{BspError, BspLevel, Child, Line2D, Side, COINCIDENT_EPSILON};
use crate::map::{LoopEdge, Map, SegRef};
use crate::utils::geometry::{segment_intersect, signed_area2, vector_angle, Point2D};

/// Sine of the turn angle below which a continuation counts as straight.
const TURN_TOLERANCE: f64 = 1e-6;

/// How far each seg midpoint is pushed into the leaf when estimating an
/// interior point.
const INTERIOR_NUDGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GraphEdge {
    pub(super) from: usize,
    pub(super) to: usize,
    pub(super) seg: SegRef,
}

/// Directed edges between canonical vertex keys. Map vertices closer than
/// [`COINCIDENT_EPSILON`] share a key; connected components are tracked in
/// a union-find forest.
pub(crate) struct SegmentGraph {
    pub(super) points: Vec<Point2D>,
    /// First map vertex seen at each key.
    pub(super) vertices: Vec<usize>,
    pub(super) edges: Vec<GraphEdge>,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
    components: QuickUnionUf<UnionBySize>,
}

impl SegmentGraph {
    pub(crate) fn new() -> Self {
        SegmentGraph {
            points: Vec::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
            in_degree: Vec::new(),
            out_degree: Vec::new(),
            components: QuickUnionUf::new(0),
        }
    }

    pub(crate) fn key_of(&self, point: Point2D) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.distance_to(point) < COINCIDENT_EPSILON)
    }

    fn key_for(&mut self, point: Point2D, vertex: usize) -> usize {
        if let Some(key) = self.key_of(point) {
            return key;
        }
        self.points.push(point);
        self.vertices.push(vertex);
        self.in_degree.push(0);
        self.out_degree.push(0);
        self.components.insert(UnionBySize::default())
    }

    /// Adds the directed edge `start -> end` carried by `seg`.
    pub(crate) fn add_edge(&mut self, map: &Map, start: usize, end: usize, seg: SegRef) {
        let from = self.key_for(map.point(start), start);
        let to = self.key_for(map.point(end), end);
        self.out_degree[from] += 1;
        self.in_degree[to] += 1;
        self.components.union(from, to);
        self.edges.push(GraphEdge { from, to, seg });
    }

    pub(crate) fn contains_seg(&self, seg: SegRef) -> bool {
        self.edges.iter().any(|e| e.seg == seg)
    }

    pub(crate) fn in_degree_at(&self, point: Point2D) -> usize {
        self.key_of(point).map_or(0, |k| self.in_degree[k])
    }

    /// First edge, in insertion order, whose end has nothing leaving it.
    pub(crate) fn open_head(&self) -> Option<GraphEdge> {
        self.edges
            .iter()
            .find(|e| self.out_degree[e.to] == 0)
            .copied()
    }

    pub(crate) fn component_count(&mut self) -> usize {
        let mut roots: Vec<usize> = (0..self.points.len())
            .map(|k| self.components.find(k))
            .collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    /// True when every key has exactly one edge in and one out and all of
    /// them are connected.
    pub(crate) fn is_single_cycle(&mut self) -> bool {
        !self.edges.is_empty()
            && self.in_degree.iter().all(|&d| d == 1)
            && self.out_degree.iter().all(|&d| d == 1)
            && self.component_count() == 1
    }
}

/// An implicit segment that can extend the open head.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    implicit: usize,
    far_vertex: usize,
    angle: f64,
}

impl BspLevel {
    /// Closes every subsector and caches the loops on them. Returns how many
    /// ended up with a non-empty loop.
    pub fn close_subsectors(&mut self) -> Result<usize, BspError> {
        let mut closed = 0;
        for ss in 0..self.map.subsectors.len() {
            let edges = self.close_subsector(ss)?;
            if !edges.is_empty() {
                closed += 1;
            }
            self.map.subsectors[ss].complete_segments = edges;
        }
        Ok(closed)
    }

    /// Builds the closed outline of one subsector without caching it.
    pub fn close_subsector(&self, subsector: usize) -> Result<Vec<LoopEdge>, BspError> {
        self.check_subsector(subsector)?;
        let segs: Vec<SegRef> = self.map.subsectors[subsector]
            .seg_range()
            .map(SegRef::Real)
            .filter(|&seg| {
                let (a, b) = self.map.segment_points(seg);
                a.distance_to(b) >= COINCIDENT_EPSILON
            })
            .collect();
        if segs.is_empty() {
            warn!("subsector {} has no usable segs, leaving it open", subsector);
            return Ok(Vec::new());
        }

        let mut graph = SegmentGraph::new();
        for &seg in &segs {
            let s = self.map.segment(seg);
            graph.add_edge(&self.map, s.start_vertex, s.end_vertex, seg);
        }
        let interior = interior_point(&self.map, &segs);
        let halfplanes = self.leaf_halfplanes(subsector);

        let cap = self.config.max_closure_iterations;
        let mut splices = 0;
        while !graph.is_single_cycle() {
            let Some(head) = graph.open_head() else {
                return Err(BspError::UnclosableLeaf {
                    subsector,
                    vertex: graph.vertices[0],
                    reason: format!(
                        "segments form {} separate pieces with no open end",
                        graph.component_count()
                    ),
                });
            };
            if splices >= cap {
                return Err(BspError::IterationCap { subsector, cap });
            }

            let here_vertex = graph.vertices[head.to];
            let candidate = self
                .pick_candidate(&graph, head, &halfplanes, interior)
                .ok_or_else(|| BspError::UnclosableLeaf {
                    subsector,
                    vertex: here_vertex,
                    reason: "no implicit segment continues the outline".to_string(),
                })?;
            trace!(
                "subsector {}: {} -> {} via implicit segment {}",
                subsector,
                here_vertex,
                candidate.far_vertex,
                candidate.implicit
            );
            graph.add_edge(
                &self.map,
                here_vertex,
                candidate.far_vertex,
                SegRef::Implicit(candidate.implicit),
            );
            splices += 1;
        }

        let edges = graph.walk();
        debug!(
            "subsector {}: closed with {} edges after {} splices",
            subsector,
            edges.len(),
            splices
        );
        Ok(edges)
    }

    /// The half-planes of every ancestor partition, nearest node first,
    /// each with the side the leaf lies on. Empty for an unknown subsector.
    pub fn leaf_halfplanes(&self, subsector: usize) -> Vec<(Line2D, Side)> {
        let mut planes = Vec::new();
        let mut child = Child::SubSector(subsector);
        let mut current = self.map.subsectors.get(subsector).and_then(|ss| ss.node);
        while let Some(n) = current {
            let node = &self.map.nodes[n];
            if let Some(side) = node.side_of_child(child) {
                planes.push((node.splitting_line(), side));
            }
            child = Child::Node(n);
            current = node.parent;
        }
        planes
    }

    fn pick_candidate(
        &self,
        graph: &SegmentGraph,
        head: GraphEdge,
        halfplanes: &[(Line2D, Side)],
        interior: Point2D,
    ) -> Option<Candidate> {
        let prev = graph.points[head.from];
        let here = graph.points[head.to];
        let incoming = here - prev;
        let tolerance = self.config.region_tolerance;

        let mut best: Option<Candidate> = None;
        for (i, seg) in self.map.implicit_segs.iter().enumerate() {
            if graph.contains_seg(SegRef::Implicit(i)) {
                continue;
            }
            let (a, b) = (self.map.point(seg.start_vertex), self.map.point(seg.end_vertex));
            let (far_vertex, far) = if a.distance_to(here) < COINCIDENT_EPSILON {
                (seg.end_vertex, b)
            } else if b.distance_to(here) < COINCIDENT_EPSILON {
                (seg.start_vertex, a)
            } else {
                continue;
            };
            let outgoing = far - here;
            let len = incoming.length() * outgoing.length();
            if len == 0.0 {
                continue;
            }

            let sin = signed_area2(prev, here, far) / len;
            if sin.abs() <= TURN_TOLERANCE && incoming.dot(outgoing) < 0.0 {
                trace!("implicit segment {}: folds back over the open edge", i);
                continue;
            }
            if sin > TURN_TOLERANCE {
                trace!("implicit segment {}: turns left", i);
                continue;
            }
            if graph.in_degree_at(far) > 0 {
                trace!("implicit segment {}: vertex {} already entered", i, far_vertex);
                continue;
            }
            let mid = (here + far) * 0.5;
            if !within_halfplanes(far, halfplanes, tolerance)
                || !within_halfplanes(mid, halfplanes, tolerance)
            {
                trace!("implicit segment {}: leaves the leaf region", i);
                continue;
            }
            let blocked = graph.edges.iter().any(|e| {
                segment_intersect(mid, interior, graph.points[e.from], graph.points[e.to]).is_some()
            });
            if blocked {
                trace!("implicit segment {}: hidden from the interior", i);
                continue;
            }

            let angle = vector_angle(incoming, outgoing);
            if best.map_or(true, |b| angle < b.angle) {
                best = Some(Candidate {
                    implicit: i,
                    far_vertex,
                    angle,
                });
            }
        }
        best
    }
}

/// Mean of the seg midpoints, each pushed a little to the seg's right.
fn interior_point(map: &Map, segs: &[SegRef]) -> Point2D {
    let mut sum = Point2D::default();
    for &seg in segs {
        let (a, b) = map.segment_points(seg);
        let d = b - a;
        let right = Point2D::new(d.y, -d.x).normalized();
        sum = sum + (a + b) * 0.5 + right * INTERIOR_NUDGE;
    }
    sum * (1.0 / segs.len() as f64)
}

fn within_halfplanes(p: Point2D, halfplanes: &[(Line2D, Side)], tolerance: f64) -> bool {
    halfplanes.iter().all(|(line, side)| {
        let d = line.signed_distance(p);
        match side {
            Side::Right => d <= tolerance,
            Side::Left => d >= -tolerance,
        }
    })
}
