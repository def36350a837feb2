// src/mesh/builder.rs
//! Triangle meshes from closed subsector outlines.
//!
//! Every subsector contributes a floor, a ceiling and one quad per wall
//! section of each real seg on its outline. Faces are grouped by texture
//! name into [`Surface`]s. Z points up and map units are kept as-is.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::bsp::BspLevel;
use crate::map::sidedef::texture_present;
use crate::map::{Map, SegRef, Sector};
use crate::utils::geometry::Point2D;

/// All triangles sharing one texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub material: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Surface {
    fn new(material: &str) -> Self {
        Surface {
            material: material.to_string(),
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    fn append(&mut self, face: Face) {
        let base = self.positions.len() as u32;
        self.positions.extend(face.positions);
        self.normals.extend(face.normals);
        self.indices.extend(face.indices.into_iter().map(|i| base + i));
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub name: String,
    /// Sorted by material name.
    pub surfaces: Vec<Surface>,
}

impl Scene {
    pub fn surface(&self, material: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.material == material)
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(Surface::triangle_count).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

/// One textured polygon, indexed locally, before it is merged into a
/// [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub material: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

pub struct MeshBuilder<'a> {
    level: &'a BspLevel,
    offset: Point2D,
    skip_sky: bool,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(level: &'a BspLevel) -> Self {
        let config = level.config();
        let offset = if config.center_mesh {
            level.map().bounds().center()
        } else {
            Point2D::default()
        };
        MeshBuilder {
            level,
            offset,
            skip_sky: config.skip_sky_ceilings,
        }
    }

    /// Triangulates every subsector in parallel and merges the faces in
    /// subsector order.
    pub fn build(&self) -> Scene {
        let map = self.level.map();
        let per_subsector: Vec<Vec<Face>> = (0..map.subsectors.len())
            .into_par_iter()
            .map(|ss| self.subsector_faces(ss))
            .collect();

        let mut surfaces: BTreeMap<String, Surface> = BTreeMap::new();
        for face in per_subsector.into_iter().flatten() {
            surfaces
                .entry(face.material.clone())
                .or_insert_with(|| Surface::new(&face.material))
                .append(face);
        }

        let scene = Scene {
            name: map.name.clone(),
            surfaces: surfaces.into_values().collect(),
        };
        info!(
            "{}: mesh has {} surfaces, {} triangles",
            scene.name,
            scene.surfaces.len(),
            scene.triangle_count()
        );
        scene
    }

    pub fn subsector_faces(&self, subsector: usize) -> Vec<Face> {
        let map = self.level.map();
        let mut faces = Vec::new();
        let Some(sector) = map.sector_of_subsector(subsector) else {
            debug!("subsector {} has no sector, skipping", subsector);
            return faces;
        };
        let outline = self.level.polygon(subsector);
        if outline.len() < 3 {
            debug!("subsector {} has no closed outline, skipping", subsector);
            return faces;
        }

        // The outline runs clockwise; floors need it counter-clockwise to
        // face up.
        let ccw: Vec<Point2D> = outline.iter().rev().copied().collect();
        if texture_present(&sector.floor_tex) {
            faces.push(self.flat(&sector.floor_tex, &ccw, sector.floor_height, 1.0));
        }
        if texture_present(&sector.ceiling_tex) && !(self.skip_sky && sector.has_sky_ceiling()) {
            faces.push(self.flat(&sector.ceiling_tex, &outline, sector.ceiling_height, -1.0));
        }

        for edge in &map.subsectors[subsector].complete_segments {
            if let SegRef::Real(seg) = edge.seg {
                faces.extend(seg_walls(map, seg, self.offset, self.skip_sky));
            }
        }
        faces
    }

    fn flat(&self, material: &str, points: &[Point2D], height: i32, facing: f32) -> Face {
        let z = height as f32;
        Face {
            material: material.to_string(),
            positions: points.iter().map(|&p| position(p, self.offset, z)).collect(),
            normals: vec![[0.0, 0.0, facing]; points.len()],
            indices: strip_fan(points.len()),
        }
    }
}

/// Wall quads for real seg `seg`, seen from its front side.
///
/// One-sided lines get a single floor-to-ceiling quad. Two-sided lines get
/// a lower quad where the floor steps up, an upper quad where the ceiling
/// steps down (not between two skies) and a middle quad over the opening
/// when a mid texture is set.
pub fn seg_walls(map: &Map, seg: usize, offset: Point2D, skip_sky: bool) -> Vec<Face> {
    let mut faces = Vec::new();
    let s = &map.segs[seg];
    let Some(line) = s.linedef.and_then(|l| map.linedefs.get(l)) else {
        return faces;
    };
    let Some(front_side) = line.front_side(s.direction).and_then(|i| map.sidedefs.get(i)) else {
        return faces;
    };
    let Some(front) = map.sectors.get(front_side.sector) else {
        return faces;
    };
    let (a, b) = map.segment_points(SegRef::Real(seg));
    let back = line
        .is_two_sided()
        .then(|| line.back_side(s.direction))
        .flatten()
        .and_then(|i| map.sidedefs.get(i))
        .and_then(|side| map.sectors.get(side.sector));

    let mut push = |material: &str, low: i32, high: i32| {
        if let Some(face) = wall_quad(material, a, b, low, high, offset) {
            faces.push(face);
        }
    };

    match back {
        None => push(&front_side.mid_tex, front.floor_height, front.ceiling_height),
        Some(back) => {
            if back.floor_height > front.floor_height {
                push(&front_side.lower_tex, front.floor_height, back.floor_height);
            }
            if back.ceiling_height < front.ceiling_height && !(skip_sky && both_sky(front, back)) {
                push(&front_side.upper_tex, back.ceiling_height, front.ceiling_height);
            }
            push(
                &front_side.mid_tex,
                front.floor_height.max(back.floor_height),
                front.ceiling_height.min(back.ceiling_height),
            );
        }
    }
    faces
}

fn both_sky(front: &Sector, back: &Sector) -> bool {
    front.has_sky_ceiling() && back.has_sky_ceiling()
}

fn wall_quad(
    material: &str,
    a: Point2D,
    b: Point2D,
    low: i32,
    high: i32,
    offset: Point2D,
) -> Option<Face> {
    if !texture_present(material) || low >= high {
        return None;
    }
    let d = (b - a).normalized();
    let normal = [d.y as f32, -d.x as f32, 0.0];
    let (low, high) = (low as f32, high as f32);
    Some(Face {
        material: material.to_string(),
        positions: vec![
            position(a, offset, low),
            position(b, offset, low),
            position(b, offset, high),
            position(a, offset, high),
        ],
        normals: vec![normal; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    })
}

fn position(p: Point2D, offset: Point2D, z: f32) -> [f32; 3] {
    [(p.x - offset.x) as f32, (p.y - offset.y) as f32, z]
}

/// Triangulates a convex polygon of `n` points by alternately cutting a
/// triangle off the front and the back, keeping the input winding.
pub fn strip_fan(n: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(n.saturating_sub(2) * 3);
    if n < 3 {
        return indices;
    }
    let (mut l, mut r) = (0u32, n as u32 - 1);
    let mut from_front = true;
    while r - l >= 2 {
        if from_front {
            indices.extend([l, l + 1, r]);
            l += 1;
        } else {
            indices.extend([l, r - 1, r]);
            r -= 1;
        }
        from_front = !from_front;
    }
    indices
}
