// src/map/fixtures.rs
//! Small hand-built levels shared by the unit tests.
//!
//! Both are the same 128x128 room. `halved_room` splits it once along
//! x = 64; `three_leaf_room` further cuts the east half along y = 64.

use crate::bsp::{BoundingBox, BspNode, Child};
use crate::map::linedef::ML_BLOCKING;
use crate::map::{LineDef, Map, Sector, Segment, SideDef, SubSector, Thing};

fn seg(start: usize, end: usize, linedef: usize, offset: i32) -> Segment {
    Segment {
        start_vertex: start,
        end_vertex: end,
        angle: 0,
        linedef: Some(linedef),
        direction: 0,
        offset,
        implicit: false,
    }
}

fn one_sided(start: usize, end: usize, side: usize) -> LineDef {
    LineDef {
        start,
        end,
        flags: ML_BLOCKING,
        line_type: 0,
        tag: 0,
        right: Some(side),
        left: None,
    }
}

/// Vertices 0-3 are the room corners (clockwise from the origin), 4 and 5
/// the points where x = 64 meets the north and south walls.
fn room(name: &str, ceiling_tex: &str) -> Map {
    let mut map = Map::new(name);
    for (x, y) in [
        (0.0, 0.0),
        (0.0, 128.0),
        (128.0, 128.0),
        (128.0, 0.0),
        (64.0, 128.0),
        (64.0, 0.0),
    ] {
        map.add_vertex(x, y).unwrap();
    }
    map.linedefs = vec![
        one_sided(0, 1, 0),
        one_sided(1, 2, 1),
        one_sided(2, 3, 2),
        one_sided(3, 0, 3),
    ];
    map.sidedefs = (0..4)
        .map(|_| SideDef::new(0, 0, "-".into(), "-".into(), "STARTAN2".into(), 0))
        .collect();
    map.sectors = vec![Sector::new(0, 128, "FLOOR4_8".into(), ceiling_tex.into(), 160, 0, 0)];
    map.things = vec![Thing {
        x: 32,
        y: 32,
        facing: 90,
        doomednum: 1,
        flags: 7,
    }];
    map
}

pub(crate) fn halved_room() -> Map {
    halved_room_with_ceiling("CEIL3_5")
}

pub(crate) fn halved_room_with_ceiling(ceiling_tex: &str) -> Map {
    let mut map = room("HALVED", ceiling_tex);
    map.segs = vec![
        seg(4, 2, 1, 64),
        seg(2, 3, 2, 0),
        seg(3, 5, 3, 0),
        seg(0, 1, 0, 0),
        seg(1, 4, 1, 0),
        seg(5, 0, 3, 64),
    ];
    map.subsectors = vec![SubSector::new(0, 3), SubSector::new(3, 3)];
    map.nodes = vec![BspNode::new(
        64.0,
        0.0,
        0.0,
        128.0,
        BoundingBox::new(128.0, 0.0, 64.0, 128.0),
        BoundingBox::new(128.0, 0.0, 0.0, 64.0),
        Child::SubSector(0),
        Child::SubSector(1),
    )];
    map.build_cross_references().unwrap();
    map
}

/// Leaves: 0 is the north-east quarter, 1 the south-east quarter and 2 the
/// west half. Node 0 splits along y = 64 heading east, node 1 (the root)
/// along x = 64 heading north.
pub(crate) fn three_leaf_room() -> Map {
    let mut map = room("THREE", "CEIL3_5");
    map.add_vertex(128.0, 64.0).unwrap();
    map.segs = vec![
        seg(4, 2, 1, 64),
        seg(2, 6, 2, 0),
        seg(6, 3, 2, 64),
        seg(3, 5, 3, 0),
        seg(0, 1, 0, 0),
        seg(1, 4, 1, 0),
        seg(5, 0, 3, 64),
    ];
    map.subsectors = vec![
        SubSector::new(0, 2),
        SubSector::new(2, 2),
        SubSector::new(4, 3),
    ];
    map.nodes = vec![
        BspNode::new(
            64.0,
            64.0,
            64.0,
            0.0,
            BoundingBox::new(64.0, 0.0, 64.0, 128.0),
            BoundingBox::new(128.0, 64.0, 64.0, 128.0),
            Child::SubSector(1),
            Child::SubSector(0),
        ),
        BspNode::new(
            64.0,
            0.0,
            0.0,
            128.0,
            BoundingBox::new(128.0, 0.0, 64.0, 128.0),
            BoundingBox::new(128.0, 0.0, 0.0, 64.0),
            Child::Node(0),
            Child::SubSector(2),
        ),
    ];
    map.build_cross_references().unwrap();
    map
}
