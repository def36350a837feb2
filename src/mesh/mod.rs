// src/mesh/mod.rs
pub mod builder;

pub use builder::{seg_walls, strip_fan, Face, MeshBuilder, Scene, Surface};
