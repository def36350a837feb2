// src/lib.rs

pub mod bsp;
pub mod config;
pub mod document;
pub mod map;
pub mod mesh;
pub mod utils;
