// src/document/mod.rs
mod document;

pub use self::document::{Document, DocumentError, LevelInfo, LumpEntry};
