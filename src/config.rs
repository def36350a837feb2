// src/config.rs
//! Tunables for reconstruction and export, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```
//! use rusted_bsp::config::ReconstructionConfig;
//!
//! let config = ReconstructionConfig::from_json_str(r#"{ "center_mesh": false }"#).unwrap();
//! assert!(!config.center_mesh);
//! assert_eq!(config.distance_threshold, 5.0);
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bsp::{DISTANCE_THRESHOLD, MAX_CLOSURE_ITERATIONS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Map units within which a vertex counts as lying on a partition line.
    pub distance_threshold: f64,
    /// Splices allowed per subsector before giving up.
    pub max_closure_iterations: usize,
    /// How far a closing segment may stray outside its leaf's half-planes.
    pub region_tolerance: f64,
    /// Shift exported geometry so the map's bounding box is centred on the origin.
    pub center_mesh: bool,
    pub skip_sky_ceilings: bool,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        ReconstructionConfig {
            distance_threshold: DISTANCE_THRESHOLD,
            max_closure_iterations: MAX_CLOSURE_ITERATIONS,
            region_tolerance: 1.0,
            center_mesh: true,
            skip_sky_ceilings: true,
        }
    }
}

impl ReconstructionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            ReconstructionConfig::from_json_str(r#"{ "max_closure_iterations": 12 }"#).unwrap();
        assert_eq!(config.max_closure_iterations, 12);
        assert_eq!(config.distance_threshold, DISTANCE_THRESHOLD);
        assert!(config.skip_sky_ceilings);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let err = ReconstructionConfig::from_json_str(r#"{ "center_mesh": "yes" }"#);
        assert!(matches!(err, Err(ConfigError::Parse(_))));
        let err = ReconstructionConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ReconstructionConfig {
            region_tolerance: 0.25,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ReconstructionConfig::from_json_str(&json).unwrap(), config);
    }
}
