//! # rusted_bsp
//!
//! Rebuilds closed subsector outlines for one level of a DOOM WAD and
//! optionally writes them out as a triangle mesh and a JSON debug dump.
//!
//! ```bash
//! rusted_bsp doom1.wad E1M1 --mesh e1m1.json --debug e1m1-bsp.json
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use rusted_bsp::bsp::debug_viz::DebugSnapshot;
use rusted_bsp::bsp::BspLevel;
use rusted_bsp::config::ReconstructionConfig;
use rusted_bsp::document::Document;
use rusted_bsp::mesh::MeshBuilder;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// WAD file to read
    #[arg(value_name = "WAD")]
    wad: PathBuf,

    /// Level marker, e.g. E1M1 or MAP01 (default: the first level)
    #[arg(value_name = "LEVEL")]
    level: Option<String>,

    /// JSON file overriding reconstruction settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the triangle mesh here
    #[arg(long, value_name = "FILE")]
    mesh: Option<PathBuf>,

    /// Write partition lines and subsector outlines here
    #[arg(long, value_name = "FILE")]
    debug: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => ReconstructionConfig::from_json_file(path)?,
        None => ReconstructionConfig::default(),
    };

    let doc = Document::open(&opts.wad)?;
    let level_name = match opts.level {
        Some(name) => name,
        None => doc
            .available_levels()
            .into_iter()
            .next()
            .ok_or("WAD contains no levels")?,
    };

    let map = doc.load_map(&level_name)?;
    let level = BspLevel::reconstruct(map, config)?;
    let map = level.map();

    let outside = map
        .things
        .iter()
        .filter(|t| {
            let p = t.position();
            level.locate(p.x, p.y).is_none()
        })
        .count();
    if outside > 0 {
        warn!("{}: {} things lie outside every subsector", map.name, outside);
    }
    for start in map.things.iter().filter(|t| t.is_player_start()) {
        let p = start.position();
        info!(
            "player {} start ({}, {}) in subsector {:?}",
            start.doomednum,
            p.x,
            p.y,
            level.locate(p.x, p.y)
        );
    }

    println!(
        "{}: {} subsectors closed, {} implicit segments, {} of {} things located",
        map.name,
        map.subsectors.iter().filter(|ss| ss.is_closed()).count(),
        map.implicit_segs.len(),
        map.things.len() - outside,
        map.things.len()
    );

    if let Some(path) = &opts.mesh {
        MeshBuilder::new(&level).build().write_to(path)?;
        info!("wrote mesh to {}", path.display());
    }
    if let Some(path) = &opts.debug {
        DebugSnapshot::capture(&level).write_to(path)?;
        info!("wrote debug dump to {}", path.display());
    }
    Ok(())
}
