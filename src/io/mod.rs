//! File formats around the spatial join: CSV tables, GeoJSON boundaries and
//! GeoJSON marker output.

pub mod boundaries;
pub mod markers;
pub mod table;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub use boundaries::load_layer;
pub use markers::{feature_collection, write_markers};
pub use table::Table;

/// Open a file for reading, decompressing `.gz` files on the fly
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}
