//! csv2geojson - CSV point records to GeoJSON markers, labelled with the
//! administrative regions that contain them.
//!
//! This library provides the spatial join and file formats used by the
//! `csv2geojson` binary.

pub mod annotator;
pub mod error;
pub mod io;
pub mod models;
pub mod pip;

pub use annotator::{indexed_keys, Annotator, DEFAULT_KEY_PREFIX};
pub use error::GeoJoinError;
pub use models::{CoordinateColumns, Properties, Record};
pub use pip::{BoundaryLayer, Execution, MissPolicy, SpatialJoin};
