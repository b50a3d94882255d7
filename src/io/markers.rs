//! GeoJSON marker output: one Point feature per record.

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::models::Record;

/// Convert a record into a Point feature carrying all of its properties.
///
/// Records without a usable point get a null geometry, which GeoJSON allows.
pub fn to_feature(record: &Record) -> Feature {
    let properties: JsonObject = record
        .properties
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();

    let geometry = record
        .join_point()
        .map(|p| Geometry::new(GeoJsonValue::Point(vec![p.x(), p.y()])));

    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// All records as a FeatureCollection, in record order
pub fn feature_collection(records: &[Record]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: records.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

/// Write the markers for `records` as a GeoJSON file
pub fn write_markers(path: &Path, records: &[Record]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &feature_collection(records))
        .with_context(|| format!("Failed to write GeoJSON {}", path.display()))?;
    writer.flush()?;

    info!("Wrote {} markers to {}", records.len(), path.display());
    Ok(())
}
