//! Boundary layers from GeoJSON FeatureCollections.
//!
//! Files follow the geoBoundaries layout: one feature per region, its name in
//! a string property (`shapeName` by default), Polygon or MultiPolygon
//! geometry in longitude/latitude order.

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, GeoJson, Value as GeoJsonValue};
use std::path::Path;
use tracing::{info, warn};

use super::open_input;
use crate::pip::BoundaryLayer;

/// geoBoundaries property carrying the region name
pub const DEFAULT_NAME_PROPERTY: &str = "shapeName";

/// Load one boundary layer, named after the file stem
pub fn load_layer(path: &Path, name_property: &str) -> Result<BoundaryLayer> {
    info!("Loading boundaries from {}", path.display());

    let reader = open_input(path)?;
    let geojson = GeoJson::from_reader(reader)
        .with_context(|| format!("Failed to parse GeoJSON {}", path.display()))?;

    let layer_name = layer_name(path);
    let regions = regions_from_geojson(geojson, name_property)
        .with_context(|| format!("Invalid boundary file {}", path.display()))?;

    let layer = BoundaryLayer::build(layer_name, regions)?;
    Ok(layer)
}

fn layer_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("boundaries");
    file_name
        .trim_end_matches(".gz")
        .trim_end_matches(".geojson")
        .trim_end_matches(".json")
        .to_string()
}

/// Extract (name, multipolygon) pairs in feature order
pub fn regions_from_geojson(
    geojson: GeoJson,
    name_property: &str,
) -> Result<Vec<(String, MultiPolygon<f64>)>> {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("expected a FeatureCollection, found a bare geometry"),
    };

    let total = features.len();
    let mut regions = Vec::with_capacity(total);

    for (idx, feature) in features.into_iter().enumerate() {
        let name = feature_name(&feature, name_property)
            .ok_or_else(|| anyhow!("feature {} has no '{}' property", idx, name_property))?;

        let Some(geometry) = feature.geometry else {
            warn!("Skipping feature {} ('{}'): no geometry", idx, name);
            continue;
        };

        let multipolygon = match geometry.value {
            GeoJsonValue::Polygon(rings) => MultiPolygon::new(vec![to_polygon(&rings)
                .with_context(|| format!("feature {} ('{}')", idx, name))?]),
            GeoJsonValue::MultiPolygon(polygons) => MultiPolygon::new(
                polygons
                    .iter()
                    .map(|rings| to_polygon(rings))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("feature {} ('{}')", idx, name))?,
            ),
            other => {
                warn!(
                    "Skipping feature {} ('{}'): {} is not an area",
                    idx,
                    name,
                    geometry_type(&other)
                );
                continue;
            }
        };

        regions.push((name, multipolygon));
    }

    info!("Found {} regions in {} features", regions.len(), total);
    Ok(regions)
}

fn geometry_type(value: &GeoJsonValue) -> &'static str {
    match value {
        GeoJsonValue::Point(_) => "Point",
        GeoJsonValue::MultiPoint(_) => "MultiPoint",
        GeoJsonValue::LineString(_) => "LineString",
        GeoJsonValue::MultiLineString(_) => "MultiLineString",
        GeoJsonValue::Polygon(_) => "Polygon",
        GeoJsonValue::MultiPolygon(_) => "MultiPolygon",
        GeoJsonValue::GeometryCollection(_) => "GeometryCollection",
    }
}

fn feature_name(feature: &Feature, name_property: &str) -> Option<String> {
    match feature.property(name_property)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    let coords = positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(anyhow!("position with {} values", position.len())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| anyhow!("polygon without rings"))?;
    let holes = holes
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(to_ring(exterior)?, holes))
}
