//! Tabular point records.

use geo::Point;
use serde::Deserialize;
use tracing::debug;

use crate::error::{GeoJoinError, Result};

/// Names of the columns holding a record's coordinates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoordinateColumns {
    pub longitude: String,
    pub latitude: String,
}

impl Default for CoordinateColumns {
    fn default() -> Self {
        Self {
            longitude: "longitude".to_string(),
            latitude: "latitude".to_string(),
        }
    }
}

impl CoordinateColumns {
    pub fn new(longitude: impl Into<String>, latitude: impl Into<String>) -> Self {
        Self {
            longitude: longitude.into(),
            latitude: latitude.into(),
        }
    }

    /// Parse the coordinate pair out of a property mapping
    pub fn locate(&self, properties: &Properties) -> Result<Point<f64>> {
        let lon = parse_coordinate(properties, &self.longitude)?;
        let lat = parse_coordinate(properties, &self.latitude)?;
        Ok(Point::new(lon, lat))
    }
}

fn parse_coordinate(properties: &Properties, column: &str) -> Result<f64> {
    let missing = |reason: String| GeoJoinError::MissingCoordinate {
        column: column.to_string(),
        reason,
    };

    let raw = properties
        .get(column)
        .ok_or_else(|| missing("column not present".to_string()))?;

    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| missing(format!("'{}' is not a number", raw)))?;

    if !value.is_finite() {
        return Err(missing(format!("'{}' is not finite", raw)));
    }

    Ok(value)
}

/// Property mapping that keeps keys in insertion order.
///
/// Records are rows of a few dozen columns at most, so lookups scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a value, replacing in place if the key already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Add a new key after all existing ones. Never overwrites.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(GeoJoinError::KeyCollision { key });
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (k, v) in iter {
            properties.insert(k, v);
        }
        properties
    }
}

/// One input row plus the point used for the join
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub properties: Properties,

    /// `None` when the row has no usable coordinates
    pub point: Option<Point<f64>>,
}

impl Record {
    pub fn new(properties: Properties, point: Option<Point<f64>>) -> Self {
        Self { properties, point }
    }

    /// Build a record, reading its point from the configured columns.
    ///
    /// Rows without usable coordinates are kept; they just never match.
    pub fn from_properties(properties: Properties, columns: &CoordinateColumns) -> Self {
        let point = match columns.locate(&properties) {
            Ok(point) => Some(point),
            Err(e) => {
                debug!("Record without point: {}", e);
                None
            }
        };
        Self { properties, point }
    }

    /// The point, if it is usable for containment tests
    pub fn join_point(&self) -> Option<Point<f64>> {
        self.point
            .filter(|p| p.x().is_finite() && p.y().is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Properties {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let mut props = row(&[("name", "a"), ("longitude", "1"), ("latitude", "2")]);
        props.append("_geo_admin0", "X").unwrap();
        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["name", "longitude", "latitude", "_geo_admin0"]);
    }

    #[test]
    fn test_append_never_overwrites() {
        let mut props = row(&[("name", "a")]);
        let err = props.append("name", "b").unwrap_err();
        assert!(matches!(err, GeoJoinError::KeyCollision { .. }));
        assert_eq!(props.get("name"), Some("a"));
    }

    #[test]
    fn test_record_parses_point() {
        let columns = CoordinateColumns::default();
        let record = Record::from_properties(
            row(&[("longitude", " 5.5 "), ("latitude", "-3")]),
            &columns,
        );
        assert_eq!(record.point, Some(Point::new(5.5, -3.0)));
    }

    #[test]
    fn test_custom_columns() {
        let columns = CoordinateColumns::new("lng", "lat");
        let record = Record::from_properties(row(&[("lng", "1"), ("lat", "2")]), &columns);
        assert_eq!(record.point, Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_unusable_coordinates() {
        let columns = CoordinateColumns::default();
        for props in [
            row(&[("latitude", "2")]),
            row(&[("longitude", ""), ("latitude", "2")]),
            row(&[("longitude", "abc"), ("latitude", "2")]),
            row(&[("longitude", "NaN"), ("latitude", "2")]),
            row(&[("longitude", "1"), ("latitude", "inf")]),
        ] {
            let record = Record::from_properties(props, &columns);
            assert!(record.point.is_none());
        }
    }

    #[test]
    fn test_missing_coordinate_names_column() {
        let columns = CoordinateColumns::default();
        let err = columns.locate(&row(&[("longitude", "1")])).unwrap_err();
        match err {
            GeoJoinError::MissingCoordinate { column, .. } => assert_eq!(column, "latitude"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_join_point_filters_non_finite() {
        let record = Record::new(Properties::new(), Some(Point::new(f64::NAN, 1.0)));
        assert!(record.join_point().is_none());
    }
}
