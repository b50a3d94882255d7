//! Writes spatial join results back onto records.

use hashbrown::HashSet;
use tracing::info;

use crate::error::{GeoJoinError, Result};
use crate::models::Record;
use crate::pip::{Execution, SpatialJoin};

/// Default prefix for added columns; the layer index is appended
pub const DEFAULT_KEY_PREFIX: &str = "_geo_admin";

/// `_geo_admin0`, `_geo_admin1`, ... for `count` layers
pub fn indexed_keys(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|idx| format!("{}{}", prefix, idx)).collect()
}

/// Appends one label per layer to each record.
pub struct Annotator {
    join: SpatialJoin,
    keys: Vec<String>,
    unmatched: String,
}

impl Annotator {
    /// One key per layer, in layer order. Keys must be distinct.
    pub fn new(join: SpatialJoin, keys: Vec<String>) -> Result<Self> {
        if keys.len() != join.layers().len() {
            return Err(GeoJoinError::LayerKeyMismatch {
                layers: join.layers().len(),
                keys: keys.len(),
            });
        }

        {
            let mut seen = HashSet::new();
            for key in &keys {
                if !seen.insert(key.as_str()) {
                    return Err(GeoJoinError::KeyCollision { key: key.clone() });
                }
            }
        }

        Ok(Self {
            join,
            keys,
            unmatched: String::new(),
        })
    }

    /// Annotator using `_geo_admin{index}` keys
    pub fn with_default_keys(join: SpatialJoin) -> Self {
        let keys = indexed_keys(DEFAULT_KEY_PREFIX, join.layers().len());
        Self {
            join,
            keys,
            unmatched: String::new(),
        }
    }

    /// Value written for misses (empty by default)
    pub fn with_unmatched(mut self, unmatched: impl Into<String>) -> Self {
        self.unmatched = unmatched.into();
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn join(&self) -> &SpatialJoin {
        &self.join
    }

    /// Annotate every record, keeping order and count.
    ///
    /// Either every record gets its new keys or nothing is returned: a record
    /// that already has one of the keys fails the call before any join runs.
    pub fn annotate(&self, records: Vec<Record>, execution: Execution) -> Result<Vec<Record>> {
        for record in &records {
            if let Some(key) = self.keys.iter().find(|k| record.properties.contains_key(k)) {
                return Err(GeoJoinError::KeyCollision { key: key.clone() });
            }
        }

        let points: Vec<_> = records.iter().map(Record::join_point).collect();
        let results = self.join.join(&points, execution)?;

        let mut unmatched_counts = vec![0usize; self.keys.len()];
        let mut annotated = Vec::with_capacity(records.len());

        for (mut record, labels) in records.into_iter().zip(results) {
            for (idx, (key, label)) in self.keys.iter().zip(labels).enumerate() {
                let value = match label {
                    Some(name) => name.to_string(),
                    None => {
                        unmatched_counts[idx] += 1;
                        self.unmatched.clone()
                    }
                };
                record.properties.append(key.as_str(), value)?;
            }
            annotated.push(record);
        }

        for (key, misses) in self.keys.iter().zip(&unmatched_counts) {
            info!(
                "{}: {} of {} records unmatched",
                key,
                misses,
                annotated.len()
            );
        }

        Ok(annotated)
    }
}
