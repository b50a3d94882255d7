//! Spatial join of points against every boundary layer.

use geo::Point;
use rayon::prelude::*;
use tracing::{debug, info};

use super::{BoundaryLayer, MissPolicy};
use crate::error::{GeoJoinError, Result};

/// How the join walks the points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    /// Split points across a rayon pool. `None` uses the global pool.
    Parallel { threads: Option<usize> },
}

/// Per-layer labels for one point, in layer order. `None` is unmatched.
pub type Labels<'a> = Vec<Option<&'a str>>;

/// Joins points against an ordered list of boundary layers.
///
/// Layers are queried independently: a miss in a coarse layer does not stop
/// the lookup in finer ones. Nothing is mutated after construction, so the
/// layers can be shared freely across worker threads.
pub struct SpatialJoin {
    layers: Vec<BoundaryLayer>,
    miss_policy: MissPolicy,
}

impl SpatialJoin {
    /// Create a join over layers given coarsest first
    pub fn new(layers: Vec<BoundaryLayer>) -> Self {
        Self {
            layers,
            miss_policy: MissPolicy::default(),
        }
    }

    pub fn with_miss_policy(mut self, miss_policy: MissPolicy) -> Self {
        self.miss_policy = miss_policy;
        self
    }

    /// Labels for a single point. Points that are absent or not finite are
    /// unmatched in every layer.
    pub fn lookup(&self, point: Option<&Point<f64>>) -> Labels<'_> {
        let Some(point) = point.filter(|p| p.x().is_finite() && p.y().is_finite()) else {
            return vec![None; self.layers.len()];
        };

        let labels: Labels<'_> = self
            .layers
            .iter()
            .map(|layer| layer.lookup(point, self.miss_policy))
            .collect();

        debug!(
            "PIP lookup at ({}, {}): {:?}",
            point.x(),
            point.y(),
            labels
        );

        labels
    }

    /// Labels for every point, in input order
    pub fn join(&self, points: &[Option<Point<f64>>], execution: Execution) -> Result<Vec<Labels<'_>>> {
        info!(
            "Joining {} points against {} layers ({:?})",
            points.len(),
            self.layers.len(),
            execution
        );

        let results = match execution {
            Execution::Sequential => points.iter().map(|p| self.lookup(p.as_ref())).collect(),
            Execution::Parallel { threads: None } => self.join_par(points),
            Execution::Parallel {
                threads: Some(threads),
            } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GeoJoinError::ThreadPool(e.to_string()))?;
                pool.install(|| self.join_par(points))
            }
        };

        Ok(results)
    }

    // Indexed collect keeps input order regardless of scheduling
    fn join_par(&self, points: &[Option<Point<f64>>]) -> Vec<Labels<'_>> {
        points.par_iter().map(|p| self.lookup(p.as_ref())).collect()
    }

    pub fn layers(&self) -> &[BoundaryLayer] {
        &self.layers
    }

    pub fn miss_policy(&self) -> MissPolicy {
        self.miss_policy
    }
}
