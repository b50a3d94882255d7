//! Boundary layers: ordered regions behind an R-tree.

use geo::{MultiPolygon, Point};
use hashbrown::HashSet;
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use tracing::{info, warn};

use super::Region;
use crate::error::Result;

/// What a layer lookup reports when no region contains the point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Leave the point unmatched
    #[default]
    Unmatched,
    /// Fall back to the region closest to the point
    Nearest,
}

/// R-tree entry pointing back at a region by its input position
#[derive(Debug, Clone)]
struct IndexedRegion {
    order: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// One administrative level: regions in the order they were supplied.
///
/// When regions overlap, the one supplied first wins. The R-tree only narrows
/// down candidates; the answer is always the same as scanning in order.
#[derive(Debug)]
pub struct BoundaryLayer {
    name: String,
    regions: Vec<Region>,
    tree: RTree<IndexedRegion>,
}

impl BoundaryLayer {
    /// Build a layer from (name, multipolygon) pairs, keeping their order.
    ///
    /// Fails on the first region with unusable geometry.
    pub fn build(
        name: impl Into<String>,
        regions: Vec<(String, MultiPolygon<f64>)>,
    ) -> Result<Self> {
        let name = name.into();
        let regions = regions
            .into_iter()
            .map(|(region_name, geometry)| Region::new(&name, region_name, geometry))
            .collect::<Result<Vec<_>>>()?;

        {
            let mut seen = HashSet::new();
            for region in &regions {
                if !seen.insert(region.name.as_str()) {
                    warn!(
                        "Layer '{}' has more than one region named '{}'; the first one wins where they overlap",
                        name, region.name
                    );
                }
            }
        }

        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .enumerate()
            .map(|(order, region)| {
                let (min_x, min_y, max_x, max_y) = region.bbox();
                IndexedRegion {
                    order,
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                }
            })
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!("Layer '{}' ready with {} regions", name, regions.len());

        Ok(Self {
            name,
            regions,
            tree,
        })
    }

    /// Name of the first region (in input order) containing the point
    pub fn find(&self, point: &Point<f64>) -> Option<&str> {
        if !is_finite(point) {
            return None;
        }

        let query_envelope = AABB::from_point([point.x(), point.y()]);

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ir| self.regions[ir.order].contains(point))
            .map(|ir| ir.order)
            .min()
            .map(|order| self.regions[order].name.as_str())
    }

    /// Name of the region closest to the point; earlier regions win ties
    pub fn nearest(&self, point: &Point<f64>) -> Option<&str> {
        if !is_finite(point) {
            return None;
        }

        let mut best: Option<(f64, &Region)> = None;
        for region in &self.regions {
            let Some(distance) = region.distance_m(point) else {
                continue;
            };
            match best {
                Some((best_distance, _)) if best_distance <= distance => {}
                _ => best = Some((distance, region)),
            }
        }

        best.map(|(_, region)| region.name.as_str())
    }

    /// Look up a point, applying the miss policy when nothing contains it
    pub fn lookup(&self, point: &Point<f64>, policy: MissPolicy) -> Option<&str> {
        match (self.find(point), policy) {
            (Some(name), _) => Some(name),
            (None, MissPolicy::Unmatched) => None,
            (None, MissPolicy::Nearest) => self.nearest(point),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regions in input order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn is_finite(point: &Point<f64>) -> bool {
    point.x().is_finite() && point.y().is_finite()
}
