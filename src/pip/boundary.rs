//! Named boundary regions.

use geo::{BoundingRect, Closest, ClosestPoint, Distance, Haversine, MultiPolygon, Point, Rect};
use tracing::warn;

use super::geometry::{is_degenerate_ring, multipolygon_contains, ring_point_count};
use crate::error::{GeoJoinError, Result};

/// A single named region: one or more polygons, possibly with holes
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    bbox: Rect<f64>,
}

impl Region {
    /// Validate the geometry and precompute its bounding box.
    ///
    /// `layer` is only used to label errors.
    pub fn new(layer: &str, name: impl Into<String>, geometry: MultiPolygon<f64>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| GeoJoinError::InvalidGeometry {
            layer: layer.to_string(),
            region: name.clone(),
            reason,
        };

        if geometry.0.is_empty() {
            return Err(invalid("region has no polygons".to_string()));
        }

        for (idx, polygon) in geometry.0.iter().enumerate() {
            let points = ring_point_count(polygon.exterior());
            if points < 3 {
                return Err(invalid(format!(
                    "outer ring of polygon {} has {} points, need at least 3",
                    idx, points
                )));
            }

            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
            for ring in rings {
                if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
                    return Err(invalid(format!(
                        "polygon {} has a non-finite coordinate",
                        idx
                    )));
                }
            }

            if is_degenerate_ring(polygon.exterior()) {
                warn!(
                    "Region '{}' in layer '{}': outer ring of polygon {} has no area",
                    name,
                    layer,
                    idx
                );
            }
            for hole in polygon.interiors() {
                if ring_point_count(hole) < 3 {
                    warn!(
                        "Region '{}' in layer '{}': ignoring hole with fewer than 3 points",
                        name,
                        layer
                    );
                }
            }
        }

        let bbox = geometry
            .bounding_rect()
            .ok_or_else(|| invalid("geometry has no extent".to_string()))?;

        Ok(Self {
            name,
            geometry,
            bbox,
        })
    }

    /// Get the bounding box of this region
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.bbox.min().x,
            self.bbox.min().y,
            self.bbox.max().x,
            self.bbox.max().y,
        )
    }

    /// Closed-polygon containment, with a bounding box pre-check
    pub fn contains(&self, point: &Point<f64>) -> bool {
        let (min_x, min_y, max_x, max_y) = self.bbox();
        if point.x() < min_x || point.x() > max_x || point.y() < min_y || point.y() > max_y {
            return false;
        }
        multipolygon_contains(&self.geometry, point)
    }

    /// Great-circle distance in meters from the point to the closest point of the region
    pub fn distance_m(&self, point: &Point<f64>) -> Option<f64> {
        match self.geometry.closest_point(point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => {
                Some(Haversine.distance(p, *point))
            }
            Closest::Indeterminate => None,
        }
    }
}
