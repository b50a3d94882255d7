//! Point-in-Polygon (PIP) region lookup.
//!
//! Builds layers of named boundary regions and joins points against them,
//! using an R-tree to narrow candidates before the exact containment test.

mod boundary;
pub mod geometry;
mod index;
mod service;

pub use boundary::Region;
pub use geometry::PointPosition;
pub use index::{BoundaryLayer, MissPolicy};
pub use service::{Execution, Labels, SpatialJoin};
