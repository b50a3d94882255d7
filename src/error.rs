//! Error types for the spatial join.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoJoinError {
    /// A boundary polygon cannot be used for containment tests.
    #[error("Invalid geometry in layer '{layer}', region '{region}': {reason}")]
    InvalidGeometry {
        layer: String,
        region: String,
        reason: String,
    },

    /// A record has no usable longitude/latitude. Never fatal.
    #[error("Missing coordinate in column '{column}': {reason}")]
    MissingCoordinate { column: String, reason: String },

    #[error("Output key '{key}' collides with an existing property")]
    KeyCollision { key: String },

    #[error("{layers} layers were supplied but {keys} output keys")]
    LayerKeyMismatch { layers: usize, keys: usize },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, GeoJoinError>;
