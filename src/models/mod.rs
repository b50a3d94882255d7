//! Core data models for the converter.

pub mod record;

pub use record::{CoordinateColumns, Properties, Record};
