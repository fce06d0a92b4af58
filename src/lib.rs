//! strokesplit-rs
//!
//! Splits merged brush stroke meshes back into one mesh per stroke. Every vertex carries the timestamp its stroke was
//! started at (the stroke key); vertices with equal keys belong to the same stroke.
//!
//! The pipeline runs in stages, each of which can also be used on its own:
//!
//! 1. [stroke::collect] finds the distinct stroke ids of a mesh
//! 2. [vertex::tag] assigns every vertex its stroke
//! 3. [triangle::count] and [triangle::collect] bucket the triangles by stroke
//! 4. [partition] builds the per-stroke meshes
//!
//! [color] splits by averaged triangle color instead, [batch] runs the commands over several meshes and [reveal]
//! computes clip ranges for replaying the split strokes over time.
//!
//! # Features
//!
//! * `serde`: Derives `Serialize` and `Deserialize` for [SegmentConfig](config::SegmentConfig)
//! * `cli`: Builds the `split_bench` binary

pub mod batch;
pub mod color;
pub mod config;
pub mod error;
mod hash;
pub mod mesh;
pub mod partition;
pub mod reveal;
pub mod stroke;
#[cfg(test)]
mod test_util;
pub mod triangle;
pub mod vertex;

pub use crate::batch::{split_selection_by_color, split_selection_by_stroke, tag_selection};
pub use crate::color::partition_by_color;
pub use crate::config::{IdMode, PartitionMode, SegmentConfig};
pub use crate::error::{Error, Result};
pub use crate::mesh::{AttributeChannel, Mesh};
pub use crate::partition::{partition_by_stroke, segment};
pub use crate::vertex::tag::tag_mesh;

/// Default tolerance below which two stroke keys are considered equal.
pub const KEY_EPSILON: f32 = 1e-5;

/// Stroke index of vertices and triangles that belong to no stroke.
pub const INVALID_STROKE: u32 = u32::MAX;
