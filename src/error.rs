use std::fmt;

use thiserror::Error;

/// Per-vertex attribute named in length errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Channel(usize),
    Normals,
    Colors,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Channel(index) => write!(f, "channel {index}"),
            Attribute::Normals => f.write_str("normals"),
            Attribute::Colors => f.write_str("colors"),
        }
    }
}

/// Errors produced while tagging or partitioning a mesh.
///
/// Every variant is fatal for the mesh it was produced for only; batch commands in
/// [crate::batch] log it and carry on with the remaining meshes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A required per-vertex channel is absent or empty (e.g. no stroke tags before partitioning).
    #[error("attribute channel {channel} is missing or empty")]
    MissingAttributeChannel { channel: usize },

    #[error("mesh has no vertex colors")]
    MissingVertexColors,

    #[error("{attribute} has {actual} entries, expected {expected}")]
    AttributeLengthMismatch {
        attribute: Attribute,
        expected: usize,
        actual: usize,
    },

    #[error("index count {count} is not a multiple of 3")]
    InvalidIndexCount { count: usize },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// A reveal slot refers to a stroke whose scene object is gone.
    ///
    /// Only raised inside [crate::reveal], where it is recovered by skipping the slot.
    #[error("reveal slot {slot} refers to a destroyed scene object")]
    DanglingSceneReference { slot: usize },
}

/// Convenience type alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
