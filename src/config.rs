//! Tool settings shared by the tagging and partitioning passes

use crate::KEY_EPSILON;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the set of stroke identifiers is derived from a mesh.
///
/// A mesh format version should stick to one mode; the two disagree on interleaved input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdMode {
    /// Walk vertices in stored order and start a new stroke at every key change.
    ///
    /// Only correct if the vertices of each stroke are stored contiguously.
    #[default]
    BoundaryScan,
    /// Read the sentinel-terminated identifier list written by
    /// [write_marker_list](crate::vertex::tag::write_marker_list).
    ///
    /// Supports arbitrary vertex order but needs the marker pass to have run first.
    ExplicitMarkers,
}

/// How sub-meshes are built from the collected triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PartitionMode {
    /// Keep only the vertices referenced by the part's triangles, renumbered by first appearance.
    #[default]
    FullIsolation,
    /// Keep the whole source vertex array and only slice the triangles.
    ///
    /// Cheaper, but every part carries unreferenced vertices.
    SharedVertices,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// Channel whose first component holds the per-vertex stroke key (timestamps live in UV2)
    pub key_channel: usize,
    /// Channel the tagging pass writes `(stroke id, vertex count, 0)` into
    pub tag_channel: usize,
    /// Channel whose first component holds the sentinel-terminated marker list
    pub marker_channel: usize,
    /// Absolute tolerance used for every stroke key comparison
    pub epsilon: f32,
    pub id_mode: IdMode,
    pub partition_mode: PartitionMode,
    /// Minimum number of vertices handed to one task in per-vertex parallel loops
    pub batch_size: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            key_channel: 2,
            tag_channel: 3,
            marker_channel: 4,
            epsilon: KEY_EPSILON,
            id_mode: IdMode::default(),
            partition_mode: PartitionMode::default(),
            batch_size: 64,
        }
    }
}

impl SegmentConfig {
    pub fn with_key_channel(mut self, channel: usize) -> Self {
        self.key_channel = channel;
        self
    }

    pub fn with_tag_channel(mut self, channel: usize) -> Self {
        self.tag_channel = channel;
        self
    }

    pub fn with_marker_channel(mut self, channel: usize) -> Self {
        self.marker_channel = channel;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        assert!(epsilon >= 0.0);
        self.epsilon = epsilon;
        self
    }

    pub fn with_id_mode(mut self, mode: IdMode) -> Self {
        self.id_mode = mode;
        self
    }

    pub fn with_partition_mode(mut self, mode: PartitionMode) -> Self {
        self.partition_mode = mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
