//! Host mesh representation consumed by the segmentation passes

use crate::error::{Attribute, Error, Result};

/// Number of auxiliary channels a mesh can carry (UV0..UV7).
pub const MAX_CHANNELS: usize = 8;

/// Auxiliary per-vertex float-vector channel, aligned 1:1 with the vertices.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeChannel {
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
}

impl AttributeChannel {
    /// Returns length of the channel in vertices.
    pub fn len(&self) -> usize {
        match self {
            Self::Vec2(data) => data.len(),
            Self::Vec3(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of float components per vertex (2 or 3).
    pub fn components(&self) -> usize {
        match self {
            Self::Vec2(_) => 2,
            Self::Vec3(_) => 3,
        }
    }

    /// Returns one component of one vertex; components past the channel width read as `0.0`.
    #[inline]
    pub fn get(&self, vertex: usize, component: usize) -> f32 {
        match self {
            Self::Vec2(data) => data[vertex].get(component).copied().unwrap_or(0.0),
            Self::Vec3(data) => data[vertex].get(component).copied().unwrap_or(0.0),
        }
    }

    /// Copies the entries of `order` (source vertex indices) into a new channel of the same width.
    pub fn gather(&self, order: &[u32]) -> Self {
        match self {
            Self::Vec2(data) => Self::Vec2(order.iter().map(|v| data[*v as usize]).collect()),
            Self::Vec3(data) => Self::Vec3(order.iter().map(|v| data[*v as usize]).collect()),
        }
    }
}

/// An ordered vertex array, a flat triangle list and per-vertex attributes.
///
/// Invariants checked by [Mesh::validate]: every attribute present has exactly `vertex_count` entries
/// and every index is in `[0, vertex_count)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    /// Channels addressed by index; `None` marks an absent channel
    pub channels: Vec<Option<AttributeChannel>>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, index: usize, channel: AttributeChannel) -> Self {
        self.set_channel(index, channel);
        self
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the channel at `index` if it is present.
    pub fn channel(&self, index: usize) -> Option<&AttributeChannel> {
        self.channels.get(index).and_then(Option::as_ref)
    }

    /// Returns the channel at `index`, failing if it is absent, empty or not aligned with the vertices.
    pub fn require_channel(&self, index: usize) -> Result<&AttributeChannel> {
        let channel = self
            .channel(index)
            .filter(|c| !c.is_empty())
            .ok_or(Error::MissingAttributeChannel { channel: index })?;

        if channel.len() != self.vertex_count() {
            return Err(Error::AttributeLengthMismatch {
                attribute: Attribute::Channel(index),
                expected: self.vertex_count(),
                actual: channel.len(),
            });
        }

        Ok(channel)
    }

    /// Replaces the channel at `index`, dropping any previous contents.
    pub fn set_channel(&mut self, index: usize, channel: AttributeChannel) {
        assert!(index < MAX_CHANNELS);

        if self.channels.len() <= index {
            self.channels.resize(index + 1, None);
        }

        self.channels[index] = Some(channel);
    }

    /// Checks attribute lengths and index bounds.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertex_count();

        let check = |attribute: Attribute, actual: usize| {
            if actual == vertex_count {
                Ok(())
            } else {
                Err(Error::AttributeLengthMismatch {
                    attribute,
                    expected: vertex_count,
                    actual,
                })
            }
        };

        for (index, channel) in self.channels.iter().enumerate() {
            if let Some(channel) = channel {
                check(Attribute::Channel(index), channel.len())?;
            }
        }

        if let Some(normals) = &self.normals {
            check(Attribute::Normals, normals.len())?;
        }

        if let Some(colors) = &self.colors {
            check(Attribute::Colors, colors.len())?;
        }

        validate_indices(&self.indices, vertex_count)
    }

    /// Builds an independent mesh holding the vertices listed in `vertex_order` (source indices, in new order).
    ///
    /// `indices` must already refer to positions in `vertex_order`. All attributes are copied unmodified.
    pub fn subset(&self, name: String, vertex_order: &[u32], indices: Vec<u32>) -> Mesh {
        debug_assert!(indices.iter().all(|i| (*i as usize) < vertex_order.len()));

        let gather = |data: &[[f32; 3]]| vertex_order.iter().map(|v| data[*v as usize]).collect::<Vec<_>>();

        Mesh {
            name,
            positions: gather(&self.positions),
            normals: self.normals.as_deref().map(gather),
            colors: self
                .colors
                .as_ref()
                .map(|colors| vertex_order.iter().map(|v| colors[*v as usize]).collect()),
            channels: self
                .channels
                .iter()
                .map(|channel| channel.as_ref().map(|c| c.gather(vertex_order)))
                .collect(),
            indices,
        }
    }

    /// Builds an independent mesh that keeps every source vertex and uses `indices` as its triangle list.
    pub fn with_shared_vertices(&self, name: String, indices: Vec<u32>) -> Mesh {
        Mesh {
            name,
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            colors: self.colors.clone(),
            channels: self.channels.clone(),
            indices,
        }
    }
}

pub(crate) fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(Error::InvalidIndexCount { count: indices.len() });
    }

    match indices.iter().find(|i| **i as usize >= vertex_count) {
        Some(index) => Err(Error::IndexOutOfRange {
            index: *index,
            vertex_count,
        }),
        None => Ok(()),
    }
}
