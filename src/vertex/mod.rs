pub mod tag;

use rayon::prelude::*;

use crate::error::Result;
use crate::mesh::Mesh;

/// Minimum number of vertices processed by one task in per-vertex parallel loops.
pub(crate) const VERTEX_BATCH: usize = 64;

/// Reads the per-vertex stroke key (first component) of channel `channel`.
///
/// Fails with [MissingAttributeChannel](crate::Error::MissingAttributeChannel) if the channel is absent or empty.
pub fn extract_keys(mesh: &Mesh, channel: usize) -> Result<Vec<f32>> {
    extract_component(mesh, channel, 0)
}

/// Reads one component of every vertex of channel `channel`; components past the channel width read as `0.0`.
pub fn extract_component(mesh: &Mesh, channel: usize, component: usize) -> Result<Vec<f32>> {
    let data = mesh.require_channel(channel)?;

    Ok((0..data.len())
        .into_par_iter()
        .with_min_len(VERTEX_BATCH)
        .map(|vertex| data.get(vertex, component))
        .collect())
}
