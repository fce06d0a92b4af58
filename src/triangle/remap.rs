//! Global to local vertex renumbering for sub-meshes

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::hash::BuildIndexHasher;

/// Renumbers the vertices referenced by `indices` in order of first appearance, in place.
///
/// Returns the source vertex of every local vertex. Only the referenced vertices are tracked, so the cost is
/// proportional to `indices.len()` rather than the source vertex count.
pub fn localize_index_buffer(indices: &mut [u32]) -> Vec<u32> {
    assert_eq!(indices.len() % 3, 0);

    let mut table = HashMap::with_capacity_and_hasher(indices.len(), BuildIndexHasher::default());
    let mut vertices = Vec::new();

    for index in indices.iter_mut() {
        *index = match table.entry(*index) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let next = vertices.len() as u32;
                vertices.push(*index);
                *entry.insert(next)
            }
        };
    }

    vertices
}

/// Renumbers the vertices referenced by `indices` in order of first appearance.
///
/// Returns the source vertex of every local vertex and the triangle list rewritten to local indices.
pub fn first_appearance_remap(indices: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let mut local = indices.to_vec();
    let vertices = localize_index_buffer(&mut local);

    (vertices, local)
}

/// Maps local indices back to source indices using the per-part source vertex list.
pub fn restore_source_indices(local_indices: &[u32], source_vertices: &[u32]) -> Vec<u32> {
    local_indices
        .iter()
        .map(|local| source_vertices[*local as usize])
        .collect()
}
