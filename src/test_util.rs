//! Mesh fixtures shared by the unit tests

use crate::mesh::{AttributeChannel, Mesh};

/// Builds a mesh whose strokes are stored contiguously, one triangle strip per stroke.
///
/// Stroke `s` owns `stroke_sizes[s]` vertices keyed `keys[s]` in channel 2 and colored by its index.
pub(crate) fn keyed_strip_mesh(name: &str, stroke_sizes: &[usize], keys: &[f32]) -> Mesh {
    assert_eq!(stroke_sizes.len(), keys.len());

    let mut positions = Vec::new();
    let mut timestamps = Vec::new();
    let mut colors = Vec::new();
    let mut indices = Vec::new();

    for (stroke, (size, key)) in stroke_sizes.iter().zip(keys).enumerate() {
        let base = positions.len() as u32;

        for i in 0..*size {
            positions.push([i as f32, stroke as f32, (i % 2) as f32]);
            timestamps.push([*key, 0.0, 0.0]);
            colors.push([stroke as f32 * 0.25, 0.5, 1.0, 1.0]);
        }

        for i in 0..size.saturating_sub(2) as u32 {
            indices.extend_from_slice(&[base + i, base + i + 1, base + i + 2]);
        }
    }

    let uvs = positions.iter().map(|p| [p[0], p[1]]).collect();
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];

    Mesh::new(name, positions, indices)
        .with_channel(0, AttributeChannel::Vec2(uvs))
        .with_channel(2, AttributeChannel::Vec3(timestamps))
        .with_normals(normals)
        .with_colors(colors)
}

/// Two strokes: vertices `0..4` keyed `1.0` and `4..9` keyed `2.0`, two triangles each.
pub(crate) fn two_stroke_mesh() -> Mesh {
    let keys = (0..9).map(|v| [if v < 4 { 1.0 } else { 2.0 }, 0.0, 0.0]).collect();
    let positions = (0..9).map(|v| [v as f32, 0.0, 0.0]).collect();

    Mesh::new("sketch", positions, vec![0, 1, 2, 1, 2, 3, 4, 5, 6, 6, 7, 8])
        .with_channel(2, AttributeChannel::Vec3(keys))
}

/// Adds `rank * step` to the stroke key of every vertex, where `rank` is the vertex's position within its run of
/// equal keys in channel 2.
///
/// Models keys that drift along a stroke after a lossy round trip through storage.
pub(crate) fn with_key_drift(mut mesh: Mesh, step: f32) -> Mesh {
    if let Some(Some(AttributeChannel::Vec3(keys))) = mesh.channels.get_mut(2) {
        let mut previous = f32::NAN;
        let mut rank = 0;

        for key in keys.iter_mut() {
            if key[0] != previous {
                previous = key[0];
                rank = 0;
            }

            key[0] += rank as f32 * step;
            rank += 1;
        }
    }

    mesh
}
