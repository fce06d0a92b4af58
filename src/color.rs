//! Splitting a mesh into one sub-mesh per averaged triangle color

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::hash::BuildIndexHasher;
use crate::mesh::Mesh;
use crate::partition::separated_container_name;

/// Returns the mean RGB color of the three vertices of `triangle`.
#[inline]
pub fn triangle_color(colors: &[[f32; 4]], triangle: &[u32]) -> [f32; 3] {
    let mut sum = [0.0f32; 3];

    for index in triangle {
        let color = colors[*index as usize];

        sum[0] += color[0];
        sum[1] += color[1];
        sum[2] += color[2];
    }

    let n = triangle.len() as f32;

    [sum[0] / n, sum[1] / n, sum[2] / n]
}

// exact equality, but with -0.0 folded onto 0.0
fn color_key(color: [f32; 3]) -> [u32; 3] {
    color.map(|c| (c + 0.0).to_bits())
}

/// Triangles sharing one averaged color.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorBucket {
    pub color: [f32; 3],
    pub indices: Vec<u32>,
}

/// Groups triangles by their averaged color, in order of first appearance.
///
/// Colors are compared exactly, with no tolerance: two colors differing in the last bit land in separate buckets.
/// This differs from stroke keys, which are always compared with an epsilon.
pub fn bucket_by_color(colors: &[[f32; 4]], indices: &[u32]) -> Vec<ColorBucket> {
    assert_eq!(indices.len() % 3, 0);

    let triangle_colors: Vec<[f32; 3]> = indices
        .par_chunks_exact(3)
        .with_min_len(256)
        .map(|triangle| triangle_color(colors, triangle))
        .collect();

    let mut table = HashMap::with_hasher(BuildIndexHasher::default());
    let mut buckets: Vec<ColorBucket> = Vec::new();

    for (color, triangle) in triangle_colors.into_iter().zip(indices.chunks_exact(3)) {
        let bucket = match table.entry(color_key(color)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                buckets.push(ColorBucket {
                    color,
                    indices: Vec::new(),
                });
                *entry.insert(buckets.len() - 1)
            }
        };

        buckets[bucket].indices.extend_from_slice(triangle);
    }

    buckets
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorPart {
    pub color: [f32; 3],
    pub mesh: Mesh,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorPartition {
    pub container_name: String,
    pub parts: Vec<ColorPart>,
}

impl ColorPartition {
    pub fn into_meshes(self) -> Vec<Mesh> {
        self.parts.into_iter().map(|p| p.mesh).collect()
    }
}

/// Splits `mesh` into one mesh per averaged triangle color.
///
/// Parts keep the whole source vertex array and are named `"<source> <index>"` in order of first appearance.
pub fn partition_by_color(mesh: &Mesh) -> Result<ColorPartition> {
    mesh.validate()?;

    let colors = mesh.colors.as_deref().ok_or(Error::MissingVertexColors)?;

    let buckets = bucket_by_color(colors, &mesh.indices);

    debug!("{}: {} color buckets", mesh.name, buckets.len());

    let parts = buckets
        .into_par_iter()
        .enumerate()
        .map(|(index, bucket)| ColorPart {
            color: bucket.color,
            mesh: mesh.with_shared_vertices(format!("{} {}", mesh.name, index), bucket.indices),
        })
        .collect();

    Ok(ColorPartition {
        container_name: separated_container_name(&mesh.name),
        parts,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    use approx::assert_relative_eq;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    fn mesh() -> Mesh {
        Mesh::new("sketch", vec![[0.0; 3]; 6], vec![0, 1, 2, 3, 4, 5, 2, 1, 0, 0, 1, 3])
            .with_colors(vec![RED, RED, RED, BLUE, BLUE, BLUE])
    }

    #[test]
    fn test_triangle_color() {
        let colors = [RED, BLUE, [0.0, 1.0, 0.0, 0.5]];

        let color = triangle_color(&colors, &[0, 1, 2]);

        assert_relative_eq!(color[0], 1.0 / 3.0);
        assert_relative_eq!(color[1], 1.0 / 3.0);
        assert_relative_eq!(color[2], 1.0 / 3.0);
    }

    #[test]
    fn test_buckets_in_first_appearance_order() {
        let mesh = mesh();

        let buckets = bucket_by_color(mesh.colors.as_deref().unwrap(), &mesh.indices);

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(buckets[0].indices, vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(buckets[1].color, [0.0, 0.0, 1.0]);
        assert_eq!(buckets[2].indices, vec![0, 1, 3]);
    }

    #[test]
    fn test_near_identical_colors_are_separate() {
        let colors = [RED, RED, RED, [1.0 - 1e-6, 0.0, 0.0, 1.0]];
        let indices = [0, 1, 2, 3, 3, 3];

        assert_eq!(bucket_by_color(&colors, &indices).len(), 2);
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let colors = [[0.0, 0.0, 0.0, 1.0], [-0.0, -0.0, -0.0, 1.0]];
        let indices = [0, 0, 0, 1, 1, 1];

        assert_eq!(bucket_by_color(&colors, &indices).len(), 1);
    }

    #[test]
    fn test_partition_by_color() {
        let partition = partition_by_color(&mesh()).unwrap();

        assert_eq!(partition.container_name, "sketch (separated)");
        assert_eq!(partition.parts.len(), 3);
        assert_eq!(partition.parts[1].mesh.name, "sketch 1");
        assert_eq!(partition.parts[1].mesh.indices, vec![3, 4, 5]);
        assert_eq!(partition.parts[1].mesh.vertex_count(), 6);
    }

    #[test]
    fn test_partition_without_colors() {
        let mut mesh = mesh();
        mesh.colors = None;

        assert_eq!(partition_by_color(&mesh).unwrap_err(), Error::MissingVertexColors);
    }
}
