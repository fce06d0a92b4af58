//! Collection of per-stroke triangles into one contiguous index buffer

use rayon::prelude::*;

use super::remap::localize_index_buffer;
use super::TriangleLayout;

/// Returns `offset[i] = counts[0] + .. + counts[i - 1]`.
pub fn prefix_offsets(counts: &[u32]) -> Vec<usize> {
    counts
        .iter()
        .scan(0usize, |offset, count| {
            let start = *offset;
            *offset += *count as usize;
            Some(start)
        })
        .collect()
}

/// Vertex numbering of the collected triangle runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexNumbering {
    /// Indices refer to the source vertex array
    #[default]
    Global,
    /// Each run is renumbered by first appearance of its vertices, starting at 0
    Local,
}

/// Copies the triangles of every stroke into its run of `destination`, preserving source order within a stroke.
///
/// A triangle belongs to the stroke of its first vertex. With [VertexNumbering::Local] every run is renumbered on
/// its own, so a triangle whose other vertices belong to another stroke (or to none) still gets valid local indices.
/// Returns the source vertex of every local vertex per stroke; the lists are empty with [VertexNumbering::Global].
///
/// Strokes are processed in parallel. `destination` is split into one disjoint slice per stroke at the prefix-sum
/// offsets of `layout`, so each task writes only its own slice.
///
/// # Arguments
///
/// * `destination`: must contain exactly `layout.total()` elements
/// * `vertex_strokes`: stroke index of every vertex, as passed to [count_triangles](super::count::count_triangles)
pub fn collect_triangles(
    destination: &mut [u32],
    indices: &[u32],
    vertex_strokes: &[u32],
    layout: &TriangleLayout,
    numbering: VertexNumbering,
) -> Vec<Vec<u32>> {
    assert_eq!(indices.len() % 3, 0);
    assert_eq!(destination.len(), layout.total());

    let mut runs = Vec::with_capacity(layout.stroke_count());
    let mut rest = destination;

    for count in &layout.counts {
        let (run, tail) = std::mem::take(&mut rest).split_at_mut(*count as usize);
        runs.push(run);
        rest = tail;
    }

    runs.into_par_iter()
        .enumerate()
        .map(|(stroke, run)| {
            let span = layout.spans[stroke].clone();
            let mut written = 0;

            for triangle in indices[span.start * 3..span.end * 3].chunks_exact(3) {
                if vertex_strokes[triangle[0] as usize] != stroke as u32 {
                    continue;
                }

                run[written..written + 3].copy_from_slice(triangle);
                written += 3;
            }

            assert_eq!(written, run.len());

            match numbering {
                VertexNumbering::Global => Vec::new(),
                VertexNumbering::Local => localize_index_buffer(run),
            }
        })
        .collect()
}

/// Triangle runs of all strokes in one owned buffer, addressed by `(offset, length)` through the layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectedTriangles {
    pub indices: Vec<u32>,
    pub layout: TriangleLayout,
    pub numbering: VertexNumbering,
    /// Source vertex of every local vertex, per stroke; empty lists for [VertexNumbering::Global]
    pub source_vertices: Vec<Vec<u32>>,
}

impl CollectedTriangles {
    /// Triangle indices of stroke `stroke`.
    pub fn stroke(&self, stroke: usize) -> &[u32] {
        &self.indices[self.layout.range(stroke)]
    }

    pub fn source_vertices(&self, stroke: usize) -> &[u32] {
        &self.source_vertices[stroke]
    }

    pub fn stroke_count(&self) -> usize {
        self.layout.stroke_count()
    }
}

/// Allocates the contiguous buffer for `layout` and fills it with [collect_triangles].
pub fn collect(
    indices: &[u32],
    vertex_strokes: &[u32],
    layout: TriangleLayout,
    numbering: VertexNumbering,
) -> CollectedTriangles {
    let mut buffer = vec![0u32; layout.total()];

    let source_vertices = collect_triangles(&mut buffer, indices, vertex_strokes, &layout, numbering);

    CollectedTriangles {
        indices: buffer,
        layout,
        numbering,
        source_vertices,
    }
}
