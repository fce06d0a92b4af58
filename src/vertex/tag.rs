//! Per-vertex stroke assignment and tag channel writing

use log::{debug, warn};
use rayon::prelude::*;

use crate::config::SegmentConfig;
use crate::error::Result;
use crate::mesh::{AttributeChannel, Mesh};
use crate::stroke::collect::{collect_stroke_ids, StrokeIds, StrokeRuns, MARKER_SENTINEL};
use crate::stroke::StrokeSet;
use crate::vertex::extract_keys;
use crate::INVALID_STROKE;

/// Stroke assignment of every vertex of a mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexStrokes {
    /// Stroke index of each vertex, [INVALID_STROKE] if its key matches no stroke
    pub strokes: Vec<u32>,
    /// Number of vertices of each stroke, in stroke order
    pub vertex_counts: Vec<u32>,
}

impl VertexStrokes {
    pub fn stroke_of(&self, vertex: usize) -> Option<u32> {
        Some(self.strokes[vertex]).filter(|s| *s != INVALID_STROKE)
    }

    /// Number of vertices not belonging to any stroke.
    pub fn unmatched(&self) -> usize {
        self.strokes.len() - self.vertex_counts.iter().map(|c| *c as usize).sum::<usize>()
    }
}

/// Assigns every vertex to the stroke its key epsilon-matches and counts the vertices of each stroke.
///
/// Lookup is `O(log S)` per vertex; both passes are parallel over vertices.
pub fn assign_strokes(keys: &[f32], set: &StrokeSet, batch_size: usize) -> VertexStrokes {
    let batch_size = batch_size.max(1);

    let strokes: Vec<u32> = keys
        .par_iter()
        .with_min_len(batch_size)
        .map(|key| set.find(*key).unwrap_or(INVALID_STROKE))
        .collect();

    let vertex_counts = count_vertices(&strokes, set.len(), batch_size);

    VertexStrokes { strokes, vertex_counts }
}

/// Assigns every vertex to the stroke of the boundary-scan run it lies in.
pub fn assign_runs(runs: &StrokeRuns, vertex_count: usize, stroke_count: usize, batch_size: usize) -> VertexStrokes {
    let batch_size = batch_size.max(1);

    let strokes: Vec<u32> = (0..vertex_count)
        .into_par_iter()
        .with_min_len(batch_size)
        .map(|vertex| runs.stroke_at(vertex))
        .collect();

    let vertex_counts = count_vertices(&strokes, stroke_count, batch_size);

    VertexStrokes { strokes, vertex_counts }
}

/// Assigns vertices by run when `ids` came from a boundary scan, by key lookup otherwise.
pub fn assign_stroke_ids(keys: &[f32], ids: &StrokeIds, batch_size: usize) -> VertexStrokes {
    match &ids.runs {
        Some(runs) => assign_runs(runs, keys.len(), ids.set.len(), batch_size),
        None => assign_strokes(keys, &ids.set, batch_size),
    }
}

fn count_vertices(strokes: &[u32], stroke_count: usize, batch_size: usize) -> Vec<u32> {
    strokes
        .par_iter()
        .with_min_len(batch_size)
        .fold(
            || vec![0u32; stroke_count],
            |mut counts, stroke| {
                if *stroke != INVALID_STROKE {
                    counts[*stroke as usize] += 1;
                }
                counts
            },
        )
        .reduce(
            || vec![0u32; stroke_count],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(a, b)| *a += b);
                a
            },
        )
}

/// Builds the `(stroke id, stroke vertex count, 0)` tag of every vertex.
///
/// Vertices without a stroke get `(0, 0, 0)`.
pub fn tag_vertices(vertices: &VertexStrokes, set: &StrokeSet) -> Vec<[f32; 3]> {
    assert_eq!(vertices.vertex_counts.len(), set.len());

    vertices
        .strokes
        .par_iter()
        .with_min_len(crate::vertex::VERTEX_BATCH)
        .map(|stroke| match *stroke {
            INVALID_STROKE => [0.0; 3],
            s => [set.id(s as usize), vertices.vertex_counts[s as usize] as f32, 0.0],
        })
        .collect()
}

/// Replaces channel `channel` of `mesh` with `tags`.
///
/// This mutates the mesh in place; callers needing the previous contents must copy the mesh first.
pub fn write_stroke_tags(mesh: &mut Mesh, channel: usize, tags: Vec<[f32; 3]>) {
    assert_eq!(tags.len(), mesh.vertex_count());

    mesh.set_channel(channel, AttributeChannel::Vec3(tags));
}

/// Writes the identifiers of `set` into the first component of channel `channel`, terminated by [MARKER_SENTINEL].
///
/// Slots after the sentinel are zero. The list is cut short if the set has more identifiers than the mesh has
/// vertices, and an identifier equal to the sentinel ends it early.
pub fn write_marker_list(mesh: &mut Mesh, channel: usize, set: &StrokeSet) {
    let vertex_count = mesh.vertex_count();

    if set.len() > vertex_count {
        warn!(
            "{}: {} stroke markers do not fit into {} vertices, list truncated",
            mesh.name,
            set.len(),
            vertex_count
        );
    }

    if set.ids().contains(&MARKER_SENTINEL) {
        warn!("{}: stroke id 0 terminates the marker list early", mesh.name);
    }

    let mut markers = vec![[MARKER_SENTINEL, 0.0]; vertex_count];

    for (slot, id) in markers.iter_mut().zip(set.ids()) {
        slot[0] = *id;
    }

    mesh.set_channel(channel, AttributeChannel::Vec2(markers));
}

/// Tags every vertex of `mesh` with its stroke and writes the marker list.
///
/// Keys are read from `config.key_channel`, tags are written to `config.tag_channel` and the marker list to
/// `config.marker_channel`. Running it again with unchanged keys produces identical channels.
pub fn tag_mesh(mesh: &mut Mesh, config: &SegmentConfig) -> Result<StrokeSet> {
    let keys = extract_keys(mesh, config.key_channel)?;
    let ids = collect_stroke_ids(mesh, &keys, config)?;

    let vertices = assign_stroke_ids(&keys, &ids, config.batch_size);
    let set = ids.set;

    if vertices.unmatched() > 0 {
        warn!(
            "{}: {} vertices match no stroke identifier",
            mesh.name,
            vertices.unmatched()
        );
    }

    let tags = tag_vertices(&vertices, &set);

    write_stroke_tags(mesh, config.tag_channel, tags);
    write_marker_list(mesh, config.marker_channel, &set);

    debug!("{}: tagged {} vertices with {} strokes", mesh.name, keys.len(), set.len());

    Ok(set)
}
