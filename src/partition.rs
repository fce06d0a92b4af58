//! Splitting a mesh into one independent sub-mesh per stroke

use log::{debug, warn};
use rayon::prelude::*;

use crate::config::{PartitionMode, SegmentConfig};
use crate::error::Result;
use crate::mesh::Mesh;
use crate::stroke::collect::collect_stroke_ids;
use crate::stroke::{StrokeRecord, StrokeSet};
use crate::triangle::collect::{collect, CollectedTriangles, VertexNumbering};
use crate::triangle::count::count_triangles;
use crate::triangle::remap::restore_source_indices;
use crate::vertex::extract_keys;
use crate::vertex::tag::{assign_stroke_ids, VertexStrokes};

/// Name of the container grouping the parts split off `source`.
pub fn separated_container_name(source: &str) -> String {
    format!("{source} (separated)")
}

/// Name of part `index` (0-based, in stroke iteration order) split off `source`.
pub fn part_name(source: &str, index: usize) -> String {
    format!("{source} ({index})")
}

/// One stroke split off a source mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokePart {
    pub record: StrokeRecord,
    pub mesh: Mesh,
    /// Source vertex of every vertex of `mesh`; empty when the part shares the source vertex array
    pub source_vertices: Vec<u32>,
}

impl StrokePart {
    /// Triangle list of the part expressed in source vertex indices.
    pub fn source_indices(&self) -> Vec<u32> {
        if self.source_vertices.is_empty() {
            self.mesh.indices.clone()
        } else {
            restore_source_indices(&self.mesh.indices, &self.source_vertices)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokePartition {
    pub container_name: String,
    pub parts: Vec<StrokePart>,
    /// Source triangles whose first vertex belongs to no stroke; they are in no part
    pub unattributed_triangles: usize,
}

impl StrokePartition {
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.parts.iter().map(|p| &p.mesh)
    }

    pub fn into_meshes(self) -> Vec<Mesh> {
        self.parts.into_iter().map(|p| p.mesh).collect()
    }

    /// Concatenated triangle lists of all parts in source vertex indices.
    ///
    /// Holds the same triangles as the source (minus unattributed ones); order is preserved within a stroke.
    pub fn source_indices(&self) -> Vec<u32> {
        self.parts.iter().flat_map(|p| p.source_indices()).collect()
    }
}

/// Intermediate results of the segmentation stages, threaded through the pipeline instead of stored on the mesh.
#[derive(Clone, Debug, Default)]
pub struct Segmentation {
    pub strokes: StrokeSet,
    pub vertices: VertexStrokes,
    pub triangles: CollectedTriangles,
}

impl Segmentation {
    pub fn record(&self, stroke: usize) -> StrokeRecord {
        let layout = &self.triangles.layout;

        StrokeRecord {
            stroke_id: self.strokes.id(stroke),
            vertex_count: self.vertices.vertex_counts[stroke],
            triangle_count: layout.counts[stroke],
            triangle_offset: layout.offsets[stroke],
        }
    }
}

/// Runs key extraction, identifier collection, vertex assignment, triangle counting and collection on `mesh`.
///
/// Triangle runs are collected with local vertex numbering for [PartitionMode::FullIsolation] and with source
/// numbering for [PartitionMode::SharedVertices]. The mesh is only read.
///
/// Fails if the key channel (or marker channel in explicit-marker mode) is missing, or if the mesh violates its
/// shape invariants.
pub fn segment(mesh: &Mesh, config: &SegmentConfig) -> Result<Segmentation> {
    mesh.validate()?;

    let keys = extract_keys(mesh, config.key_channel)?;
    let ids = collect_stroke_ids(mesh, &keys, config)?;

    let vertices = assign_stroke_ids(&keys, &ids, config.batch_size);
    let strokes = ids.set;

    let numbering = match config.partition_mode {
        PartitionMode::FullIsolation => VertexNumbering::Local,
        PartitionMode::SharedVertices => VertexNumbering::Global,
    };

    let layout = count_triangles(&mesh.indices, &vertices.strokes, strokes.len());
    let triangles = collect(&mesh.indices, &vertices.strokes, layout, numbering);

    Ok(Segmentation {
        strokes,
        vertices,
        triangles,
    })
}

fn build_part(mesh: &Mesh, segmentation: &Segmentation, stroke: usize) -> StrokePart {
    let name = part_name(&mesh.name, stroke);
    let triangles = &segmentation.triangles;
    let indices = triangles.stroke(stroke).to_vec();

    let (mesh, source_vertices) = match triangles.numbering {
        VertexNumbering::Local => {
            let source_vertices = triangles.source_vertices(stroke).to_vec();
            (mesh.subset(name, &source_vertices, indices), source_vertices)
        }
        VertexNumbering::Global => (mesh.with_shared_vertices(name, indices), Vec::new()),
    };

    StrokePart {
        record: segmentation.record(stroke),
        mesh,
        source_vertices,
    }
}

/// Splits `mesh` into one independent mesh per stroke.
///
/// Parts are produced in stroke iteration order and named `"<source> (<index>)"`. With
/// [PartitionMode::FullIsolation] each part keeps only the vertices its triangles use, renumbered by first
/// appearance; with [PartitionMode::SharedVertices] each part keeps the whole vertex array. Every attribute is
/// copied for the retained vertices.
///
/// A mesh without strokes yields an empty partition.
pub fn partition_by_stroke(mesh: &Mesh, config: &SegmentConfig) -> Result<StrokePartition> {
    let segmentation = segment(mesh, config)?;
    let container_name = separated_container_name(&mesh.name);
    let unattributed_triangles = segmentation.triangles.layout.unattributed;

    if segmentation.strokes.is_empty() {
        debug!("{}: no strokes, nothing to split", mesh.name);

        return Ok(StrokePartition {
            container_name,
            parts: Vec::new(),
            unattributed_triangles,
        });
    }

    if unattributed_triangles > 0 {
        warn!(
            "{}: {} triangles belong to no stroke and are not in any part",
            mesh.name, unattributed_triangles
        );
    }

    let parts: Vec<StrokePart> = (0..segmentation.strokes.len())
        .into_par_iter()
        .map(|stroke| build_part(mesh, &segmentation, stroke))
        .collect();

    debug!(
        "{}: split into {} parts ({:?})",
        mesh.name,
        parts.len(),
        config.partition_mode
    );

    Ok(StrokePartition {
        container_name,
        parts,
        unattributed_triangles,
    })
}
