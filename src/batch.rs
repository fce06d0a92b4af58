//! Multi-mesh commands with per-mesh failure isolation
//!
//! These mirror the editor commands "assign stroke identifiers", "split into per-stroke objects" and "split into
//! per-color objects". A failure on one mesh is logged and reported in its outcome; the other meshes are still
//! processed.

use log::{error, info};

use crate::color::partition_by_color;
use crate::config::SegmentConfig;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::partition::partition_by_stroke;
use crate::vertex::tag::tag_mesh;

/// New meshes split off one source, grouped under a container named `"<source> (separated)"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeparatedGroup {
    pub name: String,
    pub parts: Vec<Mesh>,
}

/// Result of a command for one selected mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionOutcome<T> {
    pub source: String,
    pub result: Result<T>,
}

impl<T> SelectionOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn run_isolated<M, T, F>(meshes: impl IntoIterator<Item = M>, command: &str, mut f: F) -> Vec<SelectionOutcome<T>>
where
    F: FnMut(M) -> (String, Result<T>),
{
    let outcomes: Vec<SelectionOutcome<T>> = meshes
        .into_iter()
        .map(|mesh| {
            let (source, result) = f(mesh);

            if let Err(err) = &result {
                error!("{command}: skipping {source}: {err}");
            }

            SelectionOutcome { source, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!("{command}: {} meshes processed, {failed} failed", outcomes.len());

    outcomes
}

/// Tags every mesh of the selection in place and returns its stroke count.
pub fn tag_selection(meshes: &mut [Mesh], config: &SegmentConfig) -> Vec<SelectionOutcome<usize>> {
    run_isolated(meshes.iter_mut(), "assign stroke ids", |mesh| {
        let result = tag_mesh(mesh, config).map(|set| set.len());
        (mesh.name.clone(), result)
    })
}

/// Splits every mesh of the selection into per-stroke meshes.
pub fn split_selection_by_stroke(meshes: &[Mesh], config: &SegmentConfig) -> Vec<SelectionOutcome<SeparatedGroup>> {
    run_isolated(meshes.iter(), "split by stroke", |mesh| {
        let result = partition_by_stroke(mesh, config).map(|partition| SeparatedGroup {
            name: partition.container_name.clone(),
            parts: partition.into_meshes(),
        });
        (mesh.name.clone(), result)
    })
}

/// Splits every mesh of the selection into per-color meshes.
pub fn split_selection_by_color(meshes: &[Mesh]) -> Vec<SelectionOutcome<SeparatedGroup>> {
    run_isolated(meshes.iter(), "split by color", |mesh| {
        let result = partition_by_color(mesh).map(|partition| SeparatedGroup {
            name: partition.container_name.clone(),
            parts: partition.into_meshes(),
        });
        (mesh.name.clone(), result)
    })
}
