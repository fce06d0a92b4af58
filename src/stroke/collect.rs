//! Derivation of the distinct stroke identifiers of a mesh

use log::{debug, warn};
use rayon::prelude::*;

use super::{keys_equal, StrokeSet};
use crate::config::{IdMode, SegmentConfig};
use crate::error::Result;
use crate::mesh::Mesh;
use crate::vertex::extract_keys;
use crate::INVALID_STROKE;

/// Value terminating the marker list; never a legal stroke identifier.
pub const MARKER_SENTINEL: f32 = 0.0;

/// Returns the indices of vertices whose key differs from the preceding vertex's key by at least `epsilon`.
///
/// Vertex 0 is never reported; a mesh with `n` boundaries holds `n + 1` runs.
pub fn stroke_boundaries(keys: &[f32], epsilon: f32) -> Vec<usize> {
    (1..keys.len())
        .into_par_iter()
        .with_min_len(1024)
        .filter(|i| !keys_equal(keys[*i - 1], keys[*i], epsilon))
        .collect()
}

/// Runs of consecutive epsilon-equal keys found by a boundary scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrokeRuns {
    /// First vertex of every run, ascending and starting at 0
    pub starts: Vec<usize>,
    /// Stroke index of every run, [INVALID_STROKE] for runs with a non-finite key
    pub strokes: Vec<u32>,
}

impl StrokeRuns {
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Returns the stroke index of the run containing `vertex`.
    pub fn stroke_at(&self, vertex: usize) -> u32 {
        self.starts
            .partition_point(|start| *start <= vertex)
            .checked_sub(1)
            .map_or(INVALID_STROKE, |run| self.strokes[run])
    }
}

/// Walks vertices in stored order and returns the stroke identifiers together with the runs they were read from.
///
/// Every run of keys where each key epsilon-matches its predecessor is one stroke; the run's identifier is the key
/// of its first vertex. Keys may drift by more than `epsilon` over a long run, so vertices belong to the stroke of
/// their run rather than to whichever identifier their own key matches. A run whose first key matches an earlier
/// stroke is merged into it.
pub fn scan_stroke_runs(keys: &[f32], epsilon: f32) -> (StrokeSet, StrokeRuns) {
    let mut set = StrokeSet::new(epsilon);
    let mut runs = StrokeRuns::default();

    if keys.is_empty() {
        return (set, runs);
    }

    let boundaries = stroke_boundaries(keys, epsilon);
    let mut merged_runs = 0;

    runs.starts.reserve(boundaries.len() + 1);
    runs.strokes.reserve(boundaries.len() + 1);

    for start in std::iter::once(0).chain(boundaries.iter().copied()) {
        let key = keys[start];
        let known = set.len();

        let stroke = match set.insert(key) {
            Some(index) if (index as usize) < known => {
                merged_runs += 1;
                index
            }
            Some(index) => {
                if key == MARKER_SENTINEL {
                    warn!("stroke starting at vertex {start} has key 0, which collides with the marker sentinel");
                }
                index
            }
            None => {
                warn!("vertex {start} has a non-finite stroke key, run ignored");
                INVALID_STROKE
            }
        };

        runs.starts.push(start);
        runs.strokes.push(stroke);
    }

    if merged_runs > 0 {
        warn!(
            "{merged_runs} vertex runs repeat an earlier stroke key; vertices are not stored contiguously per stroke"
        );
    }

    debug!("boundary scan: {} boundaries, {} strokes", boundaries.len(), set.len());

    (set, runs)
}

/// Collects stroke identifiers by walking vertices in stored order.
///
/// See [scan_stroke_runs]; only the identifiers are returned.
pub fn collect_boundary_scan(keys: &[f32], epsilon: f32) -> StrokeSet {
    scan_stroke_runs(keys, epsilon).0
}

/// Collects stroke identifiers from a producer-written marker list.
///
/// The list is read until the first [MARKER_SENTINEL] or its end. Duplicate markers (up to `epsilon`) are dropped.
pub fn collect_explicit_markers(markers: &[f32], epsilon: f32) -> StrokeSet {
    let listed = markers
        .iter()
        .copied()
        .take_while(|m| *m != MARKER_SENTINEL);

    let set = StrokeSet::from_ids(listed, epsilon);

    debug!("explicit markers: {} strokes", set.len());

    set
}

/// Stroke identifiers of a mesh and, in boundary-scan mode, the vertex runs they were read from.
#[derive(Clone, Debug, Default)]
pub struct StrokeIds {
    pub set: StrokeSet,
    pub runs: Option<StrokeRuns>,
}

/// Collects the stroke identifiers of `mesh` using the mode selected in `config`.
///
/// `keys` are the per-vertex keys already extracted from `config.key_channel`; they are only used by
/// [IdMode::BoundaryScan].
pub fn collect_stroke_ids(mesh: &Mesh, keys: &[f32], config: &SegmentConfig) -> Result<StrokeIds> {
    match config.id_mode {
        IdMode::BoundaryScan => {
            let (set, runs) = scan_stroke_runs(keys, config.epsilon);
            Ok(StrokeIds { set, runs: Some(runs) })
        }
        IdMode::ExplicitMarkers => {
            let markers = extract_keys(mesh, config.marker_channel)?;
            Ok(StrokeIds {
                set: collect_explicit_markers(&markers, config.epsilon),
                runs: None,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::error::Error;
    use crate::mesh::AttributeChannel;
    use crate::KEY_EPSILON;

    #[test]
    fn test_boundaries() {
        let keys = [1.0, 1.0, 1.0000049, 2.0, 2.0, 3.0];

        assert_eq!(stroke_boundaries(&keys, KEY_EPSILON), vec![3, 5]);
        assert!(stroke_boundaries(&[], KEY_EPSILON).is_empty());
        assert!(stroke_boundaries(&[5.0], KEY_EPSILON).is_empty());
    }

    #[test]
    fn test_boundary_scan_counts_runs() {
        let keys = [1.0, 1.0, 1.0, 2.0, 2.0, 1.00002, 1.00002];

        let boundaries = stroke_boundaries(&keys, KEY_EPSILON);
        let set = collect_boundary_scan(&keys, KEY_EPSILON);

        assert_eq!(set.len(), boundaries.len() + 1);
        assert_eq!(set.ids(), &[1.0, 2.0, 1.00002]);
    }

    #[test]
    fn test_boundary_scan_merges_interleaved_runs() {
        let keys = [1.0, 1.0, 2.0, 1.0, 3.0];

        let set = collect_boundary_scan(&keys, KEY_EPSILON);

        assert_eq!(set.ids(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_boundary_scan_uses_first_key_of_run() {
        let keys = [5.0, 5.000004, 5.000008];

        let set = collect_boundary_scan(&keys, KEY_EPSILON);

        assert_eq!(set.ids(), &[5.0]);
    }

    #[test]
    fn test_explicit_markers_stop_at_sentinel() {
        let markers = [3.0, 1.0, 3.000001, 2.0, 0.0, 7.0, 8.0];

        let set = collect_explicit_markers(&markers, KEY_EPSILON);

        assert_eq!(set.ids(), &[3.0, 1.0, 2.0]);
        assert!(!set.contains(7.0));
        assert!(collect_explicit_markers(&[0.0, 1.0], KEY_EPSILON).is_empty());
    }

    #[test]
    fn test_explicit_markers_without_sentinel() {
        let set = collect_explicit_markers(&[4.0, 5.0], KEY_EPSILON);

        assert_eq!(set.ids(), &[4.0, 5.0]);
    }

    #[test]
    fn test_collect_stroke_ids_marker_channel_required() {
        let mesh = Mesh::new("m", vec![[0.0; 3]; 2], Vec::new())
            .with_channel(2, AttributeChannel::Vec3(vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]));
        let config = SegmentConfig::default().with_id_mode(IdMode::ExplicitMarkers);

        let err = collect_stroke_ids(&mesh, &[1.0, 2.0], &config).unwrap_err();
        assert_eq!(err, Error::MissingAttributeChannel { channel: 4 });

        let mesh = mesh.with_channel(4, AttributeChannel::Vec2(vec![[2.0, 0.0], [0.0, 0.0]]));
        let ids = collect_stroke_ids(&mesh, &[1.0, 2.0], &config).unwrap();
        assert_eq!(ids.set.ids(), &[2.0]);
        assert!(ids.runs.is_none());
    }

    #[test]
    fn test_scan_runs_with_drifting_keys() {
        // each step is below epsilon, the whole run drifts past it
        let keys = [1.0, 1.000008, 1.000016, 2.0, 2.000008, 1.0];

        let (set, runs) = scan_stroke_runs(&keys, KEY_EPSILON);

        assert_eq!(set.ids(), &[1.0, 2.0]);
        assert_eq!(runs.starts, vec![0, 3, 5]);
        assert_eq!(runs.strokes, vec![0, 1, 0]);
        assert_eq!(runs.stroke_at(2), 0);
        assert_eq!(runs.stroke_at(4), 1);
        assert_eq!(runs.stroke_at(5), 0);
    }

    #[test]
    fn test_scan_runs_non_finite_key() {
        let (set, runs) = scan_stroke_runs(&[1.0, f32::NAN, 2.0], KEY_EPSILON);

        assert_eq!(set.ids(), &[1.0, 2.0]);
        assert_eq!(runs.strokes, vec![0, INVALID_STROKE, 1]);
        assert!(scan_stroke_runs(&[], KEY_EPSILON).1.is_empty());
    }
}
