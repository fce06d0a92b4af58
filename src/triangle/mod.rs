//! Per-stroke triangle counting, collection and index remapping

pub mod collect;
pub mod count;
pub mod remap;

use std::ops::Range;

/// Layout of the per-stroke triangle runs inside one contiguous index buffer.
///
/// Counts are in triangle-index slots (3 per triangle). Stroke `i` owns `offsets[i]..offsets[i] + counts[i]`; the
/// ranges are disjoint and laid out in stroke order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriangleLayout {
    pub counts: Vec<u32>,
    pub offsets: Vec<usize>,
    /// Source triangles `first..end` containing every triangle of each stroke (empty for strokes without triangles)
    pub spans: Vec<Range<usize>>,
    /// Triangles whose first vertex belongs to no stroke; they appear in no stroke's run
    pub unattributed: usize,
}

impl TriangleLayout {
    pub fn new(counts: Vec<u32>, spans: Vec<Range<usize>>, unattributed: usize) -> Self {
        assert_eq!(counts.len(), spans.len());

        let offsets = collect::prefix_offsets(&counts);

        Self {
            counts,
            offsets,
            spans,
            unattributed,
        }
    }

    pub fn stroke_count(&self) -> usize {
        self.counts.len()
    }

    /// Slots of stroke `stroke` in the collected buffer.
    pub fn range(&self, stroke: usize) -> Range<usize> {
        let start = self.offsets[stroke];
        start..start + self.counts[stroke] as usize
    }

    /// Total number of collected triangle-index slots.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| *c as usize).sum()
    }
}
