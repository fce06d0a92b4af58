//! Per-stroke triangle counting

use log::warn;
use rayon::prelude::*;

use super::TriangleLayout;
use crate::INVALID_STROKE;

/// Returns the stroke owning each triangle: the stroke of its first vertex.
///
/// The other two vertices are not consulted, so a triangle straddling a stroke boundary goes to whichever stroke its
/// first index belongs to.
pub fn triangle_strokes(indices: &[u32], vertex_strokes: &[u32]) -> Vec<u32> {
    assert_eq!(indices.len() % 3, 0);

    indices
        .par_chunks_exact(3)
        .with_min_len(256)
        .map(|triangle| vertex_strokes[triangle[0] as usize])
        .collect()
}

struct Tally {
    counts: Vec<u32>,
    first: Vec<usize>,
    end: Vec<usize>,
    unattributed: usize,
}

impl Tally {
    fn new(stroke_count: usize) -> Self {
        Self {
            counts: vec![0; stroke_count],
            first: vec![usize::MAX; stroke_count],
            end: vec![0; stroke_count],
            unattributed: 0,
        }
    }

    fn add(mut self, triangle: usize, stroke: u32) -> Self {
        if stroke == INVALID_STROKE {
            self.unattributed += 1;
            return self;
        }

        let s = stroke as usize;
        self.counts[s] += 3;
        self.first[s] = self.first[s].min(triangle);
        self.end[s] = self.end[s].max(triangle + 1);

        self
    }

    fn merge(mut self, other: Self) -> Self {
        for s in 0..self.counts.len() {
            self.counts[s] += other.counts[s];
            self.first[s] = self.first[s].min(other.first[s]);
            self.end[s] = self.end[s].max(other.end[s]);
        }
        self.unattributed += other.unattributed;

        self
    }
}

/// Counts the triangle-index slots of every stroke (3 per triangle whose first vertex belongs to it).
///
/// `vertex_strokes` holds the stroke index of every vertex ([INVALID_STROKE] for none). Triangles whose first vertex
/// has no stroke are reported in [TriangleLayout::unattributed] and belong to no run.
pub fn count_triangles(indices: &[u32], vertex_strokes: &[u32], stroke_count: usize) -> TriangleLayout {
    assert_eq!(indices.len() % 3, 0);

    let tally = indices
        .par_chunks_exact(3)
        .enumerate()
        .with_min_len(256)
        .fold(
            || Tally::new(stroke_count),
            |tally, (t, triangle)| {
                let vertex = triangle[0] as usize;
                assert!(vertex < vertex_strokes.len());

                tally.add(t, vertex_strokes[vertex])
            },
        )
        .reduce(|| Tally::new(stroke_count), Tally::merge);

    if tally.unattributed > 0 {
        warn!(
            "{} of {} triangles start at a vertex without a stroke and are left out",
            tally.unattributed,
            indices.len() / 3
        );
    }

    let spans = tally
        .first
        .iter()
        .zip(&tally.end)
        .map(|(first, end)| if first < end { *first..*end } else { 0..0 })
        .collect();

    TriangleLayout::new(tally.counts, spans, tally.unattributed)
}

#[cfg(test)]
mod test {
    use super::*;

    const X: u32 = INVALID_STROKE;

    #[test]
    fn test_count_two_strokes() {
        let vertex_strokes = [0, 0, 0, 0, 1, 1, 1, 1, 1];
        let indices = [0, 1, 2, 1, 2, 3, 4, 5, 6, 6, 7, 8];

        let layout = count_triangles(&indices, &vertex_strokes, 2);

        assert_eq!(layout.counts, vec![6, 6]);
        assert_eq!(layout.offsets, vec![0, 6]);
        assert_eq!(layout.spans, vec![0..2, 2..4]);
        assert_eq!(layout.unattributed, 0);
        assert_eq!(layout.total(), indices.len());
    }

    #[test]
    fn test_count_uses_first_vertex_only() {
        // triangle 1 straddles both strokes but starts in stroke 1
        let vertex_strokes = [0, 0, 0, 1, 1, 1];
        let indices = [0, 1, 2, 3, 2, 1, 3, 4, 5];

        let layout = count_triangles(&indices, &vertex_strokes, 2);

        assert_eq!(layout.counts, vec![3, 6]);
        assert_eq!(triangle_strokes(&indices, &vertex_strokes), vec![0, 1, 1]);
    }

    #[test]
    fn test_count_reports_unattributed() {
        let vertex_strokes = [0, 0, 0, X, X, X];
        let indices = [0, 1, 2, 3, 4, 5, 1, 3, 4];

        let layout = count_triangles(&indices, &vertex_strokes, 1);

        assert_eq!(layout.counts, vec![6]);
        assert_eq!(layout.unattributed, 1);
        assert_eq!(layout.total() + layout.unattributed * 3, indices.len());
    }

    #[test]
    fn test_count_stroke_without_triangles() {
        let vertex_strokes = [1, 1, 1, 0];
        let indices = [0, 1, 2];

        let layout = count_triangles(&indices, &vertex_strokes, 2);

        assert_eq!(layout.counts, vec![0, 3]);
        assert_eq!(layout.offsets, vec![0, 0]);
        assert_eq!(layout.spans, vec![0..0, 0..1]);
        assert_eq!(layout.range(0), 0..0);
    }

    #[test]
    fn test_count_many_triangles() {
        const TRIANGLES: usize = 10_000;

        let vertex_strokes: Vec<u32> = (0..TRIANGLES * 3).map(|v| (v / 300) as u32).collect();
        let indices: Vec<u32> = (0..(TRIANGLES * 3) as u32).collect();

        let layout = count_triangles(&indices, &vertex_strokes, 100);

        assert!(layout.counts.iter().all(|c| *c == 300));
        assert_eq!(layout.spans[7], 700..800);
        assert_eq!(layout.offsets[99], 99 * 300);
    }
}
