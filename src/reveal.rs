//! Clip ranges for revealing split strokes over time
//!
//! Each stroke mesh is drawn with a `[start, end)` vertex clip window. Strokes are ordered by stroke id (their start
//! timestamp) and laid end to end, so revealing the first `n` vertices of the sketch means opening the windows of
//! the strokes covering them. Applying the ranges to materials is up to the host.

use log::debug;

use crate::error::{Error, Result};
use crate::partition::StrokePart;
use crate::stroke::keys_equal;

/// Clip end that makes the brush shader discard every vertex of a stroke.
pub const CLIP_END_HIDE_ALL: f32 = 0.0001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStroke {
    /// Stroke id, the timestamp (in milliseconds) the stroke was started at
    pub stroke_id: f32,
    /// Latest timestamp of the stroke's vertices
    pub end_timestamp: f32,
    pub vertex_count: usize,
}

impl RevealStroke {
    /// Builds the reveal entry of a split stroke, reading its timestamps from channel `key_channel`.
    pub fn from_part(part: &StrokePart, key_channel: usize) -> Self {
        let end_timestamp = part
            .mesh
            .channel(key_channel)
            .map(|channel| {
                (0..channel.len())
                    .map(|v| channel.get(v, 0))
                    .fold(part.record.stroke_id, f32::max)
            })
            .unwrap_or(part.record.stroke_id);

        Self {
            stroke_id: part.record.stroke_id,
            end_timestamp,
            vertex_count: part.mesh.vertex_count(),
        }
    }
}

/// Vertex clip window of one stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipRange {
    pub start: f32,
    pub end: f32,
}

impl ClipRange {
    pub const HIDDEN: Self = Self {
        start: 0.0,
        end: CLIP_END_HIDE_ALL,
    };

    pub fn is_hidden(&self) -> bool {
        self.end <= self.start || self.end == CLIP_END_HIDE_ALL
    }
}

/// Strokes of a sketch in reveal order.
///
/// Slots hold `None` for strokes whose scene object was destroyed; such slots are skipped and get no clip range.
#[derive(Clone, Debug, Default)]
pub struct RevealTimeline {
    slots: Vec<Option<RevealStroke>>,
    // live slots in reveal order
    order: Vec<usize>,
    // first global vertex of each entry of `order`
    bases: Vec<usize>,
    total_vertex_count: usize,
}

impl RevealTimeline {
    pub fn new(slots: Vec<Option<RevealStroke>>, epsilon: f32) -> Self {
        let mut order: Vec<usize> = (0..slots.len()).filter(|s| slots[*s].is_some()).collect();

        let id = |slot: usize| slots[slot].map_or(f32::NAN, |s| s.stroke_id);
        order.sort_by(|a, b| id(*a).total_cmp(&id(*b)));

        let merged = order
            .windows(2)
            .filter(|pair| keys_equal(id(pair[0]), id(pair[1]), epsilon))
            .count();

        if merged > 0 {
            debug!("{merged} strokes share a stroke id with their predecessor");
        }

        let mut bases = Vec::with_capacity(order.len());
        let mut total_vertex_count = 0;

        for slot in &order {
            bases.push(total_vertex_count);
            total_vertex_count += slots[*slot].map_or(0, |s| s.vertex_count);
        }

        Self {
            slots,
            order,
            bases,
            total_vertex_count,
        }
    }

    /// Returns the stroke in slot `slot`, or [Error::DanglingSceneReference] if it was destroyed.
    pub fn stroke(&self, slot: usize) -> Result<&RevealStroke> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or(Error::DanglingSceneReference { slot })
    }

    /// Marks the stroke in slot `slot` as destroyed.
    pub fn release(&mut self, slot: usize) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = None;
        }
    }

    /// Live slots in reveal order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn total_vertex_count(&self) -> usize {
        self.total_vertex_count
    }

    /// Duration of the recorded sketch in seconds, from the first stroke's start to the last stroke's end.
    pub fn sketch_seconds(&self) -> f32 {
        let first = self.order.first().and_then(|s| self.stroke(*s).ok());
        let last = self.order.last().and_then(|s| self.stroke(*s).ok());

        match (first, last) {
            (Some(first), Some(last)) => (last.end_timestamp - first.stroke_id).max(0.0) / 1000.0,
            _ => 0.0,
        }
    }

    /// Returns the slot and local vertex index of global vertex `vertex`.
    pub fn locate(&self, vertex: usize) -> Option<(usize, usize)> {
        if vertex >= self.total_vertex_count {
            return None;
        }

        let entry = self.bases.partition_point(|base| *base <= vertex) - 1;

        Some((self.order[entry], vertex - self.bases[entry]))
    }

    /// Returns the clip range of every slot so that exactly the global vertices `first..=last` are shown.
    ///
    /// Dangling slots get `None`.
    pub fn show_range(&self, first: usize, last: usize) -> Vec<Option<ClipRange>> {
        self.map_strokes(|base, count| {
            let start = first.max(base);
            let end = last.saturating_add(1).min(base + count);

            if start < end {
                ClipRange {
                    start: (start - base) as f32,
                    end: (end - base) as f32,
                }
            } else {
                ClipRange::HIDDEN
            }
        })
    }

    /// Returns the clip range of every slot so that the global vertices `first..=last` are hidden and the rest shown.
    ///
    /// A stroke has a single clip window, so when the hidden range lies strictly inside one stroke only the part
    /// before it stays visible. Dangling slots get `None`.
    pub fn hide_range(&self, first: usize, last: usize) -> Vec<Option<ClipRange>> {
        self.map_strokes(|base, count| {
            let start = first.max(base);
            let end = last.saturating_add(1).min(base + count);

            let (visible_start, visible_end) = if start >= end {
                (0, count)
            } else if start > base {
                (0, start - base)
            } else if end < base + count {
                (end - base, count)
            } else {
                return ClipRange::HIDDEN;
            };

            ClipRange {
                start: visible_start as f32,
                end: visible_end as f32,
            }
        })
    }

    // calls `f` with the first global vertex and vertex count of every live stroke
    fn map_strokes<F>(&self, f: F) -> Vec<Option<ClipRange>>
    where
        F: Fn(usize, usize) -> ClipRange,
    {
        let mut ranges = vec![None; self.slots.len()];

        for (entry, slot) in self.order.iter().enumerate() {
            match self.stroke(*slot) {
                Ok(stroke) => ranges[*slot] = Some(f(self.bases[entry], stroke.vertex_count)),
                Err(err) => debug!("{err}, skipped"),
            }
        }

        ranges
    }

    /// Returns the clip range of every slot at normalized time `t` (`0` hides everything, `1` shows everything).
    pub fn clip_ranges(&self, t: f32) -> Vec<Option<ClipRange>> {
        let t = t.clamp(0.0, 1.0);

        if self.total_vertex_count == 0 || t.is_nan() || t <= 0.0 {
            return self.show_range(1, 0);
        }

        let last = self.total_vertex_count - 1;
        let vertex = (t * last as f32) as usize;

        self.show_range(0, vertex.min(last))
    }
}

/// Time-driven playback of a reveal, optionally looping or reversed.
#[derive(Clone, Debug)]
pub struct RevealPlayback {
    duration: f32,
    elapsed: f32,
    looping: bool,
    reverse: bool,
    finished: bool,
}

impl RevealPlayback {
    /// Creates a playback lasting `duration` seconds.
    pub fn new(duration: f32, looping: bool, reverse: bool) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            looping,
            reverse,
            finished: false,
        }
    }

    /// Returns the normalized time of the current frame and advances by `delta` seconds.
    ///
    /// Returns `None` once a non-looping playback has run past its duration.
    pub fn advance(&mut self, delta: f32) -> Option<f32> {
        if self.finished {
            return None;
        }

        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };

        self.elapsed += delta;

        if self.elapsed > self.duration {
            if self.looping {
                self.elapsed = 0.0;
            } else {
                self.finished = true;
            }
        }

        Some(if self.reverse { 1.0 - t } else { t })
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.finished = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use approx::assert_relative_eq;

    use crate::config::SegmentConfig;
    use crate::partition::partition_by_stroke;
    use crate::test_util::keyed_strip_mesh;
    use crate::KEY_EPSILON;

    fn stroke(stroke_id: f32, vertex_count: usize) -> Option<RevealStroke> {
        Some(RevealStroke {
            stroke_id,
            end_timestamp: stroke_id + 500.0,
            vertex_count,
        })
    }

    fn shown(start: f32, end: f32) -> Option<ClipRange> {
        Some(ClipRange { start, end })
    }

    #[test]
    fn test_order_and_locate() {
        // slot 1 is dangling
        let timeline = RevealTimeline::new(vec![stroke(3000.0, 4), None, stroke(1000.0, 2), stroke(2000.0, 3)], KEY_EPSILON);

        assert_eq!(timeline.order(), &[2, 3, 0]);
        assert_eq!(timeline.total_vertex_count(), 9);
        assert_eq!(timeline.locate(0), Some((2, 0)));
        assert_eq!(timeline.locate(2), Some((3, 0)));
        assert_eq!(timeline.locate(8), Some((0, 3)));
        assert_eq!(timeline.locate(9), None);
        assert_eq!(timeline.stroke(1), Err(Error::DanglingSceneReference { slot: 1 }));
        assert_relative_eq!(timeline.sketch_seconds(), 2.5);
    }

    #[test]
    fn test_show_range() {
        let timeline = RevealTimeline::new(vec![stroke(1000.0, 2), None, stroke(2000.0, 3), stroke(3000.0, 4)], KEY_EPSILON);

        let ranges = timeline.show_range(0, 3);

        assert_eq!(ranges[0], shown(0.0, 2.0));
        assert_eq!(ranges[1], None);
        assert_eq!(ranges[2], shown(0.0, 2.0));
        assert_eq!(ranges[3], Some(ClipRange::HIDDEN));
    }

    #[test]
    fn test_show_range_to_end() {
        let timeline = RevealTimeline::new(vec![stroke(1000.0, 2), stroke(2000.0, 3)], KEY_EPSILON);

        assert_eq!(timeline.show_range(0, usize::MAX), vec![shown(0.0, 2.0), shown(0.0, 3.0)]);
    }

    #[test]
    fn test_hide_range() {
        let timeline = RevealTimeline::new(vec![stroke(1000.0, 2), None, stroke(2000.0, 3), stroke(3000.0, 4)], KEY_EPSILON);

        // hide the tail starting inside the second stroke
        let ranges = timeline.hide_range(3, 8);
        assert_eq!(ranges[0], shown(0.0, 2.0));
        assert_eq!(ranges[1], None);
        assert_eq!(ranges[2], shown(0.0, 1.0));
        assert_eq!(ranges[3], Some(ClipRange::HIDDEN));

        // hide the head ending inside the third stroke
        let ranges = timeline.hide_range(0, 6);
        assert_eq!(ranges[0], Some(ClipRange::HIDDEN));
        assert_eq!(ranges[2], Some(ClipRange::HIDDEN));
        assert_eq!(ranges[3], shown(2.0, 4.0));

        assert!(timeline.hide_range(0, usize::MAX).iter().flatten().all(ClipRange::is_hidden));
    }

    #[test]
    fn test_clip_ranges_endpoints() {
        let timeline = RevealTimeline::new(vec![stroke(1000.0, 2), stroke(2000.0, 3)], KEY_EPSILON);

        assert!(timeline.clip_ranges(0.0).iter().flatten().all(ClipRange::is_hidden));
        assert_eq!(timeline.clip_ranges(1.0), vec![shown(0.0, 2.0), shown(0.0, 3.0)]);
        assert_eq!(timeline.clip_ranges(7.0), timeline.clip_ranges(1.0));

        // 0.5 * 4 = vertex 2, the first vertex of the second stroke
        assert_eq!(timeline.clip_ranges(0.5), vec![shown(0.0, 2.0), shown(0.0, 1.0)]);
    }

    #[test]
    fn test_release_skips_slot() {
        let mut timeline = RevealTimeline::new(vec![stroke(1000.0, 2), stroke(2000.0, 3)], KEY_EPSILON);

        timeline.release(0);
        let ranges = timeline.clip_ranges(1.0);

        assert_eq!(ranges[0], None);
        assert_eq!(ranges[1], shown(0.0, 3.0));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = RevealTimeline::new(vec![None, None], KEY_EPSILON);

        assert_eq!(timeline.clip_ranges(0.5), vec![None, None]);
        assert_eq!(timeline.sketch_seconds(), 0.0);
        assert_eq!(timeline.locate(0), None);
    }

    #[test]
    fn test_from_partition() {
        let mesh = keyed_strip_mesh("sketch", &[4, 3], &[2000.0, 1000.0]);
        let partition = partition_by_stroke(&mesh, &SegmentConfig::default()).unwrap();

        let slots = partition.parts.iter().map(|p| Some(RevealStroke::from_part(p, 2))).collect();
        let timeline = RevealTimeline::new(slots, KEY_EPSILON);

        assert_eq!(timeline.order(), &[1, 0]);
        assert_eq!(timeline.total_vertex_count(), 7);
        assert_relative_eq!(timeline.sketch_seconds(), 1.0);
    }

    #[test]
    fn test_playback() {
        let mut playback = RevealPlayback::new(1.0, false, false);

        assert_eq!(playback.advance(0.5), Some(0.0));
        assert_eq!(playback.advance(0.5), Some(0.5));
        assert_eq!(playback.advance(0.5), Some(1.0));
        assert!(playback.is_finished());
        assert_eq!(playback.advance(0.5), None);

        playback.restart();
        assert_eq!(playback.advance(0.25), Some(0.0));
    }

    #[test]
    fn test_playback_loop_reverse() {
        let mut playback = RevealPlayback::new(1.0, true, true);

        assert_eq!(playback.advance(0.75), Some(1.0));
        assert_eq!(playback.advance(0.75), Some(0.25));
        assert_eq!(playback.advance(0.75), Some(1.0));
        assert!(!playback.is_finished());
    }
}
