//! Stroke keys, identifier sets and per-stroke records

pub mod collect;

use std::cmp::Ordering;

/// Returns `true` if two stroke keys denote the same stroke.
///
/// Keys are float timestamps that lose precision when stored in UV channels, so they are never compared with `==`.
#[inline(always)]
pub fn keys_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Distinct stroke identifiers in iteration order, with `O(log S)` epsilon lookup.
///
/// Representatives are kept pairwise at least `epsilon` apart: a key that epsilon-matches an existing identifier
/// resolves to it instead of being inserted. The iteration order (insertion order) defines stroke indices, part names
/// and triangle layout order.
#[derive(Clone, Debug, Default)]
pub struct StrokeSet {
    ids: Vec<f32>,
    // (key, stroke index) sorted by key
    sorted: Vec<(f32, u32)>,
    epsilon: f32,
}

impl StrokeSet {
    pub fn new(epsilon: f32) -> Self {
        Self {
            ids: Vec::new(),
            sorted: Vec::new(),
            epsilon,
        }
    }

    /// Builds a set from identifiers, dropping later duplicates (up to `epsilon`) and non-finite values.
    pub fn from_ids<I>(ids: I, epsilon: f32) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut set = Self::new(epsilon);

        for id in ids {
            set.insert(id);
        }

        set
    }

    /// Returns the stroke index of `key`, inserting it as a new stroke if nothing matches.
    ///
    /// Returns `None` for NaN and infinite keys, which never identify a stroke.
    pub fn insert(&mut self, key: f32) -> Option<u32> {
        if !key.is_finite() {
            return None;
        }

        if let Some(index) = self.find(key) {
            return Some(index);
        }

        let index = self.ids.len() as u32;
        let position = self.sorted.partition_point(|(k, _)| *k < key);

        self.ids.push(key);
        self.sorted.insert(position, (key, index));

        Some(index)
    }

    /// Returns the index of the stroke whose identifier epsilon-matches `key`.
    ///
    /// If two identifiers are within `epsilon` of `key`, the nearest one wins (the lower one on a tie).
    pub fn find(&self, key: f32) -> Option<u32> {
        if !key.is_finite() {
            return None;
        }

        let position = self.sorted.partition_point(|(k, _)| *k < key);

        // only the neighbours around the insertion point can be within epsilon
        let below = position.checked_sub(1).map(|p| self.sorted[p]);
        let above = self.sorted.get(position).copied();

        let nearest = match (below, above) {
            (Some(b), Some(a)) => {
                if (key - b.0).abs() <= (a.0 - key).abs() {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (b, a) => b.or(a),
        };

        nearest
            .filter(|(k, _)| keys_equal(*k, key, self.epsilon))
            .map(|(_, index)| index)
    }

    pub fn contains(&self, key: f32) -> bool {
        self.find(key).is_some()
    }

    /// Identifiers in iteration order.
    pub fn ids(&self) -> &[f32] {
        &self.ids
    }

    /// Identifier of the stroke at `index`.
    pub fn id(&self, index: usize) -> f32 {
        self.ids[index]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Orders two identifiers, treating epsilon-equal ones as equal.
    pub fn compare(&self, a: f32, b: f32) -> Ordering {
        if keys_equal(a, b, self.epsilon) {
            Ordering::Equal
        } else {
            a.total_cmp(&b)
        }
    }
}

/// Per-stroke bookkeeping of one partition run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrokeRecord {
    pub stroke_id: f32,
    /// Number of source vertices tagged with this stroke
    pub vertex_count: u32,
    /// Triangle-index slots owned by this stroke (3 per triangle)
    pub triangle_count: u32,
    /// Start of the stroke's slots in the collected triangle buffer
    pub triangle_offset: usize,
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::KEY_EPSILON;

    #[test]
    fn test_keys_equal_boundary() {
        assert!(keys_equal(1.000000, 1.0000049, KEY_EPSILON));
        assert!(!keys_equal(1.000000, 1.00002, KEY_EPSILON));
        assert!(!keys_equal(f32::NAN, f32::NAN, KEY_EPSILON));
    }

    #[test]
    fn test_insert_dedups_with_epsilon() {
        let mut set = StrokeSet::new(KEY_EPSILON);

        assert_eq!(set.insert(2.0), Some(0));
        assert_eq!(set.insert(1.0), Some(1));
        assert_eq!(set.insert(1.0000049), Some(1));
        assert_eq!(set.insert(2.00002), Some(2));
        assert_eq!(set.insert(f32::NAN), None);

        assert_eq!(set.ids(), &[2.0, 1.0, 2.00002]);
    }

    #[test]
    fn test_find_picks_nearest() {
        let set = StrokeSet::from_ids([1.0, 1.000012], KEY_EPSILON);

        assert_eq!(set.len(), 2);
        assert_eq!(set.find(1.000002), Some(0));
        assert_eq!(set.find(1.000010), Some(1));
        assert_eq!(set.find(0.99), None);
        assert_eq!(set.find(f32::INFINITY), None);
    }

    #[test]
    fn test_find_large_set() {
        let ids: Vec<f32> = (0..1000).map(|i| 1000.0 + i as f32 * 0.5).collect();
        let set = StrokeSet::from_ids(ids.iter().rev().copied(), KEY_EPSILON);

        assert_eq!(set.len(), 1000);

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(set.find(*id), Some(999 - i as u32));
        }

        assert_eq!(set.find(1000.25), None);
    }

    #[test]
    fn test_compare() {
        let set = StrokeSet::new(KEY_EPSILON);

        assert_eq!(set.compare(1.0, 1.000001), Ordering::Equal);
        assert_eq!(set.compare(1.0, 2.0), Ordering::Less);
        assert_eq!(set.compare(3.0, 2.0), Ordering::Greater);
    }
}
