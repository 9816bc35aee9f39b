//! Offset math for the windowed scroller.
//!
//! The scroller needs three things from item heights: the offset of an index, the total content
//! extent, and the index range intersecting a viewport. A forward walk over cached heights gives
//! all three in `O(range)`, but re-walks from index 0 on every recompute. `Layout` keeps the same
//! heights in a Fenwick tree instead, so each query is `O(log n)` with identical results.

use crate::VisibleRange;
use crate::fenwick::Fenwick;

#[derive(Clone, Debug)]
pub(crate) struct Layout {
    heights: Vec<f64>,
    sums: Fenwick,
}

impl Layout {
    pub(crate) fn new() -> Self {
        Self {
            heights: Vec::new(),
            sums: Fenwick::new(0),
        }
    }

    /// Rebuilds from scratch for `count` items.
    pub(crate) fn rebuild(&mut self, count: usize, height_of: impl Fn(usize) -> f64) {
        self.heights.clear();
        self.heights.reserve_exact(count);
        self.heights.extend((0..count).map(height_of));
        self.sums = Fenwick::from_heights(&self.heights);
    }

    /// Grows or shrinks to `count` items, keeping the heights of surviving indices.
    pub(crate) fn resize(&mut self, count: usize, height_of: impl Fn(usize) -> f64) {
        let cur = self.heights.len();
        if count < cur {
            self.heights.truncate(count);
            self.sums.truncate(count);
        } else {
            for i in cur..count {
                let h = height_of(i);
                self.heights.push(h);
                self.sums.push(h);
            }
        }
        debug_assert_eq!(self.heights.len(), self.sums.len());
    }

    pub(crate) fn len(&self) -> usize {
        self.heights.len()
    }

    pub(crate) fn height(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied()
    }

    /// Sets the height of `index`, returning the signed change.
    pub(crate) fn set_height(&mut self, index: usize, height: f64) -> f64 {
        let Some(slot) = self.heights.get_mut(index) else {
            return 0.0;
        };
        let delta = height - *slot;
        if delta == 0.0 {
            return 0.0;
        }
        *slot = height;
        self.sums.add(index, delta);
        delta
    }

    pub(crate) fn total(&self) -> f64 {
        self.sums.total()
    }

    /// Cumulative offset of `index` (the sum of all heights before it).
    pub(crate) fn offset_of(&self, index: usize) -> f64 {
        self.sums.prefix_sum(index)
    }

    pub(crate) fn max_position(&self, viewport: f64) -> f64 {
        (self.total() - viewport).max(0.0)
    }

    /// The strictly visible range for a viewport at `position` (no overscan).
    ///
    /// `start` is the first index whose end lies past `position`; `end` is one past the last
    /// index that starts before `position + viewport`.
    pub(crate) fn visible_range(&self, position: f64, viewport: f64) -> VisibleRange {
        let count = self.len();
        if count == 0 || viewport <= 0.0 {
            return VisibleRange::EMPTY;
        }
        let position = position.clamp(0.0, self.max_position(viewport));
        let start = self.sums.lower_bound(position).min(count - 1);
        let starts_before_end = self.sums.strict_lower_bound(position + viewport) + 1;
        let end = starts_before_end.min(count).max(start + 1);
        VisibleRange { start, end }
    }

    /// Index whose interval contains `offset`, clamped into the list.
    pub(crate) fn index_at(&self, offset: f64) -> Option<usize> {
        let count = self.len();
        if count == 0 {
            return None;
        }
        Some(self.sums.lower_bound(offset.max(0.0)).min(count - 1))
    }
}
