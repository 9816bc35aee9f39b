//! Active/inactive lifecycle of per-index display nodes, plus the height cache.

use std::collections::HashMap;

use crate::NodeId;
use crate::config::non_negative;

/// The live record for one active index.
#[derive(Clone, Debug, PartialEq)]
pub struct PooledItem<C> {
    pub index: usize,
    pub content: C,
    pub node: Option<NodeId>,
    /// Last measured height for `index`, or the pool's default.
    pub height: f64,
    /// Offset the node was last placed at.
    pub offset: f64,
    /// Extent the node was last placed with (`None` when the host sizes it).
    pub extent: Option<f64>,
    pub last_used: f64,
}

/// A released entry waiting to be recycled.
///
/// Only the node survives: content is always rebuilt on reuse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spare {
    pub last_index: Option<usize>,
    pub node: Option<NodeId>,
    pub last_used: f64,
}

/// Outcome of [`ItemPool::release`].
#[derive(Clone, Debug, PartialEq)]
pub enum Release<C> {
    /// The index was not active.
    NotActive,
    /// The entry was moved to the inactive stack.
    Pooled,
    /// The inactive stack was full; the entry is handed back so its node can be destroyed.
    Discarded(PooledItem<C>),
}

/// Owns every pooled item and the height cache.
///
/// Invariants:
/// - an index is in at most one of {active, inactive};
/// - `inactive.len() <= capacity` after any release;
/// - the height cache is independent of membership and survives recycling.
#[derive(Clone, Debug)]
pub struct ItemPool<C> {
    active: HashMap<usize, PooledItem<C>>,
    inactive: Vec<Spare>,
    heights: HashMap<usize, f64>,
    capacity: usize,
    default_height: f64,
}

impl<C> ItemPool<C> {
    pub fn new(capacity: usize, default_height: f64) -> Self {
        Self {
            active: HashMap::new(),
            inactive: Vec::new(),
            heights: HashMap::new(),
            capacity,
            default_height: non_negative(default_height, 0.0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lowers or raises the inactive bound; spares above the new bound are returned.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<Spare> {
        self.capacity = capacity;
        if self.inactive.len() <= capacity {
            return Vec::new();
        }
        // Oldest spares sit at the bottom of the stack.
        let excess = self.inactive.len() - capacity;
        self.inactive.drain(..excess).collect()
    }

    pub fn default_height(&self) -> f64 {
        self.default_height
    }

    /// Changes the default height. Active items that were never measured pick it up.
    pub fn set_default_height(&mut self, height: f64) {
        self.default_height = non_negative(height, self.default_height);
        for item in self.active.values_mut() {
            if !self.heights.contains_key(&item.index) {
                item.height = self.default_height;
            }
        }
    }

    /// Returns the active item for `index`, making it active if needed.
    ///
    /// An inactive entry last used for the same index is preferred, then the top of the inactive
    /// stack. `factory` runs only when the index was not already active.
    pub fn acquire(
        &mut self,
        index: usize,
        now: f64,
        factory: impl FnOnce() -> C,
    ) -> &mut PooledItem<C> {
        let height = self.get_height(index);
        let inactive = &mut self.inactive;
        self.active.entry(index).or_insert_with(|| {
            let spare = inactive
                .iter()
                .rposition(|s| s.last_index == Some(index))
                .map(|pos| inactive.remove(pos))
                .or_else(|| inactive.pop());
            vtrace!(index, recycled = spare.is_some(), "ItemPool::acquire");
            PooledItem {
                index,
                content: factory(),
                node: spare.and_then(|s| s.node),
                height,
                offset: 0.0,
                extent: None,
                last_used: now,
            }
        })
    }

    /// Moves an active item to the inactive stack, or discards it when the stack is full.
    pub fn release(&mut self, index: usize, now: f64) -> Release<C> {
        let Some(mut item) = self.active.remove(&index) else {
            return Release::NotActive;
        };
        item.last_used = now;
        if self.inactive.len() >= self.capacity {
            vtrace!(index, "ItemPool::release: at capacity, discarding");
            return Release::Discarded(item);
        }
        self.inactive.push(Spare {
            last_index: Some(index),
            node: item.node,
            last_used: now,
        });
        Release::Pooled
    }

    /// Records a measured height. Negative or non-finite heights are stored as zero.
    pub fn update_height(&mut self, index: usize, height: f64) {
        let height = non_negative(height, 0.0);
        self.heights.insert(index, height);
        if let Some(item) = self.active.get_mut(&index) {
            item.height = height;
        }
    }

    /// Forgets the measured height of `index`.
    pub fn forget_height(&mut self, index: usize) {
        if self.heights.remove(&index).is_some() {
            if let Some(item) = self.active.get_mut(&index) {
                item.height = self.default_height;
            }
        }
    }

    /// Forgets measured heights at or beyond `len` (the collection shrank).
    pub fn truncate_heights(&mut self, len: usize) {
        self.heights.retain(|&i, _| i < len);
    }

    /// Drops every measured height but keeps items and spares.
    pub fn clear_heights(&mut self) {
        self.heights.clear();
        for item in self.active.values_mut() {
            item.height = self.default_height;
        }
    }

    pub fn get_height(&self, index: usize) -> f64 {
        self.heights
            .get(&index)
            .copied()
            .unwrap_or(self.default_height)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.heights.contains_key(&index)
    }

    /// Sums cached/default heights over `range`.
    pub fn get_total_height(&self, range: core::ops::Range<usize>) -> f64 {
        range.map(|i| self.get_height(i)).sum()
    }

    /// Evicts spares idle for longer than `max_age` seconds.
    pub fn trim(&mut self, max_age: f64, now: f64) -> Vec<Spare> {
        let mut evicted = Vec::new();
        self.inactive.retain(|s| {
            if now - s.last_used > max_age {
                evicted.push(*s);
                false
            } else {
                true
            }
        });
        if !evicted.is_empty() {
            vtrace!(evicted = evicted.len(), "ItemPool::trim");
        }
        evicted
    }

    /// Warms the inactive stack with up to `count` fresh spares (bounded by capacity).
    ///
    /// Returns how many spares were added.
    pub fn prefill(
        &mut self,
        count: usize,
        now: f64,
        mut make_node: impl FnMut() -> NodeId,
    ) -> usize {
        let room = self.capacity.saturating_sub(self.inactive.len());
        let n = count.min(room);
        for _ in 0..n {
            self.inactive.push(Spare {
                last_index: None,
                node: Some(make_node()),
                last_used: now,
            });
        }
        n
    }

    /// Empties the active set, the inactive stack and the height cache together.
    ///
    /// Returns every node handle that was held so the caller can tear them down.
    pub fn clear(&mut self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.active.drain().filter_map(|(_, it)| it.node).collect();
        nodes.extend(self.inactive.drain(..).filter_map(|s| s.node));
        self.heights.clear();
        vdebug!(nodes = nodes.len(), "ItemPool::clear");
        nodes
    }

    pub fn get(&self, index: usize) -> Option<&PooledItem<C>> {
        self.active.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PooledItem<C>> {
        self.active.get_mut(&index)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.contains_key(&index)
    }

    /// Active indices in ascending order.
    pub fn active_indices(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.active.keys().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.inactive.len()
    }

    pub fn cached_height_count(&self) -> usize {
        self.heights.len()
    }

    pub fn spares(&self) -> &[Spare] {
        &self.inactive
    }
}
