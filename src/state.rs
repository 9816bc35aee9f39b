use crate::VisibleRange;

/// Where a [`crate::WindowedScroller`] is in its lifecycle.
///
/// While mounted, every accepted sample, resize or invalidation runs
/// `Idle → RangeComputed → Rendered → Idle` to completion before returning, so callers only ever
/// observe `Idle` or `Unmounted`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[default]
    Unmounted,
    Idle,
    RangeComputed,
    Rendered,
}

/// A saved scroll position.
///
/// The anchor (first visible index plus the distance scrolled into it) keeps the same item at
/// the top even when heights measured later differ from the estimates used on restore.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub position: f64,
    pub anchor_index: usize,
    pub anchor_offset: f64,
}

/// Diagnostics returned by [`crate::WindowedScroller::statistics`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    pub active_count: usize,
    pub inactive_count: usize,
    pub cached_heights: usize,
    pub item_count: usize,
    /// Rendered range, overscan included.
    pub visible_range: VisibleRange,
    /// Strictly visible range, no overscan.
    pub viewport_range: VisibleRange,
    pub scroll_position: f64,
    pub velocity: f64,
    pub content_extent: f64,
    pub viewport_extent: f64,
    pub mounted: bool,
    /// Items currently reported as intersecting by the viewport observer.
    pub intersecting: usize,
    /// Host render calls that failed since construction.
    pub failed_renders: usize,
    /// Range/diff passes run since construction.
    pub render_passes: usize,
}
