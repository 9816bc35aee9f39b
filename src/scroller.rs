use std::collections::HashSet;

use crate::layout::Layout;
use crate::measure::SizeObserver;
use crate::pool::{ItemPool, Release};
use crate::{
    Align, Config, Host, NodeId, ObserverOptions, Phase, Placement, RawSizeEntry,
    RawVisibilityEntry, ScrollMetrics, ScrollSnapshot, Statistics, ViewportObserver,
    VisibleRange,
};

/// Produces the content for an item index.
pub type ItemBuilder<C> = Box<dyn FnMut(usize) -> C>;

/// Called with the scroll position after every accepted sample or programmatic scroll.
pub type ScrollListener = Box<dyn FnMut(f64)>;

/// Handle returned by [`WindowedScroller::on_scroll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone, Copy, Debug)]
struct Mounted {
    container: NodeId,
    scroll: NodeId,
    spacer: NodeId,
}

/// Renders a long list through a small, recycled set of host nodes.
///
/// The scroller owns the host, the [`ItemPool`], the [`ScrollMetrics`] and the
/// [`ViewportObserver`]. Once mounted it builds a scroll container holding a full-extent spacer,
/// and keeps exactly the items in the overscanned visible range attached to that spacer,
/// absolutely positioned at their cumulative offsets.
///
/// Every public operation clamps or ignores out-of-range input instead of failing.
pub struct WindowedScroller<H: Host> {
    host: H,
    config: Config,
    item_count: usize,
    builder: ItemBuilder<H::Content>,

    pool: ItemPool<H::Content>,
    layout: Layout,
    metrics: ScrollMetrics,
    viewport: ViewportObserver,
    sizes: SizeObserver,
    intersecting: HashSet<usize>,

    mounted: Option<Mounted>,
    phase: Phase,
    range: VisibleRange,
    viewport_range: VisibleRange,
    last_accepted: Option<f64>,
    pending_position: Option<f64>,
    saved: Option<ScrollSnapshot>,

    listeners: Vec<(ListenerId, ScrollListener)>,
    next_listener: u64,
    failed_renders: usize,
    render_passes: usize,
}

impl<H: Host> WindowedScroller<H> {
    pub fn new(
        host: H,
        item_count: usize,
        config: Config,
        builder: impl FnMut(usize) -> H::Content + 'static,
    ) -> Self {
        let config = config.sanitized();
        vdebug!(
            item_count,
            overscan = config.overscan_count,
            dynamic = config.dynamic_heights,
            "WindowedScroller::new"
        );
        let pool = ItemPool::new(config.pool_capacity, config.estimated_item_height);
        let mut layout = Layout::new();
        layout.rebuild(item_count, |_| config.estimated_item_height);
        Self {
            host,
            viewport: ViewportObserver::new(ObserverOptions::windowing(config.overscan_distance)),
            config,
            item_count,
            builder: Box::new(builder),
            pool,
            layout,
            metrics: ScrollMetrics::new(),
            sizes: SizeObserver::default(),
            intersecting: HashSet::new(),
            mounted: None,
            phase: Phase::Unmounted,
            range: VisibleRange::EMPTY,
            viewport_range: VisibleRange::EMPTY,
            last_accepted: None,
            pending_position: None,
            saved: None,
            listeners: Vec::new(),
            next_listener: 0,
            failed_renders: 0,
            render_passes: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn metrics(&self) -> &ScrollMetrics {
        &self.metrics
    }

    pub fn pool(&self) -> &ItemPool<H::Content> {
        &self.pool
    }

    pub fn viewport_observer(&self) -> &ViewportObserver {
        &self.viewport
    }

    /// Gives access to the observer, e.g. to register a visibility callback.
    pub fn viewport_observer_mut(&mut self) -> &mut ViewportObserver {
        &mut self.viewport
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn container(&self) -> Option<NodeId> {
        self.mounted.map(|m| m.container)
    }

    pub fn scroll_node(&self) -> Option<NodeId> {
        self.mounted.map(|m| m.scroll)
    }

    pub fn spacer_node(&self) -> Option<NodeId> {
        self.mounted.map(|m| m.spacer)
    }

    /// Rendered range, overscan included.
    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    /// Strictly visible range, no overscan.
    pub fn viewport_range(&self) -> VisibleRange {
        self.viewport_range
    }

    pub fn total_height(&self) -> f64 {
        self.layout.total()
    }

    /// Cumulative offset of `index`, or `None` when out of bounds.
    pub fn item_offset(&self, index: usize) -> Option<f64> {
        (index < self.item_count).then(|| self.layout.offset_of(index))
    }

    pub fn item_height(&self, index: usize) -> Option<f64> {
        self.layout.height(index)
    }

    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        self.layout.index_at(offset)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Builds the scroll container and spacer inside `container` and renders the initial range.
    ///
    /// No-op when already mounted.
    pub fn mount(&mut self, container: NodeId) {
        if self.mounted.is_some() {
            return;
        }
        vdebug!(?container, item_count = self.item_count, "WindowedScroller::mount");

        let scroll = self.host.create_node();
        self.host.make_scroll_container(scroll);
        self.host.attach(container, scroll);
        let spacer = self.host.create_node();
        self.host.attach(scroll, spacer);
        let m = Mounted {
            container,
            scroll,
            spacer,
        };
        self.mounted = Some(m);
        self.phase = Phase::Idle;
        self.last_accepted = None;

        self.host.listen_scroll(scroll);
        if self.config.dynamic_heights {
            self.viewport.reconnect(&mut self.host);
        }
        self.refresh_dimensions();

        let restored = self.saved.take().filter(|_| self.config.restore_scroll);
        let target = match (self.pending_position.take(), restored) {
            (Some(p), _) => Some(p),
            (None, Some(snapshot)) => Some(self.resolve_snapshot(snapshot)),
            (None, None) => None,
        };
        let position = match target {
            Some(p) => {
                let p = self.clamp_position(p);
                self.host.set_scroll_position(scroll, p);
                p
            }
            None => self.clamp_position(self.host.scroll_position(scroll)),
        };
        self.metrics.jump_to(position);
        self.render();
    }

    /// Tears down listeners, observers and every node the scroller created.
    ///
    /// Safe to call when not mounted. After this returns no host callback reaches the engine.
    pub fn unmount(&mut self) {
        let Some(m) = self.mounted.take() else {
            return;
        };
        vdebug!(active = self.pool.active_count(), "WindowedScroller::unmount");

        if self.config.restore_scroll {
            self.saved = Some(self.snapshot_now());
        }

        self.host.unlisten_scroll(m.scroll);
        self.viewport.disconnect(&mut self.host);
        self.viewport.forget_all();
        self.sizes.disconnect(&mut self.host);
        self.intersecting.clear();

        for node in self.pool.clear() {
            self.host.detach(node);
            self.host.destroy_node(node);
        }
        let estimate = self.config.estimated_item_height;
        self.layout.rebuild(self.item_count, |_| estimate);

        self.host.detach(m.spacer);
        self.host.destroy_node(m.spacer);
        self.host.detach(m.scroll);
        self.host.destroy_node(m.scroll);

        self.metrics.reset();
        self.range = VisibleRange::EMPTY;
        self.viewport_range = VisibleRange::EMPTY;
        self.last_accepted = None;
        self.phase = Phase::Unmounted;
    }

    // ---------------------------------------------------------------------
    // Host callbacks
    // ---------------------------------------------------------------------

    /// Feeds a scroll position sample from the host's scroll listener.
    ///
    /// Samples closer than `sample_throttle_ms` to the last accepted one are dropped. Returns
    /// whether the sample was accepted.
    pub fn handle_scroll(&mut self, position: f64) -> bool {
        if self.mounted.is_none() || !position.is_finite() {
            return false;
        }
        let now = self.host.now();
        if let Some(last) = self.last_accepted {
            if now >= last && now - last < self.config.sample_interval() {
                vtrace!(position, now, "handle_scroll: throttled");
                return false;
            }
        }
        self.accept_sample(position, now);
        true
    }

    /// Re-reads the scroll position from the host, bypassing the throttle.
    ///
    /// An unchanged position only re-renders when the range is stale.
    pub fn sync_from_host(&mut self) {
        let Some(m) = self.mounted else {
            return;
        };
        let position = self.host.scroll_position(m.scroll);
        if position.is_finite() && position != self.metrics.position() {
            let now = self.host.now();
            self.accept_sample(position, now);
        } else if self.compute_ranges().1 != self.range {
            self.render();
        }
    }

    /// Re-reads the viewport extent after the host resized the scroll container.
    pub fn handle_viewport_resize(&mut self) {
        if self.mounted.is_none() {
            return;
        }
        self.refresh_dimensions();
        self.clamp_current_position();
        self.render();
    }

    /// Applies a visibility batch from the host's intersection primitive.
    ///
    /// An edge item of the rendered range entering the overscan margin means the host has
    /// scrolled further than the last accepted sample; the position is re-read so the range can
    /// grow before the edge is reached.
    pub fn handle_visibility(&mut self, batch: &[RawVisibilityEntry]) {
        if self.mounted.is_none() || !self.config.dynamic_heights {
            return;
        }
        let entries = self.viewport.handle_batch(batch);
        let mut needs_sync = false;
        for e in &entries {
            if e.is_intersecting {
                self.intersecting.insert(e.target);
                let leading_edge = e.target == self.range.start && self.range.start > 0;
                let trailing_edge =
                    e.target + 1 == self.range.end && self.range.end < self.item_count;
                needs_sync |= leading_edge || trailing_edge || !self.range.contains(e.target);
            } else {
                self.intersecting.remove(&e.target);
            }
        }
        if needs_sync {
            vtrace!(entries = entries.len(), "handle_visibility: edge reached, syncing");
            self.sync_from_host();
        }
    }

    /// Applies a size-measurement batch (dynamic heights only).
    ///
    /// All entries are applied before a single relayout. When `adjust_scroll_on_resize` is set,
    /// items entirely above the scroll position shift the position by their height change.
    pub fn handle_sizes(&mut self, batch: &[RawSizeEntry]) {
        let Some(m) = self.mounted else {
            return;
        };
        if !self.config.dynamic_heights {
            return;
        }
        let entries = self.sizes.parse_batch(batch);
        vtrace!(entries = entries.len(), "handle_sizes");

        let mut changed = false;
        let mut shift = 0.0;
        for e in entries {
            if e.index >= self.item_count {
                continue;
            }
            let old_end =
                self.layout.offset_of(e.index) + self.layout.height(e.index).unwrap_or(0.0);
            let delta = self.apply_height(e.index, e.height);
            if delta == 0.0 {
                continue;
            }
            changed = true;
            if self.config.adjust_scroll_on_resize && old_end <= self.metrics.position() + shift {
                shift += delta;
            }
        }
        if !changed {
            return;
        }

        self.refresh_dimensions();
        if shift != 0.0 {
            self.metrics.shift(shift);
            let p = self.clamp_position(self.metrics.position());
            self.host.set_scroll_position(m.scroll, p);
        }
        self.clamp_current_position();
        self.render();
    }

    // ---------------------------------------------------------------------
    // Control surface
    // ---------------------------------------------------------------------

    /// Changes the number of items. No-op when unchanged.
    pub fn set_item_count(&mut self, count: usize) {
        if count == self.item_count {
            return;
        }
        vdebug!(from = self.item_count, to = count, "set_item_count");
        self.item_count = count;

        let now = self.host.now();
        for index in self.pool.active_indices() {
            if index >= count {
                self.release_item(index, now);
            }
        }
        self.pool.truncate_heights(count);
        self.layout.resize(count, |i| self.pool.get_height(i));
        self.relayout();
    }

    /// Replaces the whole collection: drops every node, measurement, metric and saved position,
    /// then renders `count` fresh items from the top (now, or on the next mount).
    pub fn replace_items(&mut self, count: usize) {
        vdebug!(count, "replace_items");
        self.saved = None;
        self.pending_position = None;
        self.last_accepted = None;
        for index in self.pool.active_indices() {
            self.viewport.unobserve(&mut self.host, index);
        }
        for node in self.pool.clear() {
            self.host.detach(node);
            self.host.destroy_node(node);
        }
        self.sizes.disconnect(&mut self.host);
        self.intersecting.clear();
        self.metrics.reset();
        self.item_count = count;
        let estimate = self.config.estimated_item_height;
        self.layout.rebuild(count, |_| estimate);
        self.range = VisibleRange::EMPTY;
        self.viewport_range = VisibleRange::EMPTY;

        if let Some(m) = self.mounted {
            self.host.set_scroll_position(m.scroll, 0.0);
            self.refresh_dimensions();
            self.render();
            self.notify_scroll();
        }
    }

    /// Scrolls to `position`, clamped into the content.
    ///
    /// While unmounted the position is remembered and applied by the next [`Self::mount`].
    pub fn scroll_to(&mut self, position: f64) {
        if !position.is_finite() {
            vwarn!(position, "scroll_to: non-finite position ignored");
            return;
        }
        let Some(m) = self.mounted else {
            self.pending_position = Some(position.max(0.0));
            return;
        };
        let p = self.clamp_position(position);
        vtrace!(position = p, "scroll_to");
        self.host.set_scroll_position(m.scroll, p);
        self.metrics.jump_to(p);
        self.render();
        self.notify_scroll();
    }

    /// Scrolls so `index` starts at the top of the viewport. Out-of-range indices are ignored.
    pub fn scroll_to_index(&mut self, index: usize) {
        self.scroll_to_index_aligned(index, Align::Start);
    }

    /// Scrolls `index` into view with the given alignment. Out-of-range indices are ignored.
    ///
    /// Returns the target position before clamping, or `None` when ignored.
    pub fn scroll_to_index_aligned(&mut self, index: usize, align: Align) -> Option<f64> {
        if index >= self.item_count {
            vwarn!(index, count = self.item_count, "scroll_to_index: out of range");
            return None;
        }
        let target = self.index_target(index, align);
        self.scroll_to(target);
        Some(target)
    }

    fn index_target(&self, index: usize, align: Align) -> f64 {
        let start = self.layout.offset_of(index);
        let size = self.layout.height(index).unwrap_or(0.0);
        let end = start + size;
        let view = self.metrics.viewport_extent();
        match align {
            Align::Start => start,
            Align::End => end - view,
            Align::Center => start + size / 2.0 - view / 2.0,
            Align::Auto => {
                let cur = self.metrics.position();
                if start >= cur && end <= cur + view {
                    cur
                } else if start < cur {
                    start
                } else {
                    end - view
                }
            }
        }
    }

    /// Rebuilds the content of `index` if it is active.
    pub fn invalidate_item(&mut self, index: usize) {
        if index >= self.item_count {
            return;
        }
        self.rebuild_content(index);
    }

    /// Rebuilds the content of every active item.
    pub fn invalidate_all(&mut self) {
        for index in self.pool.active_indices() {
            self.rebuild_content(index);
        }
    }

    /// Records a height for `index` as if the host had measured it.
    pub fn measure_item(&mut self, index: usize, height: f64) {
        if index >= self.item_count {
            return;
        }
        if self.apply_height(index, height) != 0.0 {
            self.relayout();
        }
    }

    /// Forgets every measured height and lays out with estimates again.
    pub fn reset_measurements(&mut self) {
        self.pool.clear_heights();
        let estimate = self.config.estimated_item_height;
        self.layout.rebuild(self.item_count, |_| estimate);
        self.relayout();
    }

    /// Registers a scroll listener.
    pub fn on_scroll(&mut self, listener: impl FnMut(f64) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_scroll_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Replaces the configuration, re-laying out and re-rendering as needed.
    pub fn set_config(&mut self, config: Config) {
        let config = config.sanitized();
        if config == self.config {
            return;
        }
        let prev = core::mem::replace(&mut self.config, config);
        vdebug!(config = ?self.config, "set_config");

        for spare in self.pool.set_capacity(self.config.pool_capacity) {
            if let Some(node) = spare.node {
                self.host.destroy_node(node);
            }
        }

        if prev.estimated_item_height != self.config.estimated_item_height {
            self.pool.set_default_height(self.config.estimated_item_height);
            self.layout
                .rebuild(self.item_count, |i| self.pool.get_height(i));
        }

        if prev.overscan_distance != self.config.overscan_distance {
            let options = ObserverOptions::windowing(self.config.overscan_distance);
            self.viewport.set_options(&mut self.host, options);
        }

        if prev.dynamic_heights != self.config.dynamic_heights {
            self.toggle_dynamic_heights();
        }

        if prev.sample_throttle_ms != self.config.sample_throttle_ms {
            self.last_accepted = None;
        }

        if self.mounted.is_some() {
            self.refresh_dimensions();
            self.clamp_current_position();
            self.place_all();
            self.render();
        }
    }

    /// Clones the config, applies `f`, then delegates to [`Self::set_config`].
    pub fn update_config(&mut self, f: impl FnOnce(&mut Config)) {
        let mut next = self.config.clone();
        f(&mut next);
        self.set_config(next);
    }

    /// Evicts recycled nodes idle for more than `max_age` seconds.
    pub fn trim_pool(&mut self, max_age: f64) -> usize {
        let now = self.host.now();
        let evicted = self.pool.trim(max_age, now);
        for node in evicted.iter().filter_map(|s| s.node) {
            self.host.destroy_node(node);
        }
        evicted.len()
    }

    /// Pre-creates up to `count` recycled nodes so the first scroll does not allocate.
    pub fn prefill_pool(&mut self, count: usize) -> usize {
        let now = self.host.now();
        let host = &mut self.host;
        self.pool.prefill(count, now, || host.create_node())
    }

    /// Captures the current position and the item anchoring it.
    pub fn scroll_snapshot(&self) -> ScrollSnapshot {
        self.snapshot_now()
    }

    /// Scrolls back to a snapshot, preferring its anchor item when still in range.
    pub fn restore_snapshot(&mut self, snapshot: ScrollSnapshot) {
        let p = self.resolve_snapshot(snapshot);
        self.scroll_to(p);
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            active_count: self.pool.active_count(),
            inactive_count: self.pool.inactive_count(),
            cached_heights: self.pool.cached_height_count(),
            item_count: self.item_count,
            visible_range: self.range,
            viewport_range: self.viewport_range,
            scroll_position: self.metrics.position(),
            velocity: self.metrics.velocity(),
            content_extent: self.metrics.content_extent(),
            viewport_extent: self.metrics.viewport_extent(),
            mounted: self.mounted.is_some(),
            intersecting: self.intersecting.len(),
            failed_renders: self.failed_renders,
            render_passes: self.render_passes,
        }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn accept_sample(&mut self, position: f64, now: f64) {
        self.last_accepted = Some(now);
        self.metrics.update(position, now);
        vtrace!(
            position,
            velocity = self.metrics.velocity(),
            "accepted scroll sample"
        );
        self.render();
        self.notify_scroll();
    }

    fn notify_scroll(&mut self) {
        let position = self.metrics.position();
        for (_, listener) in self.listeners.iter_mut() {
            listener(position);
        }
    }

    fn clamp_position(&self, position: f64) -> f64 {
        let max = self.layout.max_position(self.metrics.viewport_extent());
        position.clamp(0.0, max)
    }

    /// Pulls the position back into the content after the content shrank.
    fn clamp_current_position(&mut self) {
        let Some(m) = self.mounted else {
            return;
        };
        let cur = self.metrics.position();
        let clamped = self.clamp_position(cur);
        if clamped != cur {
            self.host.set_scroll_position(m.scroll, clamped);
            self.metrics.jump_to(clamped);
        }
    }

    fn refresh_dimensions(&mut self) {
        let Some(m) = self.mounted else {
            return;
        };
        let total = self.layout.total();
        self.host.place(
            m.spacer,
            Placement {
                offset: 0.0,
                extent: Some(total),
            },
        );
        let viewport = self.host.viewport_extent(m.scroll);
        self.metrics.update_dimensions(total, viewport);
    }

    /// Spacer, position and range after a structural change.
    fn relayout(&mut self) {
        if self.mounted.is_none() {
            return;
        }
        self.refresh_dimensions();
        self.clamp_current_position();
        self.render();
    }

    fn apply_height(&mut self, index: usize, height: f64) -> f64 {
        self.pool.update_height(index, height);
        let stored = self.pool.get_height(index);
        self.layout.set_height(index, stored)
    }

    fn compute_ranges(&self) -> (VisibleRange, VisibleRange) {
        let visible = self
            .layout
            .visible_range(self.metrics.position(), self.metrics.viewport_extent());
        let rendered = visible.expand(self.config.overscan_count, self.item_count);
        (visible, rendered)
    }

    /// Brings the attached items in line with the current range.
    fn render(&mut self) {
        let Some(m) = self.mounted else {
            return;
        };
        debug_assert_eq!(self.phase, Phase::Idle, "render re-entered");

        self.render_passes += 1;
        let (visible, next) = self.compute_ranges();
        self.phase = Phase::RangeComputed;

        let now = self.host.now();
        for index in self.pool.active_indices() {
            if !next.contains(index) {
                self.release_item(index, now);
            }
        }
        for index in next.as_range() {
            self.show_item(m, index, now);
        }
        if next != self.range {
            vtrace!(
                start = next.start,
                end = next.end,
                active = self.pool.active_count(),
                "range changed"
            );
        }
        self.range = next;
        self.viewport_range = visible;
        self.phase = Phase::Rendered;
        self.phase = Phase::Idle;
    }

    fn placement_for(&self, index: usize) -> Placement {
        Placement {
            offset: self.layout.offset_of(index),
            extent: if self.config.dynamic_heights {
                None
            } else {
                self.layout.height(index)
            },
        }
    }

    /// Acquires `index` if it is not active yet, otherwise moves it when its offset changed.
    fn show_item(&mut self, m: Mounted, index: usize, now: f64) {
        let placement = self.placement_for(index);

        if let Some(item) = self.pool.get_mut(index) {
            if item.offset != placement.offset || item.extent != placement.extent {
                item.offset = placement.offset;
                item.extent = placement.extent;
                if let Some(node) = item.node {
                    self.host.place(node, placement);
                }
            }
            return;
        }

        let builder = &mut self.builder;
        let item = self.pool.acquire(index, now, || builder(index));
        let node = match item.node {
            Some(node) => node,
            None => {
                let node = self.host.create_node();
                item.node = Some(node);
                node
            }
        };
        item.offset = placement.offset;
        item.extent = placement.extent;
        if let Err(_err) = self.host.render(node, &item.content) {
            vwarn!(index, error = %_err, "host render failed; item left empty");
            self.failed_renders += 1;
        }
        self.host.place(node, placement);
        self.host.attach(m.spacer, node);

        if self.config.dynamic_heights {
            self.viewport.observe(&mut self.host, index, node);
            self.sizes.observe(&mut self.host, index, node);
        }
    }

    fn release_item(&mut self, index: usize, now: f64) {
        if let Some(node) = self.pool.get(index).and_then(|it| it.node) {
            self.viewport.unobserve(&mut self.host, index);
            self.sizes.unobserve(&mut self.host, index);
            self.host.detach(node);
        }
        self.intersecting.remove(&index);
        if let Release::Discarded(item) = self.pool.release(index, now) {
            if let Some(node) = item.node {
                self.host.destroy_node(node);
            }
        }
    }

    fn rebuild_content(&mut self, index: usize) {
        let Some(item) = self.pool.get_mut(index) else {
            return;
        };
        item.content = (self.builder)(index);
        let Some(node) = item.node else {
            return;
        };
        if let Err(_err) = self.host.render(node, &item.content) {
            vwarn!(index, error = %_err, "host render failed on invalidate");
            self.failed_renders += 1;
        }
    }

    /// Re-places every active node (extent mode or estimates changed).
    fn place_all(&mut self) {
        for index in self.pool.active_indices() {
            let placement = self.placement_for(index);
            if let Some(item) = self.pool.get_mut(index) {
                item.offset = placement.offset;
                item.extent = placement.extent;
                if let Some(node) = item.node {
                    self.host.place(node, placement);
                }
            }
        }
    }

    fn toggle_dynamic_heights(&mut self) {
        if self.config.dynamic_heights {
            if self.mounted.is_some() {
                self.viewport.reconnect(&mut self.host);
            }
            for index in self.pool.active_indices() {
                if let Some(node) = self.pool.get(index).and_then(|it| it.node) {
                    self.viewport.observe(&mut self.host, index, node);
                    self.sizes.observe(&mut self.host, index, node);
                }
            }
        } else {
            for index in self.pool.active_indices() {
                self.viewport.unobserve(&mut self.host, index);
            }
            self.sizes.disconnect(&mut self.host);
            self.intersecting.clear();
        }
    }

    fn snapshot_now(&self) -> ScrollSnapshot {
        let position = self.metrics.position();
        let anchor_index = self.layout.index_at(position).unwrap_or(0);
        ScrollSnapshot {
            position,
            anchor_index,
            anchor_offset: position - self.layout.offset_of(anchor_index),
        }
    }

    fn resolve_snapshot(&self, snapshot: ScrollSnapshot) -> f64 {
        if snapshot.anchor_index < self.item_count {
            self.layout.offset_of(snapshot.anchor_index) + snapshot.anchor_offset.max(0.0)
        } else {
            snapshot.position
        }
    }
}

impl<H: Host> Drop for WindowedScroller<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<H: Host + core::fmt::Debug> core::fmt::Debug for WindowedScroller<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowedScroller")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("item_count", &self.item_count)
            .field("phase", &self.phase)
            .field("range", &self.range)
            .field("metrics", &self.metrics)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
