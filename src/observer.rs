//! Visibility observation over a host-provided intersection primitive.
//!
//! Targets are keyed by a stable integer tag (the item index), not by node identity, so a batch
//! entry resolves back to its item with a single map lookup.

use std::collections::HashMap;

use crate::{NodeId, Rect};

/// The host runtime's visibility-detection primitive.
pub trait VisibilitySource {
    /// Starts reporting visibility changes for `node`. Batches must carry `tag` back.
    fn observe_visibility(&mut self, node: NodeId, tag: usize, options: &ObserverOptions);
    fn unobserve_visibility(&mut self, node: NodeId);
}

/// Root margin and ratio thresholds for a [`ViewportObserver`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverOptions {
    /// Distance the observed root is grown by on every side.
    pub root_margin: f64,
    /// Visibility ratios (`0.0..=1.0`, ascending) at which a change is reported.
    pub thresholds: Vec<f64>,
}

impl ObserverOptions {
    pub fn new(root_margin: f64, thresholds: impl IntoIterator<Item = f64>) -> Self {
        let mut thresholds: Vec<f64> = thresholds
            .into_iter()
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(0.0, 1.0))
            .collect();
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        Self {
            root_margin: crate::config::non_negative(root_margin, 0.0),
            thresholds,
        }
    }

    /// Tuned for windowed scrolling: report as soon as anything enters the overscan band.
    pub fn windowing(overscan_distance: f64) -> Self {
        Self::new(overscan_distance, [0.0, 0.5, 1.0])
    }

    /// Tuned for lazy asset loading: a small preload margin, any overlap counts.
    pub fn lazy_loading() -> Self {
        Self::new(50.0, [0.0])
    }

    /// Reports only when a target becomes fully visible (or stops being so).
    pub fn fully_visible() -> Self {
        Self::new(0.0, [1.0])
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::windowing(0.0)
    }
}

/// Geometry exactly as the host runtime delivered it; any field may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawRect {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl RawRect {
    pub fn from_rect(r: Rect) -> Self {
        Self {
            x: Some(r.x),
            y: Some(r.y),
            width: Some(r.width),
            height: Some(r.height),
        }
    }

    /// Partial or non-finite geometry collapses to [`Rect::ZERO`].
    pub fn parse(&self) -> Rect {
        match (self.x, self.y, self.width, self.height) {
            (Some(x), Some(y), Some(w), Some(h))
                if x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite() =>
            {
                Rect::new(x, y, w.max(0.0), h.max(0.0))
            }
            _ => Rect::ZERO,
        }
    }
}

/// One entry of a visibility batch as delivered by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawVisibilityEntry {
    pub tag: Option<usize>,
    pub is_intersecting: Option<bool>,
    pub intersection_ratio: Option<f64>,
    pub bounding_rect: Option<RawRect>,
    pub intersection_rect: Option<RawRect>,
    pub root_bounds: Option<RawRect>,
    pub time: Option<f64>,
}

/// A normalized visibility record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    /// The tag (item index) the target was observed with.
    pub target: usize,
    pub node: NodeId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
    pub bounding_rect: Rect,
    pub intersection_rect: Rect,
    pub root_bounds: Rect,
    pub time: f64,
}

pub type VisibilityCallback = Box<dyn FnMut(&[VisibilityEntry])>;

/// Tracks which targets are observed and turns raw batches into [`VisibilityEntry`] records.
pub struct ViewportObserver {
    options: ObserverOptions,
    targets: HashMap<usize, NodeId>,
    connected: bool,
    callback: Option<VisibilityCallback>,
}

impl ViewportObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: HashMap::new(),
            connected: true,
            callback: None,
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Registers the batch callback, replacing any previous one.
    pub fn set_callback(&mut self, callback: impl FnMut(&[VisibilityEntry]) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_observing(&self, tag: usize) -> bool {
        self.targets.contains_key(&tag)
    }

    pub fn observed_count(&self) -> usize {
        self.targets.len()
    }

    /// Begins tracking `node` under `tag`. Re-observing a tag with a new node swaps the node.
    ///
    /// While disconnected the target is remembered and only handed to the source on
    /// [`Self::reconnect`].
    pub fn observe(&mut self, source: &mut impl VisibilitySource, tag: usize, node: NodeId) {
        if let Some(prev) = self.targets.insert(tag, node) {
            if prev == node {
                return;
            }
            if self.connected {
                source.unobserve_visibility(prev);
            }
        }
        if self.connected {
            source.observe_visibility(node, tag, &self.options);
        }
    }

    pub fn unobserve(&mut self, source: &mut impl VisibilitySource, tag: usize) {
        let Some(node) = self.targets.remove(&tag) else {
            return;
        };
        if self.connected {
            source.unobserve_visibility(node);
        }
    }

    /// Stops reporting for every target. Idempotent.
    ///
    /// Targets stay registered so [`Self::reconnect`] can restore them.
    pub fn disconnect(&mut self, source: &mut impl VisibilitySource) {
        if !self.connected {
            return;
        }
        for &node in self.targets.values() {
            source.unobserve_visibility(node);
        }
        self.connected = false;
    }

    /// Restores a disconnected observer, re-observing every registered target.
    pub fn reconnect(&mut self, source: &mut impl VisibilitySource) {
        if self.connected {
            return;
        }
        self.connected = true;
        let mut tags: Vec<(usize, NodeId)> = self.targets.iter().map(|(&t, &n)| (t, n)).collect();
        tags.sort_unstable_by_key(|&(t, _)| t);
        for (tag, node) in tags {
            source.observe_visibility(node, tag, &self.options);
        }
    }

    /// Replaces the options, re-observing every target with them when connected.
    pub fn set_options(&mut self, source: &mut impl VisibilitySource, options: ObserverOptions) {
        if self.options == options {
            return;
        }
        self.options = options;
        if !self.connected {
            return;
        }
        for (&tag, &node) in self.targets.iter() {
            source.unobserve_visibility(node);
            source.observe_visibility(node, tag, &self.options);
        }
    }

    /// Forgets every target without talking to the source (the source is being torn down).
    pub fn forget_all(&mut self) {
        self.targets.clear();
    }

    /// Normalizes a raw batch and forwards it to the callback.
    ///
    /// Entries without a tag, or for a tag that is no longer observed, are dropped. Missing
    /// geometry becomes [`Rect::ZERO`]; a missing `is_intersecting` is derived from the ratio.
    /// A disconnected observer reports nothing.
    pub fn handle_batch(&mut self, batch: &[RawVisibilityEntry]) -> Vec<VisibilityEntry> {
        if !self.connected {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(batch.len());
        for raw in batch {
            match self.parse_entry(raw) {
                Some(e) => out.push(e),
                None => {
                    vwarn!(tag = ?raw.tag, "ViewportObserver: dropped unresolvable entry");
                }
            }
        }
        if !out.is_empty() {
            if let Some(cb) = self.callback.as_mut() {
                cb(&out);
            }
        }
        out
    }

    fn parse_entry(&self, raw: &RawVisibilityEntry) -> Option<VisibilityEntry> {
        let target = raw.tag?;
        let node = *self.targets.get(&target)?;
        let ratio = raw
            .intersection_ratio
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let parse = |r: &Option<RawRect>| r.as_ref().map(RawRect::parse).unwrap_or(Rect::ZERO);
        Some(VisibilityEntry {
            target,
            node,
            is_intersecting: raw.is_intersecting.unwrap_or(ratio > 0.0),
            intersection_ratio: ratio,
            bounding_rect: parse(&raw.bounding_rect),
            intersection_rect: parse(&raw.intersection_rect),
            root_bounds: parse(&raw.root_bounds),
            time: raw.time.filter(|t| t.is_finite()).unwrap_or(0.0),
        })
    }
}

impl core::fmt::Debug for ViewportObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportObserver")
            .field("options", &self.options)
            .field("targets", &self.targets.len())
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}
