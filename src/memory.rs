//! A headless host that keeps its display tree in memory.
//!
//! `MemoryHost` is what the tests, benches and demos drive the engine with, and a starting
//! point for adapters that paint into their own buffers (TUIs, canvases). It does not deliver
//! events by itself: the caller moves the clock and the scroll position, then asks the host for
//! the visibility and size batches a real runtime would have produced.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::observer::RawRect;
use crate::{
    Host, NodeId, ObserverOptions, Placement, RawSizeEntry, RawVisibilityEntry, Rect, SizeSource,
    VisibilitySource,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryHostError {
    UnknownNode(NodeId),
    Rejected(NodeId),
}

impl fmt::Display for MemoryHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {}", id.0),
            Self::Rejected(id) => write!(f, "content rejected for node {}", id.0),
        }
    }
}

impl std::error::Error for MemoryHostError {}

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryNode<C> {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub placement: Placement,
    pub content: Option<C>,
    /// Height the node takes when its placement leaves the extent open.
    pub natural_height: Option<f64>,
    pub scroll_container: bool,
    pub scroll_position: f64,
    pub render_count: usize,
}

impl<C> MemoryNode<C> {
    fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            placement: Placement::default(),
            content: None,
            natural_height: None,
            scroll_container: false,
            scroll_position: 0.0,
            render_count: 0,
        }
    }

    /// The extent the node occupies along the scroll axis.
    pub fn extent(&self) -> f64 {
        self.placement
            .extent
            .or(self.natural_height)
            .unwrap_or(0.0)
    }
}

type RenderFilter<C> = Box<dyn Fn(&C) -> bool>;

pub struct MemoryHost<C = String> {
    nodes: BTreeMap<NodeId, MemoryNode<C>>,
    next_id: u64,
    now: f64,
    viewport_extent: f64,
    scroll_listeners: BTreeSet<NodeId>,
    visibility: BTreeMap<NodeId, (usize, ObserverOptions)>,
    sizes: BTreeMap<NodeId, usize>,
    created: usize,
    destroyed: usize,
    renders: usize,
    filter: Option<RenderFilter<C>>,
}

impl<C: Clone> MemoryHost<C> {
    pub fn new(viewport_extent: f64) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            now: 0.0,
            viewport_extent,
            scroll_listeners: BTreeSet::new(),
            visibility: BTreeMap::new(),
            sizes: BTreeMap::new(),
            created: 0,
            destroyed: 0,
            renders: 0,
            filter: None,
        }
    }

    /// Creates a detached root node to mount a scroller into.
    pub fn create_root(&mut self) -> NodeId {
        self.create_node()
    }

    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }

    pub fn set_viewport_extent(&mut self, extent: f64) {
        self.viewport_extent = extent;
    }

    /// Makes [`Host::render`] fail for content matching `reject`.
    pub fn reject_content(&mut self, reject: impl Fn(&C) -> bool + 'static) {
        self.filter = Some(Box::new(reject));
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode<C>> {
        self.nodes.get(&id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn content_of(&self, id: NodeId) -> Option<&C> {
        self.nodes.get(&id).and_then(|n| n.content.as_ref())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn is_listening(&self, scroll: NodeId) -> bool {
        self.scroll_listeners.contains(&scroll)
    }

    pub fn listener_count(&self) -> usize {
        self.scroll_listeners.len()
    }

    pub fn visibility_targets(&self) -> usize {
        self.visibility.len()
    }

    pub fn size_targets(&self) -> usize {
        self.sizes.len()
    }

    /// Moves the scroll container as a user would, without notifying anyone.
    pub fn user_scroll(&mut self, scroll: NodeId, position: f64) {
        if let Some(n) = self.nodes.get_mut(&scroll) {
            n.scroll_position = position;
        }
    }

    /// Lays out every node that has content using `height_of`, and returns the size batch a
    /// resize observer would report for the observed nodes whose height changed.
    pub fn measure_with(&mut self, height_of: impl Fn(&C) -> f64) -> Vec<RawSizeEntry> {
        let mut batch = Vec::new();
        for (id, node) in self.nodes.iter_mut() {
            let Some(content) = node.content.as_ref() else {
                continue;
            };
            let h = height_of(content);
            if node.natural_height == Some(h) {
                continue;
            }
            node.natural_height = Some(h);
            if let Some(&tag) = self.sizes.get(id) {
                batch.push(RawSizeEntry {
                    tag: Some(tag),
                    height: Some(h),
                });
            }
        }
        batch
    }

    /// Computes the visibility of every observed node against the scroll container's viewport
    /// (grown by each target's root margin).
    pub fn visibility_batch(&self, scroll: NodeId) -> Vec<RawVisibilityEntry> {
        let position = self.scroll_position(scroll);
        let view = self.viewport_extent;
        self.visibility
            .iter()
            .filter_map(|(id, (tag, options))| {
                let node = self.nodes.get(id)?;
                let top = node.placement.offset - position;
                let bounds = Rect::new(0.0, top, 0.0, node.extent());
                let root = Rect::new(
                    0.0,
                    -options.root_margin,
                    0.0,
                    view + 2.0 * options.root_margin,
                );
                let lo = bounds.y.max(root.y);
                let hi = bounds.bottom().min(root.bottom());
                let overlap = (hi - lo).max(0.0);
                let ratio = if bounds.height > 0.0 {
                    overlap / bounds.height
                } else if lo <= hi {
                    1.0
                } else {
                    0.0
                };
                Some(RawVisibilityEntry {
                    tag: Some(*tag),
                    is_intersecting: Some(lo < hi || (bounds.height == 0.0 && lo <= hi)),
                    intersection_ratio: Some(ratio),
                    bounding_rect: Some(RawRect::from_rect(bounds)),
                    intersection_rect: Some(RawRect::from_rect(Rect::new(0.0, lo, 0.0, overlap))),
                    root_bounds: Some(RawRect::from_rect(root)),
                    time: Some(self.now),
                })
            })
            .collect()
    }

    fn detach_inner(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != node);
        }
    }
}

impl<C> VisibilitySource for MemoryHost<C> {
    fn observe_visibility(&mut self, node: NodeId, tag: usize, options: &ObserverOptions) {
        self.visibility.insert(node, (tag, options.clone()));
    }

    fn unobserve_visibility(&mut self, node: NodeId) {
        self.visibility.remove(&node);
    }
}

impl<C> SizeSource for MemoryHost<C> {
    fn observe_size(&mut self, node: NodeId, tag: usize) {
        self.sizes.insert(node, tag);
    }

    fn unobserve_size(&mut self, node: NodeId) {
        self.sizes.remove(&node);
    }
}

impl<C: Clone> Host for MemoryHost<C> {
    type Content = C;
    type Error = MemoryHostError;

    fn now(&self) -> f64 {
        self.now
    }

    fn create_node(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, MemoryNode::new());
        self.created += 1;
        id
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.detach_inner(node);
        if let Some(n) = self.nodes.remove(&node) {
            for child in n.children {
                if let Some(c) = self.nodes.get_mut(&child) {
                    c.parent = None;
                }
            }
            self.destroyed += 1;
        }
        self.visibility.remove(&node);
        self.sizes.remove(&node);
        self.scroll_listeners.remove(&node);
    }

    fn make_scroll_container(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.scroll_container = true;
        }
    }

    fn place(&mut self, node: NodeId, placement: Placement) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.placement = placement;
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
            return;
        }
        self.detach_inner(child);
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        self.detach_inner(node);
    }

    fn render(&mut self, node: NodeId, content: &C) -> Result<(), MemoryHostError> {
        let rejected = self.filter.as_ref().is_some_and(|f| f(content));
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(MemoryHostError::UnknownNode(node))?;
        n.render_count += 1;
        self.renders += 1;
        if rejected {
            n.content = None;
            n.natural_height = None;
            return Err(MemoryHostError::Rejected(node));
        }
        n.content = Some(content.clone());
        n.natural_height = None;
        Ok(())
    }

    fn scroll_position(&self, scroll: NodeId) -> f64 {
        self.nodes
            .get(&scroll)
            .map(|n| n.scroll_position)
            .unwrap_or(0.0)
    }

    fn set_scroll_position(&mut self, scroll: NodeId, position: f64) {
        self.user_scroll(scroll, position);
    }

    fn viewport_extent(&self, _scroll: NodeId) -> f64 {
        self.viewport_extent
    }

    fn listen_scroll(&mut self, scroll: NodeId) {
        self.scroll_listeners.insert(scroll);
    }

    fn unlisten_scroll(&mut self, scroll: NodeId) {
        self.scroll_listeners.remove(&scroll);
    }
}

impl<C> fmt::Debug for MemoryHost<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("nodes", &self.nodes.len())
            .field("now", &self.now)
            .field("viewport_extent", &self.viewport_extent)
            .field("scroll_listeners", &self.scroll_listeners.len())
            .field("visibility", &self.visibility.len())
            .field("sizes", &self.sizes.len())
            .finish_non_exhaustive()
    }
}
