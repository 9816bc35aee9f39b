use core::fmt;

use crate::{NodeId, Placement, SizeSource, VisibilitySource};

/// The display tree and runtime the engine drives.
///
/// The engine never inspects content: it asks the host to create nodes, place them, attach and
/// detach them, and render an opaque [`Host::Content`] value into a node once per acquisition.
///
/// Event delivery is inverted: the host runtime calls back into
/// [`crate::WindowedScroller::handle_scroll`], [`crate::WindowedScroller::handle_visibility`] and
/// [`crate::WindowedScroller::handle_sizes`] for listeners and observers the engine registered
/// through this trait. After `unlisten_scroll`/`unobserve_*` the host must stop delivering them.
pub trait Host: VisibilitySource + SizeSource {
    /// What the item builder produces and [`Host::render`] consumes.
    type Content;
    type Error: fmt::Display;

    /// Current time in seconds.
    fn now(&self) -> f64;

    fn create_node(&mut self) -> NodeId;
    fn destroy_node(&mut self, node: NodeId);

    /// Turns `node` into a scroll container clipping its children to the viewport.
    fn make_scroll_container(&mut self, node: NodeId);

    /// Positions `node` absolutely along the scroll axis.
    fn place(&mut self, node: NodeId, placement: Placement);

    fn attach(&mut self, parent: NodeId, child: NodeId);
    /// Detaches `node` from its parent. Detaching a detached node is a no-op.
    fn detach(&mut self, node: NodeId);

    /// Renders `content` into `node`, replacing whatever it showed before.
    fn render(&mut self, node: NodeId, content: &Self::Content) -> Result<(), Self::Error>;

    fn scroll_position(&self, scroll: NodeId) -> f64;
    fn set_scroll_position(&mut self, scroll: NodeId, position: f64);
    /// Visible extent of the scroll container along the scroll axis.
    fn viewport_extent(&self, scroll: NodeId) -> f64;

    fn listen_scroll(&mut self, scroll: NodeId);
    fn unlisten_scroll(&mut self, scroll: NodeId);
}
