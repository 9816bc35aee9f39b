//! A headless windowed list rendering engine.
//!
//! Only the items intersecting the viewport (plus an overscan margin) are materialized as display
//! nodes. Nodes leaving the range are detached and recycled through a bounded pool, heights may be
//! measured after render, and scroll velocity is tracked from recent samples.
//!
//! The engine is UI-agnostic. A display layer implements [`Host`] and forwards its events:
//! - scroll samples to [`WindowedScroller::handle_scroll`]
//! - visibility batches to [`WindowedScroller::handle_visibility`]
//! - size batches to [`WindowedScroller::handle_sizes`]
//!
//! [`MemoryHost`](memory::MemoryHost) is an in-memory host used by the tests and demos.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod config;
mod fenwick;
mod host;
mod layout;
mod measure;
mod metrics;
mod observer;
mod pool;
mod scroller;
mod state;
mod types;

pub mod memory;


pub use config::Config;
pub use host::Host;
pub use measure::{RawSizeEntry, SizeEntry, SizeSource};
pub use metrics::{
    EDGE_THRESHOLD, HISTORY_LEN, REST_THRESHOLD, SMOOTHING, ScrollMetrics, VELOCITY_WINDOW,
};
pub use observer::{
    ObserverOptions, RawRect, RawVisibilityEntry, ViewportObserver, VisibilityCallback,
    VisibilityEntry, VisibilitySource,
};
pub use pool::{ItemPool, PooledItem, Release, Spare};
pub use scroller::{ItemBuilder, ListenerId, ScrollListener, WindowedScroller};
pub use state::{Phase, ScrollSnapshot, Statistics};
pub use types::{Align, NodeId, Placement, Rect, ScrollDirection, VisibleRange};
