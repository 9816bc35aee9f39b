use core::ops::Range;

/// A non-owning handle to a display node living in the host's tree.
///
/// The host owns the node; the engine only keeps these handles in index-keyed tables, so a
/// detached or destroyed node never leaves a dangling reference behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Absolute placement of a node along the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Offset from the top of the spacer.
    pub offset: f64,
    /// Fixed extent. `None` lets the node size itself (dynamic heights).
    pub extent: Option<f64>,
}

/// A half-open interval `[start, end)` over item indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize, // exclusive
}

impl VisibleRange {
    pub const EMPTY: VisibleRange = VisibleRange { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Widens the range by `overscan` on both sides, clamped to `[0, count)`.
    pub fn expand(self, overscan: usize, count: usize) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            start: self.start.saturating_sub(overscan),
            end: self.end.saturating_add(overscan).min(count),
        }
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for VisibleRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}
