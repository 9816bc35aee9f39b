/// Configuration for [`crate::WindowedScroller`].
///
/// Supplied at construction and adjustable at runtime via
/// [`crate::WindowedScroller::set_config`]. Nonsensical values are not rejected; they are clamped
/// by [`Config::sanitized`] before the engine uses them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Extra items rendered before and after the strictly visible range.
    pub overscan_count: usize,
    /// Root margin (in scroll units) handed to the viewport observer.
    pub overscan_distance: f64,
    /// Measure rendered items and feed the heights back into layout.
    pub dynamic_heights: bool,
    /// Height used for any index that has not been measured yet.
    pub estimated_item_height: f64,
    /// Minimum interval between two accepted scroll samples. Faster samples are dropped.
    pub sample_throttle_ms: u64,
    /// Upper bound on recycled (inactive) entries kept by the item pool.
    pub pool_capacity: usize,
    /// Save the scroll position on unmount and restore it on the next mount.
    pub restore_scroll: bool,
    /// Shift the scroll position when an item above it is measured at a different height, so
    /// the visible content does not jump.
    pub adjust_scroll_on_resize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overscan_count: 3,
            overscan_distance: 200.0,
            dynamic_heights: false,
            estimated_item_height: 50.0,
            sample_throttle_ms: 16,
            pool_capacity: 50,
            restore_scroll: false,
            adjust_scroll_on_resize: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overscan_count(mut self, overscan_count: usize) -> Self {
        self.overscan_count = overscan_count;
        self
    }

    pub fn with_overscan_distance(mut self, overscan_distance: f64) -> Self {
        self.overscan_distance = overscan_distance;
        self
    }

    pub fn with_dynamic_heights(mut self, dynamic_heights: bool) -> Self {
        self.dynamic_heights = dynamic_heights;
        self
    }

    pub fn with_estimated_item_height(mut self, estimated_item_height: f64) -> Self {
        self.estimated_item_height = estimated_item_height;
        self
    }

    pub fn with_sample_throttle_ms(mut self, sample_throttle_ms: u64) -> Self {
        self.sample_throttle_ms = sample_throttle_ms;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_restore_scroll(mut self, restore_scroll: bool) -> Self {
        self.restore_scroll = restore_scroll;
        self
    }

    pub fn with_adjust_scroll_on_resize(mut self, adjust_scroll_on_resize: bool) -> Self {
        self.adjust_scroll_on_resize = adjust_scroll_on_resize;
        self
    }

    /// Returns a copy with every float clamped to a finite, non-negative value.
    ///
    /// A non-finite or negative estimate falls back to the default estimate.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();
        out.overscan_distance = non_negative(self.overscan_distance, 0.0);
        out.estimated_item_height = if self.estimated_item_height.is_finite()
            && self.estimated_item_height >= 0.0
        {
            self.estimated_item_height
        } else {
            defaults.estimated_item_height
        };
        out
    }

    /// The throttle interval in seconds.
    pub(crate) fn sample_interval(&self) -> f64 {
        self.sample_throttle_ms as f64 / 1000.0
    }
}

pub(crate) fn non_negative(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}
