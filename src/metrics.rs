//! Scroll position, velocity and extent tracking.

use std::collections::VecDeque;

use crate::ScrollDirection;

/// Number of samples retained for velocity estimation.
pub const HISTORY_LEN: usize = 5;
/// Samples older than this (in seconds) do not contribute to the velocity estimate.
pub const VELOCITY_WINDOW: f64 = 0.1;
/// Weight of a new raw velocity when blended into the smoothed estimate.
pub const SMOOTHING: f64 = 0.3;
/// Velocities below this magnitude (units/second) are treated as rest.
pub const REST_THRESHOLD: f64 = 10.0;
/// Relative slack on the window so wall-clock timestamps exactly `VELOCITY_WINDOW` apart still
/// count despite rounding.
const WINDOW_TOLERANCE: f64 = 1e-9;
/// Distance from either extreme that still counts as "at start"/"at end".
pub const EDGE_THRESHOLD: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    position: f64,
    time: f64,
}

/// Converts raw position samples into smoothed position, velocity and direction.
///
/// Velocity is never set directly: each [`ScrollMetrics::update`] drops samples older than
/// [`VELOCITY_WINDOW`], takes Δposition/Δtime across the oldest and newest retained samples, and
/// blends that into the stored value with [`SMOOTHING`]. The first non-zero estimate after rest is
/// taken as-is.
#[derive(Clone, Debug, Default)]
pub struct ScrollMetrics {
    position: f64,
    velocity: f64,
    content_extent: f64,
    viewport_extent: f64,
    last_sample_time: Option<f64>,
    history: VecDeque<Sample>,
}

impl ScrollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a position sample taken at `time` (seconds).
    ///
    /// Non-finite positions are ignored. Samples whose timestamp goes backwards restart the
    /// history instead of producing a negative time delta.
    pub fn update(&mut self, position: f64, time: f64) {
        if !position.is_finite() || !time.is_finite() {
            vwarn!(position, time, "ScrollMetrics::update: non-finite sample ignored");
            return;
        }

        if let Some(last) = self.last_sample_time {
            if time < last {
                self.history.clear();
            }
        }

        self.position = position;
        self.last_sample_time = Some(time);

        self.history.push_back(Sample { position, time });
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
        while let Some(oldest) = self.history.front() {
            if time - oldest.time > VELOCITY_WINDOW * (1.0 + WINDOW_TOLERANCE) {
                self.history.pop_front();
            } else {
                break;
            }
        }

        let raw = match (self.history.front(), self.history.back()) {
            (Some(oldest), Some(newest)) if newest.time > oldest.time => {
                (newest.position - oldest.position) / (newest.time - oldest.time)
            }
            _ => 0.0,
        };

        self.velocity = if self.velocity == 0.0 {
            raw
        } else {
            self.velocity + SMOOTHING * (raw - self.velocity)
        };
        if self.velocity.abs() < REST_THRESHOLD {
            self.velocity = 0.0;
        }
    }

    pub fn update_dimensions(&mut self, content_extent: f64, viewport_extent: f64) {
        self.content_extent = sanitize_extent(content_extent);
        self.viewport_extent = sanitize_extent(viewport_extent);
    }

    /// Moves to `position` without treating the move as scrolling (e.g. programmatic jumps).
    ///
    /// Clears the sample history so the jump does not register as velocity.
    pub fn jump_to(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        self.position = position;
        self.velocity = 0.0;
        self.history.clear();
    }

    /// Shifts the position and every retained sample by `delta`.
    ///
    /// Used when content above the viewport changes size: the move is a layout correction, so
    /// the velocity estimate must not see it.
    pub fn shift(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.position += delta;
        for s in self.history.iter_mut() {
            s.position += delta;
        }
    }

    /// Clears all state. Used when the underlying collection is replaced wholesale.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Signed velocity in units/second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn content_extent(&self) -> f64 {
        self.content_extent
    }

    pub fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    pub fn last_sample_time(&self) -> Option<f64> {
        self.last_sample_time
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        if self.velocity > 0.0 {
            Some(ScrollDirection::Forward)
        } else if self.velocity < 0.0 {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }

    pub fn scrolling_down(&self) -> bool {
        self.direction() == Some(ScrollDirection::Forward)
    }

    pub fn scrolling_up(&self) -> bool {
        self.direction() == Some(ScrollDirection::Backward)
    }

    pub fn max_position(&self) -> f64 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    pub fn at_start(&self) -> bool {
        self.position <= EDGE_THRESHOLD
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.max_position() - EDGE_THRESHOLD
    }

    /// Scroll progress in percent (`0.0..=100.0`).
    ///
    /// Content that fits in the viewport has nowhere to go and reports `0.0`.
    pub fn progress(&self) -> f64 {
        let max = self.max_position();
        if max <= 0.0 {
            return 0.0;
        }
        (self.position / max * 100.0).clamp(0.0, 100.0)
    }

    /// Estimated seconds until `target` is reached at the current velocity.
    ///
    /// Returns `None` at rest or when moving away from `target`.
    pub fn time_to_reach(&self, target: f64) -> Option<f64> {
        if self.velocity.abs() < REST_THRESHOLD || !target.is_finite() {
            return None;
        }
        let t = (target - self.position) / self.velocity;
        (t >= 0.0).then_some(t)
    }
}

fn sanitize_extent(v: f64) -> f64 {
    crate::config::non_negative(v, 0.0)
}
