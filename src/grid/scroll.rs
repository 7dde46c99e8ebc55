//! Horizontal scroll physics - drag consumption and inertial fling
//!
//! State machine: **Idle → Dragging → {Idle, Flinging} → Idle**.
//!
//! The fling is tick-driven: the host calls [`ScrollState::tick`] once per
//! frame with the current time and the offset follows an exponential decay
//! curve. A new drag or an explicit stop cancels it synchronously, so drag
//! input and fling never both write the offset.
//!
//! All time-dependent methods take an explicit `Instant`, which keeps the
//! state machine deterministic under test.

use super::Px;
use crate::error::FlingError;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Friction of the decay curve at multiplier 1.0 (per second).
const BASE_FRICTION: f32 = -4.2;

/// Smallest accepted friction multiplier.
const MIN_FRICTION_MULTIPLIER: f32 = 0.0001;

/// Tuning for release detection and the decay animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingConfig {
    /// Release velocity (px/s) per pixel of the last drag delta.
    pub velocity_multiplier: f32,
    /// Scales the base friction of the decay curve.
    pub friction_multiplier: f32,
    /// The last drag delta must be younger than this to start a fling.
    pub window: Duration,
    /// The last drag delta must exceed this many pixels to start a fling.
    pub min_release_delta: f32,
    /// The fling stops once its speed falls below this (px/s).
    pub velocity_threshold: f32,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            velocity_multiplier: 50.0,
            friction_multiplier: 1.0,
            window: Duration::from_millis(100),
            min_release_delta: 1.0,
            velocity_threshold: 0.1,
        }
    }
}

impl FlingConfig {
    fn friction(&self) -> f32 {
        BASE_FRICTION * self.friction_multiplier.max(MIN_FRICTION_MULTIPLIER)
    }
}

/// One sample of the decay curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingSample {
    /// Unclamped offset.
    pub value: f32,
    /// Velocity in px/s.
    pub velocity: f32,
    /// True once the animation has reached its end time.
    pub finished: bool,
}

/// Exponential decay animation.
///
/// `value(t) = start + v0/f · (e^(f·t) − 1)` and `velocity(t) = v0 · e^(f·t)`
/// with `f < 0`, so speed falls monotonically and the curve settles at
/// `start − v0/f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fling {
    start_value: f32,
    initial_velocity: f32,
    friction: f32,
    started_at: Instant,
    duration: Duration,
}

impl Fling {
    /// Start a decay from `start_value` with `initial_velocity` px/s.
    ///
    /// # Errors
    ///
    /// Returns [`FlingError::NonFinite`] when the inputs cannot produce a
    /// finite animation.
    pub fn new(
        start_value: f32,
        initial_velocity: f32,
        config: &FlingConfig,
        now: Instant,
    ) -> Result<Self, FlingError> {
        let friction = config.friction();
        let non_finite = FlingError::NonFinite {
            value: start_value,
            velocity: initial_velocity,
        };
        if !start_value.is_finite() || !initial_velocity.is_finite() || !friction.is_finite() {
            return Err(non_finite);
        }

        let speed = initial_velocity.abs();
        let seconds = if speed <= config.velocity_threshold {
            0.0
        } else {
            (config.velocity_threshold / speed).ln() / friction
        };
        let duration = Duration::try_from_secs_f32(seconds).map_err(|_| non_finite)?;

        Ok(Self {
            start_value,
            initial_velocity,
            friction,
            started_at: now,
            duration,
        })
    }

    /// Total animation time.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Where the curve comes to rest.
    pub fn target(&self) -> f32 {
        self.value_at_secs(self.duration.as_secs_f32())
    }

    fn value_at_secs(&self, t: f32) -> f32 {
        self.start_value
            + self.initial_velocity / self.friction * ((self.friction * t).exp() - 1.0)
    }

    /// Sample the curve at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`FlingError::NonFinite`] if the sample overflows.
    pub fn sample(&self, now: Instant) -> Result<FlingSample, FlingError> {
        let elapsed = now.saturating_duration_since(self.started_at);
        let finished = elapsed >= self.duration;
        let t = elapsed.min(self.duration).as_secs_f32();

        let value = self.value_at_secs(t);
        let velocity = self.initial_velocity * (self.friction * t).exp();
        if !value.is_finite() || !velocity.is_finite() {
            return Err(FlingError::NonFinite { value, velocity });
        }
        Ok(FlingSample {
            value,
            velocity,
            finished,
        })
    }
}

/// Horizontal scroll position of one grid.
///
/// # Invariants
/// - `0 <= offset <= max_offset` after every public method
/// - `max_offset == max(0, content - viewport)`
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: f32,
    viewport: Px,
    content: Px,
    last_delta: f32,
    last_move_at: Option<Instant>,
    fling: Option<Fling>,
    config: FlingConfig,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(FlingConfig::default())
    }
}

impl ScrollState {
    /// Create an idle state at offset 0 with no layout yet.
    pub fn new(config: FlingConfig) -> Self {
        Self {
            offset: 0.0,
            viewport: 0,
            content: 0,
            last_delta: 0.0,
            last_move_at: None,
            fling: None,
            config,
        }
    }

    /// Continuous offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Offset truncated to whole pixels.
    pub fn offset_px(&self) -> Px {
        self.offset as Px
    }

    /// Largest reachable offset.
    pub fn max_offset(&self) -> Px {
        (self.content - self.viewport).max(0)
    }

    /// Width of the visible window.
    pub fn viewport(&self) -> Px {
        self.viewport
    }

    /// Total content width.
    pub fn content(&self) -> Px {
        self.content
    }

    /// Fling tuning in effect.
    pub fn config(&self) -> &FlingConfig {
        &self.config
    }

    /// True while a fling animation is running.
    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// Refresh content and viewport sizes from a layout pass.
    ///
    /// The offset is re-clamped when the content shrinks.
    pub fn update_layout(&mut self, content: Px, viewport: Px) {
        self.content = content.max(0);
        self.viewport = viewport.max(0);
        self.offset = self.clamp(self.offset);
    }

    fn clamp(&self, value: f32) -> f32 {
        value.clamp(0.0, self.max_offset() as f32)
    }

    /// Apply a drag delta (positive = pointer moved right).
    ///
    /// Cancels a running fling first. The offset moves by `-delta`, clamped
    /// to `[0, max_offset]`. Returns 0 when the sign of the applied movement
    /// differs from the sign of `delta`, and the negated movement otherwise.
    pub fn consume_delta(&mut self, delta: f32, now: Instant) -> f32 {
        if self.fling.take().is_some() {
            debug!(offset = self.offset, "Fling cancelled by drag");
        }

        let old = self.offset;
        let new = self.clamp(old - delta);
        self.offset = new;
        let moved = new - old;

        self.last_delta = delta;
        self.last_move_at = Some(now);
        trace!(delta, moved, offset = new, "Drag delta consumed");

        if sign(delta) != sign(moved) {
            0.0
        } else {
            -moved
        }
    }

    /// Pointer released: start a fling if the last drag was recent and fast.
    ///
    /// Returns true when a fling started.
    pub fn release(&mut self, now: Instant) -> bool {
        let Some(last_move_at) = self.last_move_at.take() else {
            return false;
        };
        let recent = now.saturating_duration_since(last_move_at) < self.config.window;
        if !recent || self.last_delta.abs() <= self.config.min_release_delta {
            return false;
        }

        let velocity = self.last_delta * self.config.velocity_multiplier;
        match Fling::new(self.offset, -velocity, &self.config, now) {
            Ok(fling) => {
                debug!(
                    offset = self.offset,
                    velocity = -velocity,
                    duration_ms = fling.duration().as_millis() as u64,
                    "Fling started"
                );
                self.fling = Some(fling);
                true
            }
            Err(err) => {
                warn!(error = %err, "Fling could not start");
                false
            }
        }
    }

    /// Advance a running fling to `now`.
    ///
    /// Returns true while the fling is still running. The fling ends when
    /// its speed drops below the threshold or the offset reaches a bound in
    /// the direction of travel.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(fling) = self.fling else {
            return false;
        };

        let sample = match fling.sample(now) {
            Ok(sample) => sample,
            Err(err) => {
                warn!(error = %err, "Fling aborted");
                self.fling = None;
                return false;
            }
        };

        self.offset = self.clamp(sample.value);
        let saturated = (sample.velocity < 0.0 && self.offset <= 0.0)
            || (sample.velocity > 0.0 && self.offset >= self.max_offset() as f32);

        if sample.finished || saturated {
            debug!(offset = self.offset, saturated, "Fling finished");
            self.fling = None;
            return false;
        }
        true
    }

    /// Stop a running fling where it is. No-op when idle.
    pub fn stop_fling(&mut self) {
        if self.fling.take().is_some() {
            debug!(offset = self.offset, "Fling stopped");
        }
    }

    /// Move the offset by `delta` (positive = further right), clamped.
    ///
    /// For keyboard and wheel input: stops any fling and does not count as a
    /// drag, so it never arms a release.
    pub fn scroll_by(&mut self, delta: f32) {
        self.stop_fling();
        self.offset = self.clamp(self.offset + delta);
    }
}

/// Sign as -1, 0 or 1; unlike `f32::signum`, zero maps to 0.
fn sign(value: f32) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(content: Px, viewport: Px) -> ScrollState {
        let mut s = ScrollState::default();
        s.update_layout(content, viewport);
        s
    }

    mod dragging {
        use super::*;

        #[test]
        fn drag_left_increases_offset() {
            let mut s = state(200, 50);
            s.consume_delta(-30.0, Instant::now());
            assert_eq!(s.offset(), 30.0);
        }

        #[test]
        fn offset_clamps_at_both_bounds() {
            let mut s = state(200, 50);
            let now = Instant::now();
            s.consume_delta(10.0, now);
            assert_eq!(s.offset(), 0.0);
            s.consume_delta(-1000.0, now);
            assert_eq!(s.offset(), 150.0);
        }

        #[test]
        fn applied_movement_returns_zero() {
            let mut s = state(200, 50);
            assert_eq!(s.consume_delta(-20.0, Instant::now()), 0.0);
        }

        #[test]
        fn partially_applied_movement_at_bound_returns_zero() {
            let mut s = state(200, 50);
            let now = Instant::now();
            s.consume_delta(-140.0, now);
            assert_eq!(s.consume_delta(-20.0, now), 0.0);
            assert_eq!(s.offset(), 150.0);
        }

        #[test]
        fn blocked_movement_returns_zero() {
            let mut s = state(200, 50);
            assert_eq!(s.consume_delta(20.0, Instant::now()), 0.0);
            assert_eq!(s.offset(), 0.0);
        }

        #[test]
        fn content_smaller_than_viewport_never_scrolls() {
            let mut s = state(30, 50);
            s.consume_delta(-100.0, Instant::now());
            assert_eq!(s.max_offset(), 0);
            assert_eq!(s.offset(), 0.0);
        }

        #[test]
        fn shrinking_content_reclamps_offset() {
            let mut s = state(200, 50);
            s.consume_delta(-150.0, Instant::now());
            s.update_layout(100, 50);
            assert_eq!(s.offset(), 50.0);
        }

        #[test]
        fn scroll_by_moves_without_arming_release() {
            let mut s = state(200, 50);
            s.scroll_by(40.0);
            assert_eq!(s.offset(), 40.0);
            s.scroll_by(500.0);
            assert_eq!(s.offset(), 150.0);
            assert!(!s.release(Instant::now()));
        }
    }

    mod release {
        use super::*;

        #[test]
        fn fast_recent_drag_starts_fling() {
            let mut s = state(10_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-500.0, t0);
            s.consume_delta(-20.0, t0 + Duration::from_millis(16));
            assert!(s.release(t0 + Duration::from_millis(50)));
            assert!(s.is_flinging());
        }

        #[test]
        fn stale_drag_does_not_fling() {
            let mut s = state(10_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-500.0, t0);
            s.consume_delta(-20.0, t0);
            assert!(!s.release(t0 + Duration::from_millis(100)));
            assert!(!s.is_flinging());
        }

        #[test]
        fn tiny_delta_does_not_fling() {
            let mut s = state(10_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-500.0, t0);
            s.consume_delta(-1.0, t0);
            assert!(!s.release(t0));
        }

        #[test]
        fn release_without_drag_does_nothing() {
            let mut s = state(10_000, 100);
            assert!(!s.release(Instant::now()));
        }

        #[test]
        fn second_release_does_not_refling() {
            let mut s = state(10_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-500.0, t0);
            s.consume_delta(-20.0, t0);
            assert!(s.release(t0));
            s.stop_fling();
            assert!(!s.release(t0));
        }
    }

    mod flinging {
        use super::*;

        fn flinging_state(delta: f32) -> (ScrollState, Instant) {
            let mut s = state(100_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-50_000.0, t0);
            s.consume_delta(delta, t0);
            assert!(s.release(t0));
            (s, t0)
        }

        #[test]
        fn fling_continues_in_drag_direction() {
            // Dragging left (negative delta) increases the offset
            let (mut s, t0) = flinging_state(-20.0);
            let start = s.offset();
            s.tick(t0 + Duration::from_millis(100));
            assert!(s.offset() > start);
        }

        #[test]
        fn fling_runs_to_rest() {
            let (mut s, t0) = flinging_state(20.0);
            let mut now = t0;
            let mut frames = 0;
            while s.tick(now) {
                now += Duration::from_millis(16);
                frames += 1;
                assert!(frames < 1000, "fling did not terminate");
            }
            assert!(!s.is_flinging());
        }

        #[test]
        fn fling_stops_at_bound() {
            let mut s = state(1_000, 100);
            let t0 = Instant::now();
            s.consume_delta(-10.0, t0);
            s.consume_delta(-300.0, t0);
            assert!(s.release(t0));
            // Target far beyond max_offset = 900
            let running = s.tick(t0 + Duration::from_secs(1));
            assert!(!running);
            assert_eq!(s.offset(), 900.0);
        }

        #[test]
        fn drag_cancels_fling() {
            let (mut s, t0) = flinging_state(-20.0);
            s.tick(t0 + Duration::from_millis(16));
            s.consume_delta(1.0, t0 + Duration::from_millis(20));
            assert!(!s.is_flinging());
        }

        #[test]
        fn stop_fling_leaves_offset_in_place() {
            let (mut s, t0) = flinging_state(-20.0);
            s.tick(t0 + Duration::from_millis(50));
            let at = s.offset();
            s.stop_fling();
            assert!(!s.tick(t0 + Duration::from_millis(500)));
            assert_eq!(s.offset(), at);
        }
    }

    mod decay {
        use super::*;

        #[test]
        fn speed_decreases_monotonically() {
            let config = FlingConfig::default();
            let t0 = Instant::now();
            let fling = Fling::new(0.0, 1000.0, &config, t0).unwrap();
            let mut previous = f32::INFINITY;
            for ms in (0..2000).step_by(50) {
                let sample = fling.sample(t0 + Duration::from_millis(ms)).unwrap();
                assert!(sample.velocity.abs() <= previous);
                previous = sample.velocity.abs();
            }
        }

        #[test]
        fn resting_point_matches_closed_form() {
            let config = FlingConfig::default();
            let fling = Fling::new(0.0, 420.0, &config, Instant::now()).unwrap();
            // start - v0/f, minus the tail below the velocity threshold
            assert!((fling.target() - 100.0).abs() < 0.1);
        }

        #[test]
        fn slow_start_finishes_immediately() {
            let config = FlingConfig::default();
            let fling = Fling::new(5.0, 0.05, &config, Instant::now()).unwrap();
            assert_eq!(fling.duration(), Duration::ZERO);
        }

        #[test]
        fn non_finite_velocity_is_rejected() {
            let config = FlingConfig::default();
            let err = Fling::new(0.0, f32::NAN, &config, Instant::now()).unwrap_err();
            assert!(matches!(err, FlingError::NonFinite { .. }));
        }

        #[test]
        fn higher_friction_shortens_fling() {
            let t0 = Instant::now();
            let soft = Fling::new(0.0, 1000.0, &FlingConfig::default(), t0).unwrap();
            let stiff_config = FlingConfig {
                friction_multiplier: 4.0,
                ..FlingConfig::default()
            };
            let stiff = Fling::new(0.0, 1000.0, &stiff_config, t0).unwrap();
            assert!(stiff.duration() < soft.duration());
            assert!(stiff.target() < soft.target());
        }
    }

    #[test]
    fn sign_treats_zero_as_zero() {
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(-0.0), 0);
        assert_eq!(sign(3.0), 1);
        assert_eq!(sign(-3.0), -1);
    }
}
