//! Molecular layer: delta accumulator and motion integrator
//!
//! [`VirtualScroll`] owns the scroll state. Input adapters move `target`;
//! the frame driver calls [`VirtualScroll::tick`] to ease `current` toward
//! it, evaluate triggers and refresh the completion ratio.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::range::ScrollRange;
use super::timer::{IdleTimer, SettleTimer};
use super::timing::{lerp, round_hundredths};
use super::trigger::{Trigger, TriggerId, TriggerSet};
use crate::config::ScrollConfig;
use crate::normalize::{pixel_delta, WheelEvent};

/// Input that last moved the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    #[default]
    Initial,
    Wheel,
    Swipe,
    Drag,
    Jump,
}

/// Pan gesture sample from a gesture recognizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanEvent {
    pub velocity_x: f64,
    pub velocity_y: f64,
    /// Distance since the gesture started
    pub delta_x: f64,
    pub delta_y: f64,
}

impl PanEvent {
    pub fn vertical(velocity_y: f64) -> Self {
        Self {
            velocity_y,
            ..Default::default()
        }
    }
}

/// Observable scroll state
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    /// Desired position accumulated from all inputs
    pub target: f64,
    /// Smoothed position, rounded to hundredths
    pub current: f64,
    /// Position of `current` within `range`, when a range is set
    pub completion: Option<f64>,
    pub range: Option<ScrollRange>,
    /// Interpolation weight used by the next tick
    pub smoothing: f64,
    /// Interpolate toward the target (false while snapping)
    pub animate: bool,
    pub source: InputSource,
}

/// Virtual scroll handler
///
/// Single-threaded by construction: every input method and [`tick`] take
/// `&mut self`, and trigger callbacks need not be `Send`.
///
/// [`tick`]: VirtualScroll::tick
#[derive(Debug)]
pub struct VirtualScroll {
    state: ScrollState,
    amp: f64,
    mobile_sensibility: f64,
    swipe_strength: f64,
    wheel_smoothing: f64,
    swipe_smoothing: f64,
    device_pixel_ratio: f64,
    triggers: TriggerSet,
    settle: SettleTimer,
    idle: IdleTimer,
    active: bool,
    dragging: bool,
}

impl Default for VirtualScroll {
    fn default() -> Self {
        Self::new(&ScrollConfig::default())
    }
}

impl VirtualScroll {
    /// Create a handler from configuration
    ///
    /// Triggers are not evaluated until the first tick.
    pub fn new(config: &ScrollConfig) -> Self {
        let range = config.scroll_range();
        let start = config.start_position();
        let start = range.map_or(start, |r| r.clamp(start));
        let wheel_smoothing = config.wheel_smoothing();

        Self {
            state: ScrollState {
                target: start,
                current: start,
                completion: range.map(|r| r.completion(start)),
                range,
                smoothing: wheel_smoothing,
                animate: true,
                source: InputSource::Initial,
            },
            amp: config.effective_amp(),
            mobile_sensibility: finite_or(config.mobile_sensibility, 1.0),
            swipe_strength: finite_or(config.swipe_strength, 75.0),
            wheel_smoothing,
            swipe_smoothing: config.swipe_smoothing(),
            device_pixel_ratio: config.device_pixel_ratio,
            triggers: TriggerSet::new(),
            settle: SettleTimer::new(config.settle_delay()),
            idle: IdleTimer::new(None),
            active: true,
            dragging: false,
        }
    }

    /// Enable scrollbar fading after `delay` of inactivity
    pub fn with_idle_fade(mut self, delay: Option<Duration>) -> Self {
        self.idle = IdleTimer::new(delay);
        self
    }

    /// Register triggers in order
    pub fn with_triggers(mut self, triggers: impl IntoIterator<Item = Trigger>) -> Self {
        for trigger in triggers {
            self.triggers.add(trigger);
        }
        self
    }

    // Accessors

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.state.current
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.state.target
    }

    /// Completion ratio, `None` without a range
    #[inline]
    pub fn completion(&self) -> Option<f64> {
        self.state.completion
    }

    pub fn range(&self) -> Option<ScrollRange> {
        self.state.range
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.state.smoothing
    }

    /// Whether the integrator interpolates (false while snapping)
    pub fn is_animated(&self) -> bool {
        self.state.animate
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// No motion left and no pending timer
    ///
    /// Use this to decide whether the frame driver can slow down.
    pub fn is_settled(&self) -> bool {
        self.state.current == round_hundredths(self.state.target) && !self.settle.is_pending()
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    // Configuration changes

    /// Pause or resume input capture; ticks keep running either way
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            info!("Virtual scroll {}", if active { "enabled" } else { "disabled" });
        }
        self.active = active;
    }

    /// Replace the clamp range, re-clamping target and current
    pub fn set_range(&mut self, range: Option<ScrollRange>) {
        self.state.range = range;
        if let Some(range) = range {
            self.state.target = range.clamp(self.state.target);
            self.state.current = range.clamp(self.state.current);
        }
        self.update_completion();
    }

    pub fn add_trigger(&mut self, trigger: Trigger) -> TriggerId {
        self.triggers.add(trigger)
    }

    pub fn remove_trigger(&mut self, id: TriggerId) -> Option<Trigger> {
        self.triggers.remove(id)
    }

    /// Clear every trigger latch
    pub fn rearm_triggers(&mut self) {
        self.triggers.rearm();
    }

    // Delta accumulator

    /// Apply a raw wheel event
    pub fn on_wheel(&mut self, event: &WheelEvent) {
        self.on_wheel_at(event, Instant::now());
    }

    pub fn on_wheel_at(&mut self, event: &WheelEvent, now: Instant) {
        let delta = pixel_delta(event, self.device_pixel_ratio);
        self.apply_wheel_delta_at(delta, now);
    }

    /// Move the target by a normalized pixel delta
    pub fn apply_wheel_delta(&mut self, pixel_delta: f64) {
        self.apply_wheel_delta_at(pixel_delta, Instant::now());
    }

    pub fn apply_wheel_delta_at(&mut self, pixel_delta: f64, now: Instant) {
        if !self.accepts(pixel_delta) {
            return;
        }
        if !self.move_target(pixel_delta * self.amp) {
            return;
        }
        self.state.smoothing = self.wheel_smoothing;
        self.state.source = InputSource::Wheel;
        self.idle.reset(now);
        debug!("Wheel delta {} -> target {}", pixel_delta, self.state.target);
    }

    /// Apply a pan sample from the gesture recognizer
    pub fn on_pan(&mut self, event: &PanEvent) {
        self.apply_swipe_velocity_at(event.velocity_y, Instant::now());
    }

    /// Move the target by a swipe velocity
    ///
    /// Swiping up (negative velocity) scrolls forward.
    pub fn apply_swipe_velocity(&mut self, velocity_y: f64) {
        self.apply_swipe_velocity_at(velocity_y, Instant::now());
    }

    pub fn apply_swipe_velocity_at(&mut self, velocity_y: f64, now: Instant) {
        if !self.accepts(velocity_y) {
            return;
        }
        let delta = self.swipe_strength * -velocity_y * self.mobile_sensibility * self.amp;
        if !self.move_target(delta) {
            return;
        }
        self.state.smoothing = self.swipe_smoothing;
        self.state.source = InputSource::Swipe;
        self.idle.reset(now);
        debug!("Swipe velocity {} -> target {}", velocity_y, self.state.target);
    }

    /// Jump to an absolute position
    ///
    /// Animated jumps ease toward `value`. Non-animated jumps snap target and
    /// current immediately and resume interpolation after the settle delay;
    /// a later snap replaces the pending delay.
    pub fn set_absolute_position(&mut self, value: f64, animated: bool) {
        self.set_absolute_position_at(value, animated, Instant::now());
    }

    pub fn set_absolute_position_at(&mut self, value: f64, animated: bool, now: Instant) {
        if !self.accepts(value) {
            return;
        }
        let value = self.clamped(value);
        self.state.target = value;
        self.state.source = InputSource::Jump;
        if !animated {
            self.state.animate = false;
            self.state.current = value;
            if !self.dragging {
                self.settle.arm(now);
            }
        }
        debug!("Jump to {} (animated: {})", value, animated);
    }

    /// Programmatic jump, same as [`set_absolute_position`]
    ///
    /// [`set_absolute_position`]: VirtualScroll::set_absolute_position
    pub fn go_to(&mut self, distance: f64, animated: bool) {
        self.set_absolute_position(distance, animated);
    }

    pub fn go_to_at(&mut self, distance: f64, animated: bool, now: Instant) {
        self.set_absolute_position_at(distance, animated, now);
    }

    /// Start a manual drag: interpolation stays off until [`end_drag`]
    ///
    /// [`end_drag`]: VirtualScroll::end_drag
    pub fn begin_drag(&mut self) {
        if !self.active {
            return;
        }
        self.dragging = true;
        self.state.animate = false;
        self.settle.cancel();
        self.idle.hold();
    }

    /// Snap target and current to a dragged position
    pub fn drag_to(&mut self, value: f64) {
        if !self.active || !self.dragging || !value.is_finite() {
            return;
        }
        let value = self.clamped(value);
        self.state.target = value;
        self.state.current = value;
        self.state.source = InputSource::Drag;
    }

    /// Finish a manual drag and resume interpolation
    ///
    /// Runs even while inactive so a drag cannot leave interpolation off.
    pub fn end_drag(&mut self) {
        self.end_drag_at(Instant::now());
    }

    pub fn end_drag_at(&mut self, now: Instant) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.state.animate = true;
        self.idle.release(now);
    }

    // Idle activity hooks

    /// Record activity for the fading scrollbar
    pub fn reset_idle_timer(&mut self, now: Instant) {
        self.idle.reset(now);
    }

    /// Keep the scrollbar visible (pointer entered it)
    pub fn hold_idle(&mut self) {
        self.idle.hold();
    }

    /// Allow fading again (pointer left it)
    pub fn release_idle(&mut self, now: Instant) {
        if !self.dragging {
            self.idle.release(now);
        }
    }

    pub fn is_scrollbar_visible(&self, now: Instant) -> bool {
        self.idle.is_visible(now)
    }

    // Motion integrator

    /// Advance one frame
    pub fn tick(&mut self) -> crate::Result<()> {
        self.tick_at(Instant::now())
    }

    /// Advance one frame at `now`
    ///
    /// Resolves the settle timer, moves `current`, then evaluates triggers
    /// and completion in that order. A failing trigger callback is returned
    /// after completion has been refreshed.
    pub fn tick_at(&mut self, now: Instant) -> crate::Result<()> {
        if self.settle.poll(now) && !self.dragging {
            self.state.animate = true;
        }

        let previous = self.state.current;
        let target = self.state.target;
        let mut next = if self.state.animate {
            round_hundredths(lerp(previous, target, self.state.smoothing))
        } else {
            round_hundredths(target)
        };
        if next == previous && previous != target {
            // Rounding swallowed the step
            next = round_hundredths(target);
        }
        if !next.is_finite() {
            next = target;
        }
        if let Some(range) = self.state.range {
            next = range.clamp(next);
        }
        self.state.current = next;

        let result = self.triggers.evaluate(next);
        self.update_completion();
        result.map(|_| ())
    }

    // Internals

    fn accepts(&self, value: f64) -> bool {
        if !self.active {
            return false;
        }
        if !value.is_finite() {
            debug!("Dropping non-finite scroll input {}", value);
            return false;
        }
        true
    }

    /// Returns false when the step would leave `target` non-finite
    fn move_target(&mut self, delta: f64) -> bool {
        let next = self.state.target + delta;
        if !next.is_finite() {
            debug!(
                "Dropping scroll step {} that overflows target {}",
                delta, self.state.target
            );
            return false;
        }
        self.state.target = self.clamped(next);
        true
    }

    fn clamped(&self, value: f64) -> f64 {
        match self.state.range {
            Some(range) => range.clamp(value),
            None => value,
        }
    }

    fn update_completion(&mut self) {
        self.state.completion = self
            .state
            .range
            .map(|range| range.completion(self.state.current));
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::scroll::trigger::{Condition, TriggerEvent};
    use std::cell::Cell;
    use std::rc::Rc;

    fn ranged(min: f64, max: f64) -> ScrollConfig {
        ScrollConfig {
            range: Some([min, max]),
            ..Default::default()
        }
    }

    fn settle(scroll: &mut VirtualScroll, frames: usize) {
        let now = Instant::now();
        for _ in 0..frames {
            scroll.tick_at(now).unwrap();
        }
    }

    #[test]
    fn test_wheel_accumulates_without_range() {
        let config = ScrollConfig {
            amp: 2.5,
            ..Default::default()
        };
        let mut scroll = VirtualScroll::new(&config);
        scroll.apply_wheel_delta(40.0);
        scroll.apply_wheel_delta(-10.0);
        assert_eq!(scroll.target(), 75.0);
        assert_eq!(scroll.current(), 0.0);
        assert_eq!(scroll.state().source, InputSource::Wheel);
    }

    #[test]
    fn test_wheel_event_is_normalized() {
        let config = ScrollConfig {
            device_pixel_ratio: 2.0,
            ..Default::default()
        };
        let mut scroll = VirtualScroll::new(&config);
        scroll.on_wheel(&WheelEvent::lines(1.0));
        assert_eq!(scroll.target(), 20.0);
    }

    #[test]
    fn test_target_stays_in_range() {
        let mut scroll = VirtualScroll::new(&ranged(0.0, 1000.0));
        scroll.apply_wheel_delta(5000.0);
        assert_eq!(scroll.target(), 1000.0);
        scroll.apply_swipe_velocity(100.0);
        assert_eq!(scroll.target(), 0.0);
        scroll.set_absolute_position(-20.0, true);
        assert_eq!(scroll.target(), 0.0);
    }

    #[test]
    fn test_swipe_inverts_velocity() {
        let mut scroll = VirtualScroll::default();
        scroll.apply_swipe_velocity(-2.0);
        assert_eq!(scroll.target(), 150.0);
        assert!((scroll.smoothing_factor() - 0.4).abs() < 1e-12);

        scroll.apply_wheel_delta(10.0);
        assert_eq!(scroll.smoothing_factor(), 0.1);
    }

    #[test]
    fn test_lerp_halves_remaining_distance() {
        let config = ScrollConfig {
            lerp_amount: 0.5,
            ..Default::default()
        };
        let mut scroll = VirtualScroll::new(&config);
        scroll.apply_wheel_delta(100.0);

        scroll.tick().unwrap();
        assert_eq!(scroll.current(), 50.0);
        scroll.tick().unwrap();
        assert_eq!(scroll.current(), 75.0);
    }

    #[test]
    fn test_converges_monotonically_without_overshoot() {
        let mut scroll = VirtualScroll::default();
        scroll.apply_wheel_delta(600.0);

        let now = Instant::now();
        let mut previous = scroll.current();
        for _ in 0..500 {
            scroll.tick_at(now).unwrap();
            assert!(scroll.current() >= previous);
            assert!(scroll.current() <= 600.0);
            previous = scroll.current();
        }
        assert_eq!(scroll.current(), 600.0);
        assert!(scroll.is_settled());
    }

    #[test]
    fn test_tick_is_idempotent_when_settled() {
        let mut scroll = VirtualScroll::default();
        scroll.apply_wheel_delta(33.33);
        settle(&mut scroll, 300);
        let state = scroll.state().clone();
        settle(&mut scroll, 10);
        assert_eq!(*scroll.state(), state);
    }

    #[test]
    fn test_halfway_trigger_fires_exactly_once() {
        let fired = Rc::new(Cell::new(0));
        let handle = fired.clone();
        let mut scroll = VirtualScroll::new(&ranged(0.0, 1000.0)).with_triggers([Trigger::new(
            500.0,
            Condition::AtOrAbove,
            true,
            move |_: &TriggerEvent| {
                handle.set(handle.get() + 1);
                Ok(())
            },
        )]);

        scroll.apply_wheel_delta(600.0);
        settle(&mut scroll, 300);
        assert_eq!(scroll.current(), 600.0);
        assert_eq!(fired.get(), 1);

        settle(&mut scroll, 50);
        assert_eq!(fired.get(), 1);
        assert_eq!(scroll.completion(), Some(0.6));
    }

    #[test]
    fn test_no_trigger_evaluation_before_first_tick() {
        let fired = Rc::new(Cell::new(false));
        let handle = fired.clone();
        let config = ScrollConfig {
            start_y: 800.0,
            ..Default::default()
        };
        let mut scroll = VirtualScroll::new(&config).with_triggers([Trigger::above(
            100.0,
            move |_: &TriggerEvent| {
                handle.set(true);
                Ok(())
            },
        )]);
        assert!(!fired.get());
        scroll.tick().unwrap();
        assert!(fired.get());
    }

    #[test]
    fn test_snap_then_settle_restores_animation() {
        let mut scroll = VirtualScroll::new(&ranged(0.0, 1000.0));
        let start = Instant::now();

        scroll.go_to_at(400.0, false, start);
        assert_eq!(scroll.current(), 400.0);
        assert_eq!(scroll.target(), 400.0);
        assert!(!scroll.is_animated());

        scroll.tick_at(start + Duration::from_millis(10)).unwrap();
        assert!(!scroll.is_animated());
        assert!(!scroll.is_settled());

        scroll.tick_at(start + Duration::from_millis(50)).unwrap();
        assert!(scroll.is_animated());
        assert!(scroll.is_settled());
    }

    #[test]
    fn test_later_snap_replaces_settle_deadline() {
        let mut scroll = VirtualScroll::default();
        let start = Instant::now();
        scroll.go_to_at(100.0, false, start);
        scroll.go_to_at(200.0, false, start + Duration::from_millis(40));

        scroll.tick_at(start + Duration::from_millis(60)).unwrap();
        assert!(!scroll.is_animated());
        scroll.tick_at(start + Duration::from_millis(90)).unwrap();
        assert!(scroll.is_animated());
    }

    #[test]
    fn test_animated_jump_eases() {
        let mut scroll = VirtualScroll::default();
        scroll.go_to(100.0, true);
        assert_eq!(scroll.current(), 0.0);
        scroll.tick().unwrap();
        assert_eq!(scroll.current(), 10.0);
    }

    #[test]
    fn test_inactive_drops_input() {
        let mut scroll = VirtualScroll::default();
        scroll.set_active(false);
        scroll.apply_wheel_delta(100.0);
        scroll.apply_swipe_velocity(-3.0);
        scroll.go_to(500.0, false);
        assert_eq!(scroll.target(), 0.0);
        assert!(scroll.is_animated());

        scroll.set_active(true);
        scroll.apply_wheel_delta(100.0);
        assert_eq!(scroll.target(), 100.0);
    }

    #[test]
    fn test_non_finite_input_is_dropped() {
        let mut scroll = VirtualScroll::default();
        scroll.apply_wheel_delta(f64::NAN);
        scroll.apply_swipe_velocity(f64::INFINITY);
        scroll.go_to(f64::NAN, true);
        assert_eq!(scroll.target(), 0.0);
    }

    #[test]
    fn test_degenerate_range_does_not_panic() {
        let mut scroll = VirtualScroll::new(&ranged(10.0, 10.0));
        scroll.apply_wheel_delta(50.0);
        scroll.tick().unwrap();
        assert_eq!(scroll.current(), 10.0);
        assert_eq!(scroll.completion(), Some(0.0));
    }

    #[test]
    fn test_reversed_range_is_reordered() {
        let mut scroll = VirtualScroll::new(&ranged(1000.0, 0.0));
        scroll.apply_wheel_delta(-50.0);
        assert_eq!(scroll.target(), 0.0);
    }

    #[test]
    fn test_failing_trigger_surfaces_but_completion_updates() {
        let mut scroll = VirtualScroll::new(&ScrollConfig {
            lerp_amount: 1.0,
            ..ranged(0.0, 100.0)
        });
        scroll.add_trigger(Trigger::above(10.0, |_: &TriggerEvent| -> Result<(), BoxError> {
            Err("callback failed".into())
        }));
        scroll.apply_wheel_delta(50.0);

        let err = scroll.tick().unwrap_err();
        assert!(matches!(err, crate::Error::Trigger { .. }));
        assert_eq!(scroll.completion(), Some(0.5));
        // Latched, so the next tick is clean
        scroll.tick().unwrap();
    }

    #[test]
    fn test_drag_snaps_and_release_resumes() {
        let mut scroll = VirtualScroll::new(&ranged(0.0, 1000.0));
        let start = Instant::now();

        scroll.begin_drag();
        scroll.drag_to(250.0);
        assert_eq!(scroll.current(), 250.0);
        assert!(!scroll.is_animated());
        assert!(scroll.is_scrollbar_visible(start));

        // Settle delay does not apply during a drag
        scroll.tick_at(start + Duration::from_secs(1)).unwrap();
        assert!(!scroll.is_animated());

        scroll.end_drag_at(start);
        assert!(scroll.is_animated());
        assert!(!scroll.is_dragging());
    }

    #[test]
    fn test_set_range_reclamps() {
        let mut scroll = VirtualScroll::default();
        scroll.go_to(900.0, false);
        scroll.set_range(ScrollRange::new(0.0, 500.0));
        assert_eq!(scroll.target(), 500.0);
        assert_eq!(scroll.current(), 500.0);
        assert_eq!(scroll.completion(), Some(1.0));
    }

    #[test]
    fn test_idle_fade_follows_input() {
        let mut scroll = VirtualScroll::default().with_idle_fade(Some(Duration::from_millis(500)));
        let start = Instant::now();
        assert!(!scroll.is_scrollbar_visible(start));

        scroll.apply_wheel_delta_at(10.0, start);
        assert!(scroll.is_scrollbar_visible(start + Duration::from_millis(100)));
        assert!(!scroll.is_scrollbar_visible(start + Duration::from_millis(600)));

        scroll.hold_idle();
        assert!(scroll.is_scrollbar_visible(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_overflowing_input_is_dropped() {
        let mut scroll = VirtualScroll::default();
        scroll.apply_wheel_delta(f64::MAX);
        scroll.apply_wheel_delta(f64::MAX);
        assert_eq!(scroll.target(), f64::MAX);

        scroll.apply_swipe_velocity(-f64::MAX);
        assert_eq!(scroll.target(), f64::MAX);

        for _ in 0..3 {
            scroll.tick().unwrap();
        }
        assert!(scroll.current().is_finite());

        scroll.go_to(0.0, false);
        scroll.apply_wheel_delta(-100.0);
        assert_eq!(scroll.target(), -100.0);
        scroll.tick().unwrap();
        assert!(scroll.current().is_finite());
    }
}
