//! Scrollbar drag adapter
//!
//! Maps pan gestures on the scrollbar handle to absolute scroll positions.
//! The handle position lives in track space `[0, extent]`; the scroll
//! position is that fraction of the handler's range.

use std::time::Instant;

use super::handler::{PanEvent, VirtualScroll};
use super::scrollbar::Orientation;
use super::timing::clamp;

#[derive(Debug, Clone)]
pub struct ScrollbarDrag {
    orientation: Orientation,
    /// Track length the handle can travel
    extent: f64,
    /// Handle position when the gesture started
    origin: f64,
    /// Current handle position
    position: f64,
    dragging: bool,
}

impl ScrollbarDrag {
    pub fn new(orientation: Orientation, extent: f64) -> Self {
        Self {
            orientation,
            extent,
            origin: 0.0,
            position: 0.0,
            dragging: false,
        }
    }

    /// Update the track length (viewport resized)
    pub fn set_extent(&mut self, extent: f64) {
        self.extent = extent;
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Handle position in track space
    pub fn handle_position(&self) -> f64 {
        self.position
    }

    /// Pan start: capture the handle position from `current`
    ///
    /// Returns false (and does nothing) when the handler is inactive, has no
    /// range, or the track has no length.
    pub fn pan_start(&mut self, scroll: &mut VirtualScroll) -> bool {
        if !scroll.is_active() || !self.extent.is_finite() || self.extent <= 0.0 {
            return false;
        }
        let Some(range) = scroll.range() else {
            return false;
        };

        self.origin = clamp(range.completion(scroll.current()), 0.0, 1.0) * self.extent;
        self.position = self.origin;
        self.dragging = true;
        scroll.begin_drag();
        tracing::debug!("Scrollbar drag started at {}", self.origin);
        true
    }

    /// Pan move: `event` carries the distance since pan start
    pub fn pan_move(&mut self, scroll: &mut VirtualScroll, event: &PanEvent) {
        let delta = match self.orientation {
            Orientation::Vertical => event.delta_y,
            Orientation::Horizontal => event.delta_x,
        };
        self.move_by(scroll, delta);
    }

    /// Pan move with a delta along the scrollbar axis
    pub fn move_by(&mut self, scroll: &mut VirtualScroll, delta: f64) {
        if !self.dragging || !scroll.is_active() || !delta.is_finite() {
            return;
        }
        let Some(range) = scroll.range() else {
            return;
        };

        self.position = clamp(self.origin + delta, 0.0, self.extent);
        scroll.drag_to(range.at(self.position / self.extent));
    }

    /// Pan end: resume interpolation
    pub fn pan_end(&mut self, scroll: &mut VirtualScroll) {
        self.pan_end_at(scroll, Instant::now());
    }

    pub fn pan_end_at(&mut self, scroll: &mut VirtualScroll, now: Instant) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        scroll.end_drag_at(now);
        tracing::debug!("Scrollbar drag ended at {}", self.position);
    }
}
