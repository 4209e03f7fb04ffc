//! Wheel signal normalization
//!
//! Browsers and platforms disagree on wheel units: some report pixels, some
//! report lines or pages, and older ones only expose a notch-based
//! `wheelDelta`/`detail`. [`normalize_wheel`] folds all of these into one
//! pixel-space reading, and [`pixel_delta`] further divides by the device
//! pixel ratio so the same physical gesture scrolls the same distance on
//! every screen.

use serde::{Deserialize, Serialize};

/// Pixels per spin notch when only a notch count is known
pub const PIXEL_STEP: f64 = 10.0;
/// Pixels per line for line-mode deltas
pub const LINE_HEIGHT: f64 = 40.0;
/// Pixels per page for page-mode deltas
pub const PAGE_HEIGHT: f64 = 800.0;

/// Legacy `wheelDelta` units per notch
const WHEEL_DELTA_PER_NOTCH: f64 = 120.0;

/// Unit of the `delta_x`/`delta_y` fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Pixels per unit of this mode
    #[inline]
    pub fn scale(self) -> f64 {
        match self {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => LINE_HEIGHT,
            DeltaMode::Page => PAGE_HEIGHT,
        }
    }
}

/// Raw wheel event as delivered by the host
///
/// Every field is optional because hosts only populate a subset. Positive
/// values scroll forward (down / right).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelEvent {
    pub delta_x: Option<f64>,
    pub delta_y: Option<f64>,
    pub delta_mode: DeltaMode,
    /// Legacy notch count (positive = forward)
    pub detail: Option<f64>,
    /// Legacy `wheelDelta`, 120 per notch, positive = backward
    pub wheel_delta: Option<f64>,
    pub wheel_delta_x: Option<f64>,
    pub wheel_delta_y: Option<f64>,
    /// Legacy horizontal axis flag; moves the notch count onto x
    pub horizontal_axis: bool,
}

impl WheelEvent {
    /// Vertical delta in pixels
    pub fn pixels(delta_y: f64) -> Self {
        Self {
            delta_y: Some(delta_y),
            ..Default::default()
        }
    }

    /// Vertical delta in lines
    pub fn lines(delta_y: f64) -> Self {
        Self {
            delta_y: Some(delta_y),
            delta_mode: DeltaMode::Line,
            ..Default::default()
        }
    }

    /// Vertical delta in pages
    pub fn pages(delta_y: f64) -> Self {
        Self {
            delta_y: Some(delta_y),
            delta_mode: DeltaMode::Page,
            ..Default::default()
        }
    }

    /// Legacy event carrying only `wheelDelta`
    pub fn legacy(wheel_delta: f64) -> Self {
        Self {
            wheel_delta: Some(wheel_delta),
            ..Default::default()
        }
    }
}

/// Normalized wheel reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedWheel {
    /// Notches on x (sign only when unknown)
    pub spin_x: f64,
    /// Notches on y (sign only when unknown)
    pub spin_y: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

/// Fold a raw wheel event into spin and pixel deltas
pub fn normalize_wheel(event: &WheelEvent) -> NormalizedWheel {
    let mut spin_x = 0.0;
    let mut spin_y = 0.0;

    if let Some(detail) = event.detail {
        spin_y = detail;
    }
    if let Some(wheel_delta) = event.wheel_delta {
        spin_y = -wheel_delta / WHEEL_DELTA_PER_NOTCH;
    }
    if let Some(wheel_delta_y) = event.wheel_delta_y {
        spin_y = -wheel_delta_y / WHEEL_DELTA_PER_NOTCH;
    }
    if let Some(wheel_delta_x) = event.wheel_delta_x {
        spin_x = -wheel_delta_x / WHEEL_DELTA_PER_NOTCH;
    }
    if event.horizontal_axis {
        spin_x = spin_y;
        spin_y = 0.0;
    }

    let mut pixel_x = event.delta_x.unwrap_or(spin_x * PIXEL_STEP);
    let mut pixel_y = event.delta_y.unwrap_or(spin_y * PIXEL_STEP);

    if pixel_x != 0.0 || pixel_y != 0.0 {
        let scale = event.delta_mode.scale();
        pixel_x *= scale;
        pixel_y *= scale;
    }

    if pixel_x != 0.0 && spin_x == 0.0 {
        spin_x = if pixel_x < 1.0 { -1.0 } else { 1.0 };
    }
    if pixel_y != 0.0 && spin_y == 0.0 {
        spin_y = if pixel_y < 1.0 { -1.0 } else { 1.0 };
    }

    NormalizedWheel {
        spin_x,
        spin_y,
        pixel_x,
        pixel_y,
    }
}

/// Vertical pixel delta divided by the device pixel ratio
///
/// A ratio that is not a positive finite number is treated as 1.
pub fn pixel_delta(event: &WheelEvent, device_pixel_ratio: f64) -> f64 {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    normalize_wheel(event).pixel_y / ratio
}
