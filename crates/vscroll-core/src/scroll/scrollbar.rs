//! Scrollbar geometry derived from the completion ratio
//!
//! Rendering is left to the consumer; this only answers where the handle
//! sits and how far it may travel.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timing::clamp;
use crate::config::ScrollbarConfig;

const DEFAULT_HANDLE_SIZE: f64 = 0.1;

/// Edge of the viewport the scrollbar is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollbarPosition {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

impl ScrollbarPosition {
    pub fn orientation(self) -> Orientation {
        match self {
            ScrollbarPosition::Left | ScrollbarPosition::Right => Orientation::Vertical,
            ScrollbarPosition::Top | ScrollbarPosition::Bottom => Orientation::Horizontal,
        }
    }
}

impl fmt::Display for ScrollbarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrollbarPosition::Right => "right",
            ScrollbarPosition::Left => "left",
            ScrollbarPosition::Top => "top",
            ScrollbarPosition::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarGeometry {
    position: ScrollbarPosition,
    handle_size: f64,
}

impl Default for ScrollbarGeometry {
    fn default() -> Self {
        Self::new(ScrollbarPosition::default(), DEFAULT_HANDLE_SIZE)
    }
}

impl ScrollbarGeometry {
    /// `handle_size` is the handle length as a fraction of the track, in (0, 1]
    pub fn new(position: ScrollbarPosition, handle_size: f64) -> Self {
        let handle_size = if handle_size.is_finite() && handle_size > 0.0 {
            handle_size.min(1.0)
        } else {
            tracing::warn!("Invalid handle size {}, using {}", handle_size, DEFAULT_HANDLE_SIZE);
            DEFAULT_HANDLE_SIZE
        };
        Self {
            position,
            handle_size,
        }
    }

    pub fn from_config(config: &ScrollbarConfig) -> Self {
        Self::new(config.position, config.handle_size)
    }

    pub fn position(&self) -> ScrollbarPosition {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.position.orientation()
    }

    pub fn handle_size(&self) -> f64 {
        self.handle_size
    }

    /// Handle travel in percent of the handle's own length
    pub fn distance_to_scroll(&self) -> f64 {
        -(100.0 * (self.handle_size - 1.0)) / self.handle_size
    }

    /// Handle translation in percent of its own length
    pub fn handle_offset_percent(&self, completion: f64) -> f64 {
        completion * self.distance_to_scroll()
    }

    /// Handle start cell and length on a discrete track of `track_len` cells
    pub fn handle_span(&self, track_len: u16, completion: f64) -> (u16, u16) {
        if track_len == 0 {
            return (0, 0);
        }
        let len = ((track_len as f64 * self.handle_size).round() as u16).clamp(1, track_len);
        let travel = track_len - len;
        let completion = if completion.is_finite() {
            clamp(completion, 0.0, 1.0)
        } else {
            0.0
        };
        let start = (completion * travel as f64).round() as u16;
        (start, len)
    }

    /// Cells the handle can travel on a track of `track_len` cells
    pub fn travel(&self, track_len: u16) -> u16 {
        let (_, len) = self.handle_span(track_len, 0.0);
        track_len - len
    }
}
