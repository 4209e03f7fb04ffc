//! Virtual scroll engine
//!
//! Turns wheel, swipe and scrollbar-drag input into one smoothed scroll
//! position. Nothing here schedules itself: the host feeds input through
//! [`VirtualScroll`] and calls [`VirtualScroll::tick`] once per frame.
//!
//! # Layers
//!
//! ## Atomic
//! - `timing` - Pure numeric helpers (lerp, clamp, precision rounding)
//! - `range` - Clamp bounds and completion ratio
//! - `timer` - Deadline-based settle and idle timers
//! - `trigger` - Threshold rules and their latches
//! - `scrollbar` - Scrollbar geometry derived from completion
//!
//! ## Molecular
//! - `handler` - Delta accumulator and motion integrator
//! - `drag` - Scrollbar drag adapter feeding absolute positions
//!
//! # Usage
//!
//! ```ignore
//! use vscroll_core::{ScrollConfig, VirtualScroll, WheelEvent};
//!
//! let mut scroll = VirtualScroll::new(&ScrollConfig::default());
//! scroll.on_wheel(&WheelEvent::pixels(120.0));
//!
//! // In the frame loop
//! scroll.tick()?;
//! let y = scroll.current();
//! ```

// Atomic
pub mod range;
pub mod scrollbar;
pub mod timer;
pub mod timing;
pub mod trigger;

// Molecular
pub mod drag;
pub mod handler;

pub use drag::ScrollbarDrag;
pub use handler::{InputSource, PanEvent, ScrollState, VirtualScroll};
pub use range::ScrollRange;
pub use scrollbar::{Orientation, ScrollbarGeometry, ScrollbarPosition};
pub use timer::{IdleTimer, SettleTimer};
pub use trigger::{Condition, Trigger, TriggerEvent, TriggerId, TriggerSet};
