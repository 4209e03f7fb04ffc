//! Deadline timers resolved by the frame driver
//!
//! The engine never spawns timers of its own. Each timer stores a deadline
//! and the owner checks it against the frame timestamp.

use std::time::{Duration, Instant};

/// Re-enables interpolation a fixed delay after a snap
///
/// Arming again replaces the previous deadline, so only the most recent
/// snap decides when interpolation resumes.
#[derive(Debug, Clone)]
pub struct SettleTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once, when the deadline has been reached
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Tracks input activity for a fading scrollbar
///
/// Without a fade delay the scrollbar is always visible. With one it starts
/// hidden, shows on every reset and hides again once the delay has passed,
/// unless it is held (pointer hover or an ongoing drag).
#[derive(Debug, Clone)]
pub struct IdleTimer {
    delay: Option<Duration>,
    deadline: Option<Instant>,
    held: bool,
}

impl IdleTimer {
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay,
            deadline: None,
            held: false,
        }
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Record activity at `now`
    pub fn reset(&mut self, now: Instant) {
        if let Some(delay) = self.delay {
            self.deadline = Some(now + delay);
        }
    }

    /// Keep the scrollbar visible regardless of the deadline
    pub fn hold(&mut self) {
        self.held = true;
    }

    /// Stop holding and start a fresh idle period
    pub fn release(&mut self, now: Instant) {
        self.held = false;
        self.reset(now);
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Whether the scrollbar should be shown at `now`
    pub fn is_visible(&self, now: Instant) -> bool {
        if self.delay.is_none() || self.held {
            return true;
        }
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}
