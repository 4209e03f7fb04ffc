use super::timing::clamp;

/// Ordered clamp bounds for the scroll position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRange {
    min: f64,
    max: f64,
}

impl ScrollRange {
    /// Build a range from two bounds in either order
    ///
    /// Returns `None` when a bound is not finite.
    pub fn new(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        if a > b {
            tracing::warn!("Range [{}, {}] is reversed, using [{}, {}]", a, b, b, a);
        }
        Some(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        clamp(value, self.min, self.max)
    }

    /// Position of `value` within the range
    ///
    /// 0 at `min`, 1 at `max`. A degenerate range reports 0.
    pub fn completion(&self, value: f64) -> f64 {
        let span = self.span();
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.0
        }
    }

    /// Value at a given completion ratio
    pub fn at(&self, completion: f64) -> f64 {
        self.min + completion * self.span()
    }
}
