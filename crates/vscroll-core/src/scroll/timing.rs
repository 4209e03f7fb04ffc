//! Pure numeric helpers for the motion integrator

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + t * (to - from)
}

/// Clamp that never panics: bounds are assumed ordered, NaN passes through
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value <= min {
        min
    } else if value >= max {
        max
    } else {
        value
    }
}

/// Round to two decimal places, the precision of the observable position
#[inline]
pub fn round_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        // Already far beyond hundredth precision
        value
    }
}
