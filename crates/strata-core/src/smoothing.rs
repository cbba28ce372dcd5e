//! Stroke stabilizer.

use kurbo::Point;

/// Default lag factor when the stabilizer is switched on.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 4.0;

/// One step of the stabilizer: move `1 / factor` of the way from `last` to `raw`.
pub fn smooth(last: Point, raw: Point, factor: f64) -> Point {
    last + (raw - last) / factor
}

/// Single-pole low-pass filter over successive stroke points.
///
/// The only memory is the previous output. After `reset` the next point is
/// returned verbatim.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    enabled: bool,
    factor: f64,
    last: Option<Point>,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(false, DEFAULT_SMOOTHING_FACTOR)
    }
}

impl SmoothingFilter {
    pub fn new(enabled: bool, factor: f64) -> Self {
        let mut filter = Self {
            enabled,
            factor: 1.0,
            last: None,
        };
        filter.set_factor(factor);
        filter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the stabilizer on or off. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Set the lag factor. Values below 1 are clamped to 1, NaN/inf ignored.
    pub fn set_factor(&mut self, factor: f64) {
        if factor.is_finite() {
            self.factor = factor.max(1.0);
        } else {
            log::debug!("Ignoring smoothing factor {}", factor);
        }
    }

    /// Forget the previous output; the next point passes through unchanged.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Feed a raw point and get the filtered one.
    pub fn next(&mut self, raw: Point) -> Point {
        let out = match (self.enabled, self.last) {
            (true, Some(last)) => smooth(last, raw, self.factor),
            _ => raw,
        };
        self.last = Some(out);
        out
    }
}
