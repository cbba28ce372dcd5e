//! View transform: zoom and rotation about the viewport center.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default multiplicative zoom step.
pub const ZOOM_STEP: f64 = 1.1;

/// Default rotation step (15 degrees).
pub const ROTATE_STEP: f64 = std::f64::consts::PI / 12.0;

/// Smallest scale the view will accept.
pub const MIN_SCALE: f64 = 1e-4;

/// ViewTransform maps between screen space and model space.
///
/// Rendering applies, in order: translate to the viewport center, scale,
/// rotate, translate back. Input goes through the exact inverse so a stroke
/// drawn at a model point stays put under later zoom/rotate changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Current scale factor, always strictly positive.
    scale: f64,
    /// Current rotation in radians (unbounded).
    rotation: f64,
    /// Viewport size; the pivot is its center.
    viewport: Size,
    /// Lower bound for `scale`.
    min_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

impl ViewTransform {
    /// Create an identity view for the given viewport.
    pub fn new(viewport: Size) -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            viewport,
            min_scale: MIN_SCALE,
        }
    }

    /// Set the lower bound for the scale factor.
    pub fn with_min_scale(mut self, min_scale: f64) -> Self {
        if min_scale.is_finite() && min_scale > 0.0 {
            self.min_scale = min_scale;
            self.scale = self.scale.max(min_scale);
        }
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The pivot all view changes happen around.
    pub fn center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Update the viewport size (moves the pivot).
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Model-to-screen matrix used by the compositor.
    pub fn affine(&self) -> Affine {
        let center = self.center().to_vec2();
        Affine::translate(center)
            * Affine::scale(self.scale)
            * Affine::rotate(self.rotation)
            * Affine::translate(-center)
    }

    /// Convert a screen point into model space.
    pub fn to_model_space(&self, screen: Point) -> Point {
        let center = self.center();
        let local = (screen - center) / self.scale;
        center + rotate_vec(local, -self.rotation)
    }

    /// Convert a model point into screen space.
    pub fn to_screen_space(&self, model: Point) -> Point {
        self.affine() * model
    }

    /// Convert a screen-space displacement into a model-space displacement.
    pub fn delta_to_model(&self, delta: Vec2) -> Vec2 {
        rotate_vec(delta / self.scale, -self.rotation)
    }

    /// Multiply the scale. Non-finite or non-positive multipliers are ignored.
    ///
    /// Returns true if the scale changed.
    pub fn zoom(&mut self, multiplier: f64) -> bool {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            log::debug!("Ignoring zoom multiplier {}", multiplier);
            return false;
        }
        let new_scale = (self.scale * multiplier).max(self.min_scale);
        if !new_scale.is_finite() || (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = new_scale;
        true
    }

    /// Add to the rotation.
    pub fn rotate(&mut self, radians: f64) -> bool {
        if !radians.is_finite() || radians == 0.0 {
            return false;
        }
        self.rotation += radians;
        true
    }

    /// Reset to identity (keeps the viewport).
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.rotation = 0.0;
    }
}

fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
