//! Transient image placement.
//!
//! A placed image floats above the composite until it is committed into a
//! layer or cancelled. Moving or scaling it never touches a layer.

use crate::layer::Layer;
use crate::raster::{Bitmap, to_skia_transform};
use kurbo::{Affine, Point, Vec2};
use tiny_skia::{FilterQuality, PixmapPaint};

/// Scale a freshly placed image starts at.
pub const DEFAULT_OVERLAY_SCALE: f64 = 0.5;

/// Wheel step applied when scrolling up (growing) or down (shrinking).
pub const WHEEL_GROW: f64 = 1.05;
pub const WHEEL_SHRINK: f64 = 0.95;

/// A placed, not yet committed image.
#[derive(Debug, Clone)]
pub struct ImageOverlay {
    pub bitmap: Bitmap,
    /// Center of the image in model space.
    pub position: Point,
    pub scale: f64,
    pub rotation: f64,
    /// Whether the pointer currently holds the image.
    pub dragging: bool,
}

impl ImageOverlay {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Drawn size in model units.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width() as f64 * self.scale, self.height() as f64 * self.scale)
    }

    /// Bitmap-pixel to model-space matrix: centered on `position`, scaled,
    /// then rotated about its center.
    pub fn affine(&self) -> Affine {
        let half = Vec2::new(self.width() as f64 / 2.0, self.height() as f64 / 2.0);
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(-half)
    }

    /// Draw the image into a surface through `view` (model to surface space).
    pub(crate) fn draw(&self, surface: &mut tiny_skia::Pixmap, view: Affine) {
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = to_skia_transform(view * self.affine());
        surface.draw_pixmap(0, 0, self.bitmap.pixmap().as_ref(), &paint, transform, None);
    }
}

/// Owns the placed image between begin and commit/cancel.
#[derive(Debug, Clone)]
pub struct ImageOverlayController {
    overlay: Option<ImageOverlay>,
    initial_scale: f64,
    wheel_grow: f64,
    wheel_shrink: f64,
}

impl Default for ImageOverlayController {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAY_SCALE, WHEEL_GROW, WHEEL_SHRINK)
    }
}

impl ImageOverlayController {
    pub fn new(initial_scale: f64, wheel_grow: f64, wheel_shrink: f64) -> Self {
        Self {
            overlay: None,
            initial_scale: valid_factor(initial_scale).unwrap_or(DEFAULT_OVERLAY_SCALE),
            wheel_grow: valid_factor(wheel_grow).unwrap_or(WHEEL_GROW),
            wheel_shrink: valid_factor(wheel_shrink).unwrap_or(WHEEL_SHRINK),
        }
    }

    pub fn overlay(&self) -> Option<&ImageOverlay> {
        self.overlay.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.overlay.is_some()
    }

    /// Place a new image centered at `center`, replacing any pending one.
    pub fn begin(&mut self, bitmap: Bitmap, center: Point) {
        log::debug!("Placing {}x{} image", bitmap.width(), bitmap.height());
        self.overlay = Some(ImageOverlay {
            bitmap,
            position: center,
            scale: self.initial_scale,
            rotation: 0.0,
            dragging: false,
        });
    }

    /// Move the image by a model-space delta.
    pub fn drag(&mut self, delta: Vec2) -> bool {
        match &mut self.overlay {
            Some(overlay) if delta.is_finite() => {
                overlay.position += delta;
                true
            }
            _ => false,
        }
    }

    /// Multiply the image scale. Non-positive factors are ignored.
    pub fn scale_by(&mut self, factor: f64) -> bool {
        match (&mut self.overlay, valid_factor(factor)) {
            (Some(overlay), Some(factor)) => {
                overlay.scale *= factor;
                true
            }
            _ => false,
        }
    }

    /// Scale by one wheel notch: negative deltas grow, others shrink.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        let factor = if delta_y < 0.0 { self.wheel_grow } else { self.wheel_shrink };
        self.scale_by(factor)
    }

    pub fn rotate_by(&mut self, radians: f64) -> bool {
        match &mut self.overlay {
            Some(overlay) if radians.is_finite() => {
                overlay.rotation += radians;
                true
            }
            _ => false,
        }
    }

    /// Pointer grabbed the image.
    pub fn press(&mut self) -> bool {
        match &mut self.overlay {
            Some(overlay) => {
                overlay.dragging = true;
                true
            }
            None => false,
        }
    }

    /// Pointer let go of the image.
    pub fn release(&mut self) -> bool {
        match &mut self.overlay {
            Some(overlay) => {
                overlay.dragging = false;
                true
            }
            None => false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.dragging)
    }

    /// Rasterize the image into `target` once and drop the overlay.
    pub fn commit(&mut self, target: &mut Layer) -> bool {
        let Some(overlay) = self.overlay.take() else {
            return false;
        };
        overlay.draw(target.surface_mut(), Affine::IDENTITY);
        log::debug!("Committed image into {}", target.name);
        true
    }

    /// Drop the overlay without writing anything.
    pub fn cancel(&mut self) -> bool {
        self.overlay.take().is_some()
    }
}

fn valid_factor(factor: f64) -> Option<f64> {
    (factor.is_finite() && factor > 0.0).then_some(factor)
}
