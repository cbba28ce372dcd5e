//! Compositor: renders a layer stack through the view into the visible surface.

use crate::error::EngineResult;
use crate::layer::{Layer, LayerStack};
use crate::overlay::ImageOverlay;
use crate::raster::{allocate_surface, to_rgba8, to_skia_transform};
use crate::view::ViewTransform;
use tiny_skia::{BlendMode, FilterQuality, Mask, MaskType, Pixmap, PixmapPaint};

/// Produces the final image for the viewport.
///
/// `render` only writes the visible surface; the same inputs always give the
/// same pixels.
pub struct Compositor {
    surface: Pixmap,
    /// Clip the composite to the painted selection (when one exists).
    clip_to_selection: bool,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .field("clip_to_selection", &self.clip_to_selection)
            .finish()
    }
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        Ok(Self {
            surface: allocate_surface(width, height)?,
            clip_to_selection: true,
        })
    }

    pub fn with_selection_clipping(mut self, enabled: bool) -> Self {
        self.clip_to_selection = enabled;
        self
    }

    pub fn clips_to_selection(&self) -> bool {
        self.clip_to_selection
    }

    /// The visible surface as of the last render.
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Straight-alpha RGBA8 pixels of the visible surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        to_rgba8(&self.surface)
    }

    /// Swap in a surface allocated by the caller, so a resize can allocate
    /// everything before replacing anything.
    pub(crate) fn replace_surface(&mut self, surface: Pixmap) {
        self.surface = surface;
    }

    /// Composite `stack` (and the optional overlay) through `view`.
    pub fn render(&mut self, stack: &LayerStack, view: &ViewTransform, overlay: Option<&ImageOverlay>) {
        let affine = view.affine();
        let transform = to_skia_transform(affine);

        self.surface.fill(tiny_skia::Color::TRANSPARENT);

        for layer in stack.layers() {
            draw_layer(&mut self.surface, layer, BlendMode::SourceOver, transform);
        }

        // An unpainted selection would blank everything, so it means "no clip".
        if self.clip_to_selection && stack.has_selection() {
            self.clip_to(stack.selection(), transform);
        }

        draw_layer(&mut self.surface, stack.selection(), BlendMode::SourceOver, transform);

        if let Some(overlay) = overlay {
            overlay.draw(&mut self.surface, affine);
        }
    }

    /// Destination-in against the selection's coverage: pixels the select tool
    /// touched at all are kept whole, everything else is cleared.
    fn clip_to(&mut self, selection: &Layer, transform: tiny_skia::Transform) {
        let Some(mut coverage) = Pixmap::new(self.surface.width(), self.surface.height()) else {
            return;
        };
        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        coverage.draw_pixmap(0, 0, selection.surface().as_ref(), &paint, transform, None);

        let mut mask = Mask::from_pixmap(coverage.as_ref(), MaskType::Alpha);
        for value in mask.data_mut() {
            if *value != 0 {
                *value = u8::MAX;
            }
        }
        self.surface.apply_mask(&mask);
    }
}

fn draw_layer(surface: &mut Pixmap, layer: &Layer, blend_mode: BlendMode, transform: tiny_skia::Transform) {
    if layer.opacity() <= 0.0 {
        return;
    }
    let paint = PixmapPaint {
        opacity: layer.opacity() as f32,
        blend_mode,
        quality: FilterQuality::Bilinear,
    };
    surface.draw_pixmap(0, 0, layer.surface().as_ref(), &paint, transform, None);
}
