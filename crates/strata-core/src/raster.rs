//! Raster primitives shared by layers, strokes, the overlay and the compositor.

use crate::error::{EngineError, EngineResult};
use kurbo::Affine;
use peniko::Color;
use serde::{Deserialize, Serialize};
use tiny_skia::{ColorU8, IntSize, Pixmap, PixmapPaint, Transform};

/// Serializable color representation (RGBA8, straight alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Parse a CSS color string (`#000`, `#ff8800cc`, `rgb(...)`, named colors).
    pub fn parse(css: &str) -> Option<Self> {
        let parsed = peniko::color::parse_color(css.trim()).ok()?;
        Some(parsed.to_alpha_color::<peniko::color::Srgb>().into())
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A decoded image handed to the engine by its collaborator.
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Bitmap {
    /// Build a bitmap from straight-alpha RGBA8 rows.
    pub fn from_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> EngineResult<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let invalid = || EngineError::InvalidBitmap {
            width,
            height,
            expected,
            actual,
        };
        if actual != expected {
            return Err(invalid());
        }
        let size = IntSize::from_wh(width, height).ok_or_else(invalid)?;

        for px in data.chunks_exact_mut(4) {
            let premul = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            px.copy_from_slice(&[premul.red(), premul.green(), premul.blue(), premul.alpha()]);
        }

        let pixmap = Pixmap::from_vec(data, size).ok_or(EngineError::SurfaceAllocation { width, height })?;
        Ok(Self { pixmap })
    }

    /// A bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: SerializableColor) -> EngineResult<Self> {
        let data = [color.r, color.g, color.b, color.a].repeat(width as usize * height as usize);
        Self::from_rgba8(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Allocate a transparent surface.
pub fn allocate_surface(width: u32, height: u32) -> EngineResult<Pixmap> {
    Pixmap::new(width, height).ok_or(EngineError::SurfaceAllocation { width, height })
}

/// True when no pixel carries any alpha.
pub fn is_blank(pixmap: &Pixmap) -> bool {
    pixmap.pixels().iter().all(|p| p.alpha() == 0)
}

/// Convert a kurbo affine into a tiny-skia transform.
pub fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Copy `src` into `dst` anchored at the top-left corner, replacing pixels.
pub fn copy_into(dst: &mut Pixmap, src: &Pixmap) {
    let paint = PixmapPaint {
        blend_mode: tiny_skia::BlendMode::Source,
        ..PixmapPaint::default()
    };
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, Transform::identity(), None);
}

/// Straight-alpha RGBA8 copy of a surface, ready for image encoders.
pub fn to_rgba8(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
