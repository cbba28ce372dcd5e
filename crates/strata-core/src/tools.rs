//! Drawing tools and their settings.

use crate::raster::SerializableColor;
use serde::{Deserialize, Serialize};

/// Default stroke width in model units.
pub const DEFAULT_STROKE_SIZE: f64 = 5.0;

/// Highlight painted by the select tool, whatever the current color is.
pub const SELECTION_HIGHLIGHT: SerializableColor = SerializableColor::new(0, 120, 255, 96);

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Select,
}

/// How a segment is blended into its target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Paint over existing pixels.
    SourceOver,
    /// Remove existing pixels where the segment covers them.
    DestinationOut,
}

impl Blend {
    pub(crate) fn to_skia(self) -> tiny_skia::BlendMode {
        match self {
            Blend::SourceOver => tiny_skia::BlendMode::SourceOver,
            Blend::DestinationOut => tiny_skia::BlendMode::DestinationOut,
        }
    }
}

impl ToolKind {
    pub fn blend(self) -> Blend {
        match self {
            ToolKind::Pen | ToolKind::Select => Blend::SourceOver,
            ToolKind::Eraser => Blend::DestinationOut,
        }
    }

    /// Color a segment of this tool is painted with.
    ///
    /// The eraser only uses coverage, so its color is irrelevant.
    pub fn paint_color(self, selected: SerializableColor, highlight: SerializableColor) -> SerializableColor {
        match self {
            ToolKind::Pen => selected,
            ToolKind::Eraser => SerializableColor::black(),
            ToolKind::Select => highlight,
        }
    }

    /// Whether segments go to the selection layer instead of the active one.
    pub fn targets_selection(self) -> bool {
        matches!(self, ToolKind::Select)
    }
}

/// Current tool, color and size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: SerializableColor,
    size: f64,
    /// Fixed color the select tool paints with.
    pub highlight: SerializableColor,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: SerializableColor::black(),
            size: DEFAULT_STROKE_SIZE,
            highlight: SELECTION_HIGHLIGHT,
        }
    }
}

impl ToolSettings {
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Set the stroke width. Non-finite or non-positive sizes are ignored.
    pub fn set_size(&mut self, size: f64) -> bool {
        if !size.is_finite() || size <= 0.0 {
            log::debug!("Ignoring stroke size {}", size);
            return false;
        }
        self.size = size;
        true
    }

    /// Set the color from a CSS string. Unparsable strings are ignored.
    pub fn set_color(&mut self, css: &str) -> bool {
        match SerializableColor::parse(css) {
            Some(color) => {
                self.color = color;
                true
            }
            None => {
                log::warn!("Ignoring unparsable color {:?}", css);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool() {
        let settings = ToolSettings::default();
        assert_eq!(settings.tool, ToolKind::Pen);
        assert_eq!(settings.color, SerializableColor::black());
    }

    #[test]
    fn test_blend_per_tool() {
        assert_eq!(ToolKind::Pen.blend(), Blend::SourceOver);
        assert_eq!(ToolKind::Select.blend(), Blend::SourceOver);
        assert_eq!(ToolKind::Eraser.blend(), Blend::DestinationOut);
    }

    #[test]
    fn test_select_ignores_color() {
        let red = SerializableColor::new(255, 0, 0, 255);
        assert_eq!(ToolKind::Select.paint_color(red, SELECTION_HIGHLIGHT), SELECTION_HIGHLIGHT);
        assert_eq!(ToolKind::Pen.paint_color(red, SELECTION_HIGHLIGHT), red);
    }

    #[test]
    fn test_invalid_settings_ignored() {
        let mut settings = ToolSettings::default();
        assert!(!settings.set_size(0.0));
        assert!(!settings.set_color("bogus"));
        assert!((settings.size() - DEFAULT_STROKE_SIZE).abs() < f64::EPSILON);
        assert!(settings.set_color("#00ff00"));
        assert_eq!(settings.color, SerializableColor::new(0, 255, 0, 255));
    }

    #[test]
    fn test_tool_serde_names() {
        let json = serde_json::to_string(&ToolKind::Eraser).unwrap();
        assert_eq!(json, "\"eraser\"");
    }
}
