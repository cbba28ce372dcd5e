//! Engine configuration.

use crate::animation::DEFAULT_FPS;
use crate::error::EngineResult;
use crate::layer::{DEFAULT_SELECTION_OPACITY, ResizePolicy};
use crate::overlay::{DEFAULT_OVERLAY_SCALE, WHEEL_GROW, WHEEL_SHRINK};
use crate::raster::SerializableColor;
use crate::smoothing::DEFAULT_SMOOTHING_FACTOR;
use crate::tools::{DEFAULT_STROKE_SIZE, SELECTION_HIGHLIGHT};
use crate::view::{MIN_SCALE, ROTATE_STEP, ZOOM_STEP};
use serde::{Deserialize, Serialize};

/// Tunables for a [`Session`](crate::Session). Every field has a default, so
/// a partial JSON object is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub zoom_step: f64,
    pub rotate_step: f64,
    pub min_scale: f64,
    /// CSS color the pen starts with.
    pub default_color: String,
    pub default_size: f64,
    pub stabilizer: bool,
    pub smoothing_factor: f64,
    pub selection_color: SerializableColor,
    pub selection_opacity: f64,
    pub overlay_scale: f64,
    pub wheel_grow: f64,
    pub wheel_shrink: f64,
    pub fps: u32,
    pub resize_policy: ResizePolicy,
    pub clip_to_selection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            zoom_step: ZOOM_STEP,
            rotate_step: ROTATE_STEP,
            min_scale: MIN_SCALE,
            default_color: "#000000".to_string(),
            default_size: DEFAULT_STROKE_SIZE,
            stabilizer: false,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            selection_color: SELECTION_HIGHLIGHT,
            selection_opacity: DEFAULT_SELECTION_OPACITY,
            overlay_scale: DEFAULT_OVERLAY_SCALE,
            wheel_grow: WHEEL_GROW,
            wheel_shrink: WHEEL_SHRINK,
            fps: DEFAULT_FPS,
            resize_policy: ResizePolicy::DropContent,
            clip_to_selection: true,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
