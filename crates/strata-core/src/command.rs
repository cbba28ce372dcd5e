//! Commands a collaborator sends to a [`Session`](crate::Session).

use crate::layer::{Direction, LayerId};
use crate::raster::Bitmap;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};

/// Every mutation of the engine is one of these.
///
/// Points are screen coordinates; the session maps them into model space.
#[derive(Debug, Clone)]
pub enum Command {
    // Tools and view
    SetTool(ToolKind),
    /// CSS color string.
    SetColor(String),
    SetSize(f64),
    ToggleStabilizer,
    SetSmoothingFactor(f64),
    Zoom(f64),
    ZoomIn,
    ZoomOut,
    /// Rotate the view by the given radians.
    Rotate(f64),
    /// Rotate the view by the configured step.
    RotateStep,

    // Strokes
    StrokeBegin(Point),
    StrokeExtend(Point),
    StrokeEnd,

    // Layers
    LayerAdd(Option<String>),
    LayerDelete(LayerId),
    LayerMove(LayerId, Direction),
    LayerSetOpacity(LayerId, f64),
    LayerSetActive(LayerId),
    ClearSelection,

    // Image placement
    ImageBegin(Bitmap),
    /// Screen-space drag delta.
    ImageDrag(Vec2),
    ImageScale(f64),
    ImageWheel(f64),
    ImageRotate(f64),
    ImageCommit,
    ImageCancel,

    // Frames
    FrameAdd,
    FrameDelete,
    FramePrev,
    FrameNext,
    FrameGoto(usize),
    FrameAdvance,

    Resize { width: u32, height: u32 },
}

impl Command {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetTool(_) => "set_tool",
            Command::SetColor(_) => "set_color",
            Command::SetSize(_) => "set_size",
            Command::ToggleStabilizer => "toggle_stabilizer",
            Command::SetSmoothingFactor(_) => "set_smoothing_factor",
            Command::Zoom(_) => "zoom",
            Command::ZoomIn => "zoom_in",
            Command::ZoomOut => "zoom_out",
            Command::Rotate(_) => "rotate",
            Command::RotateStep => "rotate_step",
            Command::StrokeBegin(_) => "stroke_begin",
            Command::StrokeExtend(_) => "stroke_extend",
            Command::StrokeEnd => "stroke_end",
            Command::LayerAdd(_) => "layer_add",
            Command::LayerDelete(_) => "layer_delete",
            Command::LayerMove(..) => "layer_move",
            Command::LayerSetOpacity(..) => "layer_set_opacity",
            Command::LayerSetActive(_) => "layer_set_active",
            Command::ClearSelection => "clear_selection",
            Command::ImageBegin(_) => "image_begin",
            Command::ImageDrag(_) => "image_drag",
            Command::ImageScale(_) => "image_scale",
            Command::ImageWheel(_) => "image_wheel",
            Command::ImageRotate(_) => "image_rotate",
            Command::ImageCommit => "image_commit",
            Command::ImageCancel => "image_cancel",
            Command::FrameAdd => "frame_add",
            Command::FrameDelete => "frame_delete",
            Command::FramePrev => "frame_prev",
            Command::FrameNext => "frame_next",
            Command::FrameGoto(_) => "frame_goto",
            Command::FrameAdvance => "frame_advance",
            Command::Resize { .. } => "resize",
        }
    }
}
