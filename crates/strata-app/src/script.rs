//! Drawing scripts: a JSON list of steps replayed through a [`Session`].
//!
//! ```json
//! {
//!   "config": { "width": 200, "height": 200 },
//!   "steps": [
//!     { "op": "set_color", "color": "#ff0000" },
//!     { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 90, "y": 90 }] }
//!   ]
//! }
//! ```

use crate::error::AppResult;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strata_core::layer::SELECTION_LAYER_NAME;
use strata_core::{Bitmap, Command, Direction, EngineConfig, LayerId, Session, StrokeSegment, ToolKind};

/// A parsed script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// One script step. Layers are referred to by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    SetTool { tool: ToolKind },
    SetColor { color: String },
    SetSize { size: f64 },
    ToggleStabilizer,
    SetSmoothingFactor { factor: f64 },
    Zoom { factor: f64 },
    ZoomIn,
    ZoomOut,
    Rotate { radians: f64 },
    RotateStep,
    StrokeBegin { at: Point },
    StrokeExtend { at: Point },
    StrokeEnd,
    /// Begin, extend through every following point, end.
    Stroke { points: Vec<Point> },
    LayerAdd {
        #[serde(default)]
        name: Option<String>,
    },
    LayerDelete { layer: String },
    LayerMove { layer: String, direction: Direction },
    LayerOpacity { layer: String, opacity: f64 },
    LayerSelect { layer: String },
    ClearSelection,
    /// Decode an image file (relative to the script) and place it.
    Image { path: PathBuf },
    ImageDrag { dx: f64, dy: f64 },
    ImageScale { factor: f64 },
    ImageWheel { delta: f64 },
    ImageRotate { radians: f64 },
    ImageCommit,
    ImageCancel,
    FrameAdd,
    FrameDelete,
    FramePrev,
    FrameNext,
    FrameGoto { index: usize },
    /// Advance playback `n` frames.
    Play { n: usize },
    Resize { width: u32, height: u32 },
}

/// Decode an image file into a straight-alpha bitmap.
pub fn load_bitmap(path: &Path) -> AppResult<Bitmap> {
    let decoded = image::open(path)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(Bitmap::from_rgba8(width, height, decoded.into_raw())?)
}

/// Replays steps into a session.
#[derive(Debug)]
pub struct Player {
    session: Session,
    base_dir: PathBuf,
    /// Segments emitted by local strokes, in order.
    segments: Vec<StrokeSegment>,
}

impl Player {
    /// `base_dir` is where relative image paths are resolved.
    pub fn new(session: Session, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            session,
            base_dir: base_dir.into(),
            segments: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn segments(&self) -> &[StrokeSegment] {
        &self.segments
    }

    pub fn run(&mut self, steps: &[Step]) -> AppResult<()> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, step: &Step) -> AppResult<()> {
        match step {
            Step::Stroke { points } => {
                let Some((first, rest)) = points.split_first() else {
                    log::warn!("Skipping stroke without points");
                    return Ok(());
                };
                self.execute(Command::StrokeBegin(*first))?;
                for point in rest {
                    self.execute(Command::StrokeExtend(*point))?;
                }
                self.execute(Command::StrokeEnd)
            }
            Step::Play { n } => {
                for _ in 0..*n {
                    self.execute(Command::FrameAdvance)?;
                }
                Ok(())
            }
            Step::Image { path } => {
                let bitmap = load_bitmap(&self.base_dir.join(path))?;
                self.execute(Command::ImageBegin(bitmap))
            }
            other => match self.to_command(other) {
                Some(command) => self.execute(command),
                None => Ok(()),
            },
        }
    }

    fn execute(&mut self, command: Command) -> AppResult<()> {
        if let Some(segment) = self.session.execute(command)? {
            self.segments.push(segment);
        }
        Ok(())
    }

    /// Resolve a layer name in the current frame.
    fn layer(&self, name: &str) -> Option<LayerId> {
        let stack = self.session.stack();
        let id = if name == SELECTION_LAYER_NAME {
            Some(stack.selection().id())
        } else {
            stack.find(name)
        };
        if id.is_none() {
            log::warn!("Unknown layer {:?}", name);
        }
        id
    }

    fn to_command(&self, step: &Step) -> Option<Command> {
        let command = match step {
            Step::SetTool { tool } => Command::SetTool(*tool),
            Step::SetColor { color } => Command::SetColor(color.clone()),
            Step::SetSize { size } => Command::SetSize(*size),
            Step::ToggleStabilizer => Command::ToggleStabilizer,
            Step::SetSmoothingFactor { factor } => Command::SetSmoothingFactor(*factor),
            Step::Zoom { factor } => Command::Zoom(*factor),
            Step::ZoomIn => Command::ZoomIn,
            Step::ZoomOut => Command::ZoomOut,
            Step::Rotate { radians } => Command::Rotate(*radians),
            Step::RotateStep => Command::RotateStep,
            Step::StrokeBegin { at } => Command::StrokeBegin(*at),
            Step::StrokeExtend { at } => Command::StrokeExtend(*at),
            Step::StrokeEnd => Command::StrokeEnd,
            Step::LayerAdd { name } => Command::LayerAdd(name.clone()),
            Step::LayerDelete { layer } => Command::LayerDelete(self.layer(layer)?),
            Step::LayerMove { layer, direction } => Command::LayerMove(self.layer(layer)?, *direction),
            Step::LayerOpacity { layer, opacity } => Command::LayerSetOpacity(self.layer(layer)?, *opacity),
            Step::LayerSelect { layer } => Command::LayerSetActive(self.layer(layer)?),
            Step::ClearSelection => Command::ClearSelection,
            Step::ImageDrag { dx, dy } => Command::ImageDrag(Vec2::new(*dx, *dy)),
            Step::ImageScale { factor } => Command::ImageScale(*factor),
            Step::ImageWheel { delta } => Command::ImageWheel(*delta),
            Step::ImageRotate { radians } => Command::ImageRotate(*radians),
            Step::ImageCommit => Command::ImageCommit,
            Step::ImageCancel => Command::ImageCancel,
            Step::FrameAdd => Command::FrameAdd,
            Step::FrameDelete => Command::FrameDelete,
            Step::FramePrev => Command::FramePrev,
            Step::FrameNext => Command::FrameNext,
            Step::FrameGoto { index } => Command::FrameGoto(*index),
            Step::Resize { width, height } => Command::Resize {
                width: *width,
                height: *height,
            },
            Step::Stroke { .. } | Step::Play { .. } | Step::Image { .. } => return None,
        };
        Some(command)
    }
}
