//! Strata Core Library
//!
//! Raster drawing engine: layered surfaces, a zoomable and rotatable view,
//! stroke capture with optional stabilization, selection clipping, image
//! placement and animation frames. Platform-agnostic; collaborators drive it
//! through [`Session::execute`].

pub mod animation;
pub mod command;
pub mod compositor;
pub mod config;
pub mod error;
pub mod layer;
pub mod overlay;
pub mod protocol;
pub mod raster;
pub mod session;
pub mod smoothing;
pub mod stroke;
pub mod tools;
pub mod view;

pub use kurbo;

pub use animation::{Frames, Playback};
pub use command::Command;
pub use compositor::Compositor;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use layer::{Direction, Layer, LayerId, LayerRole, LayerStack, ResizePolicy};
pub use overlay::{ImageOverlay, ImageOverlayController};
pub use protocol::{ClientMessage, DrawMessage, ServerMessage};
pub use raster::{Bitmap, SerializableColor};
pub use session::Session;
pub use smoothing::SmoothingFilter;
pub use stroke::{StrokeRecorder, StrokeSegment, StrokeState};
pub use tools::{ToolKind, ToolSettings};
pub use view::ViewTransform;
