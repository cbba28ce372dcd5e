//! The drawing session: all engine state behind one command entry point.

use crate::animation::{Frames, Playback};
use crate::command::Command;
use crate::compositor::Compositor;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::layer::{LayerStack, ResizePolicy};
use crate::overlay::{ImageOverlay, ImageOverlayController};
use crate::raster::{SerializableColor, allocate_surface};
use crate::smoothing::SmoothingFilter;
use crate::stroke::{StrokeRecorder, StrokeSegment};
use crate::tools::ToolSettings;
use crate::view::ViewTransform;
use kurbo::{Point, Size};

/// Owns the view, tools, frames, overlay and visible surface.
///
/// Collaborators mutate it only through [`Session::execute`] and
/// [`Session::apply_remote`]; the visible surface is re-rendered after every
/// change.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    view: ViewTransform,
    settings: ToolSettings,
    recorder: StrokeRecorder,
    frames: Frames,
    overlay: ImageOverlayController,
    /// Last screen point while the pointer holds the overlay.
    grab: Option<Point>,
    compositor: Compositor,
    playback: Playback,
}

impl Session {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let (width, height) = (config.width, config.height);
        let view =
            ViewTransform::new(Size::new(width as f64, height as f64)).with_min_scale(config.min_scale);

        let mut settings = ToolSettings::default();
        settings.highlight = config.selection_color;
        settings.set_color(&config.default_color);
        settings.set_size(config.default_size);

        let filter = SmoothingFilter::new(config.stabilizer, config.smoothing_factor);
        let frames = Frames::new(width, height, config.selection_opacity)?;
        let overlay = ImageOverlayController::new(config.overlay_scale, config.wheel_grow, config.wheel_shrink);
        let compositor = Compositor::new(width, height)?.with_selection_clipping(config.clip_to_selection);

        let mut session = Self {
            view,
            settings,
            recorder: StrokeRecorder::new(filter),
            frames,
            overlay,
            grab: None,
            compositor,
            playback: Playback::new(config.fps),
            config,
        };
        session.render();
        log::info!("Session started at {}x{}", width, height);
        Ok(session)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// Layer stack of the current frame.
    pub fn stack(&self) -> &LayerStack {
        self.frames.current()
    }

    pub fn overlay(&self) -> Option<&ImageOverlay> {
        self.overlay.overlay()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        self.config.resize_policy
    }

    pub fn set_resize_policy(&mut self, policy: ResizePolicy) {
        self.config.resize_policy = policy;
    }

    /// Straight-alpha RGBA8 pixels of the visible surface.
    pub fn pixels(&self) -> Vec<u8> {
        self.compositor.to_rgba8()
    }

    /// Re-composite the current frame into the visible surface.
    pub fn render(&mut self) {
        self.compositor
            .render(self.frames.current(), &self.view, self.overlay.overlay());
    }

    /// Apply one command.
    ///
    /// Returns the segment drawn by a local `StrokeExtend`, so it can be
    /// forwarded to peers. Commands that do not apply are ignored. The only
    /// error is a failed surface allocation, which leaves the session as it was.
    pub fn execute(&mut self, command: Command) -> EngineResult<Option<StrokeSegment>> {
        let name = command.name();
        let mut segment = None;

        let changed = match command {
            Command::SetTool(tool) => {
                self.recorder.end();
                self.settings.tool = tool;
                true
            }
            Command::SetColor(css) => self.settings.set_color(&css),
            Command::SetSize(size) => self.settings.set_size(size),
            Command::ToggleStabilizer => {
                let enabled = self.recorder.filter_mut().toggle();
                log::debug!("Stabilizer {}", if enabled { "on" } else { "off" });
                true
            }
            Command::SetSmoothingFactor(factor) => {
                self.recorder.filter_mut().set_factor(factor);
                true
            }
            Command::Zoom(multiplier) => self.view.zoom(multiplier),
            Command::ZoomIn => self.view.zoom(self.config.zoom_step),
            Command::ZoomOut => self.view.zoom(1.0 / self.config.zoom_step),
            Command::Rotate(radians) => self.view.rotate(radians),
            Command::RotateStep => self.view.rotate(self.config.rotate_step),

            Command::StrokeBegin(screen) => {
                if self.overlay.is_active() {
                    self.grab = Some(screen);
                    self.overlay.press()
                } else {
                    self.recorder.begin(screen, &self.view);
                    true
                }
            }
            Command::StrokeExtend(screen) => {
                if self.overlay.is_active() {
                    self.drag_overlay(screen)
                } else {
                    segment = self.recorder.extend(
                        screen,
                        &self.view,
                        &self.settings,
                        self.frames.current_mut(),
                    );
                    segment.is_some()
                }
            }
            Command::StrokeEnd => {
                if self.overlay.is_active() {
                    self.grab = None;
                    self.overlay.release()
                } else {
                    self.recorder.end()
                }
            }

            Command::LayerAdd(name) => {
                self.frames.current_mut().add_layer(name.as_deref())?;
                true
            }
            Command::LayerDelete(id) => self.frames.current_mut().delete_layer(id),
            Command::LayerMove(id, direction) => self.frames.current_mut().move_layer(id, direction),
            Command::LayerSetOpacity(id, opacity) => self.frames.current_mut().set_opacity(id, opacity),
            Command::LayerSetActive(id) => self.frames.current_mut().set_active(id),
            Command::ClearSelection => self.frames.current_mut().clear_selection(),

            Command::ImageBegin(bitmap) => {
                self.recorder.end();
                self.grab = None;
                let center = self.view.to_model_space(self.view.center());
                self.overlay.begin(bitmap, center);
                true
            }
            Command::ImageDrag(delta) => self.overlay.drag(self.view.delta_to_model(delta)),
            Command::ImageScale(factor) => self.overlay.scale_by(factor),
            Command::ImageWheel(delta_y) => self.overlay.wheel(delta_y),
            Command::ImageRotate(radians) => self.overlay.rotate_by(radians),
            Command::ImageCommit => {
                self.grab = None;
                self.overlay.commit(self.frames.current_mut().active_mut())
            }
            Command::ImageCancel => {
                self.grab = None;
                self.overlay.cancel()
            }

            Command::FrameAdd => {
                self.recorder.end();
                self.frames.add_frame()?;
                true
            }
            Command::FrameDelete => self.switch_frame(Frames::delete_frame),
            Command::FramePrev => self.switch_frame(Frames::prev),
            Command::FrameNext => self.switch_frame(Frames::next),
            Command::FrameGoto(index) => self.switch_frame(|frames| frames.goto(index)),
            Command::FrameAdvance => self.switch_frame(|frames| {
                frames.advance();
                true
            }),

            Command::Resize { width, height } => {
                self.resize(width, height)?;
                true
            }
        };

        if changed {
            self.render();
        } else {
            log::debug!("Ignored command {}", name);
        }
        Ok(segment)
    }

    /// Draw a segment received from a peer into the current frame.
    pub fn apply_remote(&mut self, segment: &StrokeSegment) {
        if !segment.width.is_finite() || segment.width <= 0.0 {
            log::debug!("Ignoring remote segment with width {}", segment.width);
            return;
        }
        segment.apply(self.frames.current_mut());
        self.render();
    }

    /// Current pen color.
    pub fn color(&self) -> SerializableColor {
        self.settings.color
    }

    fn drag_overlay(&mut self, screen: Point) -> bool {
        let Some(last) = self.grab else {
            return false;
        };
        if !self.overlay.is_dragging() {
            return false;
        }
        self.grab = Some(screen);
        self.overlay.drag(self.view.delta_to_model(screen - last))
    }

    fn switch_frame(&mut self, switch: impl FnOnce(&mut Frames) -> bool) -> bool {
        let switched = switch(&mut self.frames);
        if switched {
            self.recorder.end();
        }
        switched
    }

    /// Resize every surface and the viewport. All allocations happen before
    /// anything is replaced.
    fn resize(&mut self, width: u32, height: u32) -> EngineResult<()> {
        let surface = allocate_surface(width, height)?;
        self.frames.resize(width, height, self.config.resize_policy)?;
        self.compositor.replace_surface(surface);
        self.view.set_viewport(Size::new(width as f64, height as f64));
        self.config.width = width;
        self.config.height = height;
        log::info!("Resized to {}x{}", width, height);
        Ok(())
    }
}
