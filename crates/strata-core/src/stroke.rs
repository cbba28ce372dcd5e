//! Stroke capture: turns pointer positions into rasterized segments.

use crate::layer::LayerStack;
use crate::raster::SerializableColor;
use crate::smoothing::SmoothingFilter;
use crate::tools::{ToolKind, ToolSettings};
use crate::view::ViewTransform;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// One rasterized piece of a stroke, in model space.
///
/// Segments are not kept after drawing. The same shape carries remote
/// strokes, so the engine never knows where a segment came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
    pub color: SerializableColor,
    pub width: f64,
    pub tool: ToolKind,
}

impl StrokeSegment {
    /// Draw this segment into a surface with the tool's blend mode.
    pub fn rasterize(&self, surface: &mut Pixmap) {
        let mut pb = PathBuilder::new();
        pb.move_to(self.from.x as f32, self.from.y as f32);
        pb.line_to(self.to.x as f32, self.to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(self.color.to_skia());
        paint.blend_mode = self.tool.blend().to_skia();
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draw into the layer this segment's tool targets: the selection layer
    /// for the select tool, the active layer otherwise.
    pub fn apply(&self, stack: &mut LayerStack) {
        let target = if self.tool.targets_selection() {
            stack.selection_mut()
        } else {
            stack.active_mut()
        };
        self.rasterize(target.surface_mut());
    }
}

/// State of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    /// Pointer is down; `last` is the previous (smoothed) model point.
    Drawing { last: Point },
}

/// Idle → Drawing → Idle state machine feeding segments into layers.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    state: StrokeState,
    filter: SmoothingFilter,
}

impl StrokeRecorder {
    pub fn new(filter: SmoothingFilter) -> Self {
        Self {
            state: StrokeState::Idle,
            filter,
        }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    pub fn filter(&self) -> &SmoothingFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut SmoothingFilter {
        &mut self.filter
    }

    /// Start a stroke. Nothing is drawn yet.
    pub fn begin(&mut self, screen: Point, view: &ViewTransform) {
        let model = view.to_model_space(screen);
        self.filter.reset();
        let last = self.filter.next(model);
        self.state = StrokeState::Drawing { last };
    }

    /// Continue the stroke to a new pointer position.
    ///
    /// Draws exactly one segment and returns it. Ignored (returns `None`) when
    /// no stroke is in progress.
    pub fn extend(
        &mut self,
        screen: Point,
        view: &ViewTransform,
        settings: &ToolSettings,
        stack: &mut LayerStack,
    ) -> Option<StrokeSegment> {
        let StrokeState::Drawing { last } = self.state else {
            log::debug!("Ignoring stroke extend while idle");
            return None;
        };
        let next = self.filter.next(view.to_model_space(screen));
        let segment = StrokeSegment {
            from: last,
            to: next,
            color: settings.tool.paint_color(settings.color, settings.highlight),
            width: settings.size(),
            tool: settings.tool,
        };
        segment.apply(stack);
        self.state = StrokeState::Drawing { last: next };
        Some(segment)
    }

    /// Finish the stroke. Returns false if none was in progress.
    pub fn end(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = StrokeState::Idle;
        was_drawing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn setup() -> (StrokeRecorder, ViewTransform, ToolSettings, LayerStack) {
        (
            StrokeRecorder::default(),
            ViewTransform::new(Size::new(100.0, 100.0)),
            ToolSettings::default(),
            LayerStack::new(100, 100).unwrap(),
        )
    }

    fn alpha_at(surface: &Pixmap, x: u32, y: u32) -> u8 {
        surface.pixel(x, y).unwrap().alpha()
    }

    #[test]
    fn test_extend_before_begin_ignored() {
        let (mut recorder, view, settings, mut stack) = setup();
        assert!(recorder.extend(Point::new(5.0, 5.0), &view, &settings, &mut stack).is_none());
        assert!(stack.active().is_blank());
    }

    #[test]
    fn test_begin_draws_nothing() {
        let (mut recorder, view, _settings, stack) = setup();
        recorder.begin(Point::new(10.0, 10.0), &view);
        assert!(recorder.is_drawing());
        assert!(stack.active().is_blank());
    }

    #[test]
    fn test_pen_segment() {
        let (mut recorder, view, settings, mut stack) = setup();
        recorder.begin(Point::new(10.0, 10.0), &view);
        let segment = recorder
            .extend(Point::new(20.0, 10.0), &view, &settings, &mut stack)
            .unwrap();
        assert!(recorder.end());

        assert_eq!(segment.from, Point::new(10.0, 10.0));
        assert_eq!(segment.to, Point::new(20.0, 10.0));
        assert_eq!(segment.tool, ToolKind::Pen);
        assert!(alpha_at(stack.active().surface(), 15, 10) > 0);
        assert_eq!(alpha_at(stack.active().surface(), 15, 40), 0);
        assert!(!recorder.is_drawing());
    }

    #[test]
    fn test_points_are_mapped_to_model_space() {
        let (mut recorder, mut view, settings, mut stack) = setup();
        view.zoom(2.0);
        recorder.begin(Point::new(50.0, 50.0), &view);
        let segment = recorder
            .extend(Point::new(70.0, 50.0), &view, &settings, &mut stack)
            .unwrap();
        assert!((segment.to.x - 60.0).abs() < 1e-9);
        assert!((segment.to.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_smoothing_lags_behind() {
        let (mut recorder, view, settings, mut stack) = setup();
        recorder.filter_mut().set_enabled(true);
        recorder.filter_mut().set_factor(2.0);
        recorder.begin(Point::new(0.0, 50.0), &view);
        let segment = recorder
            .extend(Point::new(40.0, 50.0), &view, &settings, &mut stack)
            .unwrap();
        assert_eq!(segment.to, Point::new(20.0, 50.0));
    }

    #[test]
    fn test_new_stroke_starts_unsmoothed() {
        let (mut recorder, view, settings, mut stack) = setup();
        recorder.filter_mut().set_enabled(true);
        recorder.filter_mut().set_factor(2.0);
        recorder.begin(Point::new(0.0, 50.0), &view);
        recorder.extend(Point::new(40.0, 50.0), &view, &settings, &mut stack);
        recorder.end();

        recorder.begin(Point::new(60.0, 10.0), &view);
        let first = recorder
            .extend(Point::new(60.0, 10.0), &view, &settings, &mut stack)
            .unwrap();
        assert_eq!(first.from, Point::new(60.0, 10.0));
        let second = recorder
            .extend(Point::new(100.0, 10.0), &view, &settings, &mut stack)
            .unwrap();
        assert_eq!(second.to, Point::new(80.0, 10.0));
    }

    #[test]
    fn test_eraser_only_touches_target() {
        let (mut recorder, view, mut settings, mut stack) = setup();
        let bottom = stack.active_id();
        recorder.begin(Point::new(10.0, 50.0), &view);
        recorder.extend(Point::new(90.0, 50.0), &view, &settings, &mut stack);
        recorder.end();

        stack.add_layer(None).unwrap();
        recorder.begin(Point::new(10.0, 50.0), &view);
        recorder.extend(Point::new(90.0, 50.0), &view, &settings, &mut stack);
        recorder.end();

        let before: Vec<u8> = stack.get(bottom).unwrap().surface().data().to_vec();

        settings.tool = ToolKind::Eraser;
        settings.set_size(20.0);
        recorder.begin(Point::new(10.0, 50.0), &view);
        recorder.extend(Point::new(90.0, 50.0), &view, &settings, &mut stack);
        recorder.end();

        assert_eq!(alpha_at(stack.active().surface(), 50, 50), 0);
        assert_eq!(stack.get(bottom).unwrap().surface().data(), before.as_slice());
    }

    #[test]
    fn test_select_targets_selection_layer() {
        let (mut recorder, view, mut settings, mut stack) = setup();
        settings.tool = ToolKind::Select;
        settings.set_color("#ff0000");
        recorder.begin(Point::new(10.0, 10.0), &view);
        let segment = recorder
            .extend(Point::new(60.0, 10.0), &view, &settings, &mut stack)
            .unwrap();
        assert_eq!(segment.color, settings.highlight);
        assert!(stack.has_selection());
        assert!(stack.active().is_blank());
    }

    #[test]
    fn test_remote_segment_applies_like_local() {
        let (_, _, _, mut stack) = setup();
        let segment = StrokeSegment {
            from: Point::new(0.0, 30.0),
            to: Point::new(100.0, 30.0),
            color: SerializableColor::new(0, 0, 255, 255),
            width: 4.0,
            tool: ToolKind::Pen,
        };
        segment.apply(&mut stack);
        let px = stack.active().surface().pixel(50, 30).unwrap();
        assert_eq!(px.blue(), 255);
    }
}
