//! End-to-end scenarios driven through `Session::execute`.

use kurbo::{Point, Vec2};
use strata_core::{
    Bitmap, ClientMessage, Command, Direction, EngineConfig, ResizePolicy, SerializableColor, Session, ToolKind,
};

fn session(width: u32, height: u32) -> Session {
    Session::new(EngineConfig::default().with_size(width, height)).unwrap()
}

fn stroke(session: &mut Session, from: Point, to: Point) {
    session.execute(Command::StrokeBegin(from)).unwrap();
    session.execute(Command::StrokeExtend(to)).unwrap();
    session.execute(Command::StrokeEnd).unwrap();
}

fn visible_alpha(session: &Session, x: u32, y: u32) -> u8 {
    session.compositor().surface().pixel(x, y).unwrap().alpha()
}

#[test]
fn test_add_layer_scenario() {
    let mut session = session(64, 64);
    session.execute(Command::LayerAdd(None)).unwrap();
    assert_eq!(session.stack().names(), vec!["Selection", "Layer 1", "Layer 2"]);
    assert_eq!(session.stack().active().name, "Layer 2");
}

#[test]
fn test_zoom_in_then_out_restores_scale() {
    let mut session = session(64, 64);
    session.execute(Command::ZoomIn).unwrap();
    assert!((session.view().scale() - 1.1).abs() < 1e-12);
    session.execute(Command::ZoomOut).unwrap();
    assert!((session.view().scale() - 1.0).abs() < 1e-12);
}

#[test]
fn test_pen_stroke_scenario() {
    let mut session = session(100, 100);
    session.execute(Command::StrokeBegin(Point::new(10.0, 10.0))).unwrap();
    let segment = session
        .execute(Command::StrokeExtend(Point::new(20.0, 10.0)))
        .unwrap()
        .expect("one segment");
    session.execute(Command::StrokeEnd).unwrap();

    assert_eq!(segment.from, Point::new(10.0, 10.0));
    assert_eq!(segment.to, Point::new(20.0, 10.0));
    assert!(session.stack().active().surface().pixel(15, 10).unwrap().alpha() > 0);
    assert!(visible_alpha(&session, 15, 10) > 0);
}

#[test]
fn test_image_commit_scenario() {
    let mut session = session(400, 400);
    let bitmap = Bitmap::solid(100, 100, SerializableColor::new(0, 200, 0, 255)).unwrap();
    session.execute(Command::ImageBegin(bitmap)).unwrap();
    assert!(session.stack().active().is_blank());
    session.execute(Command::ImageScale(2.0)).unwrap();
    session.execute(Command::ImageCommit).unwrap();

    assert!(session.overlay().is_none());
    let layer = session.stack().active().surface();
    assert_eq!(layer.pixel(200, 200).unwrap().alpha(), 255);
    assert_eq!(layer.pixel(155, 155).unwrap().alpha(), 255);
    assert_eq!(layer.pixel(140, 140).unwrap().alpha(), 0);
    assert_eq!(layer.pixel(260, 260).unwrap().alpha(), 0);

    // Overlay operations after commit do nothing.
    session.execute(Command::ImageDrag(Vec2::new(10.0, 10.0))).unwrap();
    assert!(session.overlay().is_none());
}

#[test]
fn test_image_cancel_writes_nothing() {
    let mut session = session(100, 100);
    let bitmap = Bitmap::solid(10, 10, SerializableColor::black()).unwrap();
    session.execute(Command::ImageBegin(bitmap)).unwrap();
    assert!(visible_alpha(&session, 50, 50) > 0);
    session.execute(Command::ImageCancel).unwrap();
    assert!(session.stack().active().is_blank());
    assert_eq!(visible_alpha(&session, 50, 50), 0);
}

#[test]
fn test_stroke_stays_under_rotation() {
    let mut session = session(100, 100);
    session.execute(Command::Rotate(std::f64::consts::FRAC_PI_2)).unwrap();
    session.execute(Command::Zoom(1.5)).unwrap();
    stroke(&mut session, Point::new(30.0, 30.0), Point::new(70.0, 30.0));

    // Screen points drawn under the view land back under them on screen.
    assert!(visible_alpha(&session, 50, 30) > 0);
    session.execute(Command::Rotate(-std::f64::consts::FRAC_PI_2)).unwrap();
    session.execute(Command::Zoom(1.0 / 1.5)).unwrap();
    // Undoing the view moves the drawing to its model position.
    assert_eq!(visible_alpha(&session, 50, 30), 0);
}

#[test]
fn test_eraser_only_affects_active_layer() {
    let mut session = session(100, 100);
    stroke(&mut session, Point::new(10.0, 50.0), Point::new(90.0, 50.0));
    let bottom = session.stack().active_id();
    session.execute(Command::LayerAdd(None)).unwrap();
    stroke(&mut session, Point::new(10.0, 50.0), Point::new(90.0, 50.0));

    session.execute(Command::SetTool(ToolKind::Eraser)).unwrap();
    session.execute(Command::SetSize(30.0)).unwrap();
    stroke(&mut session, Point::new(0.0, 50.0), Point::new(100.0, 50.0));

    assert!(session.stack().active().is_blank());
    assert!(!session.stack().get(bottom).unwrap().is_blank());
    assert_eq!(visible_alpha(&session, 50, 50), 255);
}

#[test]
fn test_selection_clips_and_clears() {
    let mut session = session(100, 100);
    stroke(&mut session, Point::new(0.0, 20.0), Point::new(100.0, 20.0));
    stroke(&mut session, Point::new(0.0, 80.0), Point::new(100.0, 80.0));
    session.execute(Command::SetTool(ToolKind::Select)).unwrap();
    stroke(&mut session, Point::new(0.0, 20.0), Point::new(100.0, 20.0));

    assert_eq!(visible_alpha(&session, 50, 80), 0);
    assert_eq!(visible_alpha(&session, 50, 20), 255);

    session.execute(Command::ClearSelection).unwrap();
    assert_eq!(visible_alpha(&session, 50, 80), 255);
}

#[test]
fn test_layer_invariants_hold() {
    let mut session = session(16, 16);
    for step in 0..40 {
        let ids: Vec<_> = session.stack().layers().iter().map(|l| l.id()).collect();
        let pick = ids[step % ids.len()];
        let command = match step % 5 {
            0 | 3 => Command::LayerAdd(None),
            1 => Command::LayerDelete(pick),
            2 => Command::LayerMove(pick, Direction::Up),
            _ => Command::LayerDelete(session.stack().selection().id()),
        };
        session.execute(command).unwrap();
        assert!(!session.stack().is_empty());
        assert_eq!(session.stack().names()[0], "Selection");
        assert!(session.stack().layers().iter().any(|l| l.id() == session.stack().active_id()));
    }
}

#[test]
fn test_frames_are_independent() {
    let mut session = session(50, 50);
    stroke(&mut session, Point::new(0.0, 25.0), Point::new(50.0, 25.0));
    session.execute(Command::FrameAdd).unwrap();
    assert_eq!(visible_alpha(&session, 25, 25), 0);
    session.execute(Command::FrameAdvance).unwrap();
    assert_eq!(session.frames().current_index(), 0);
    assert!(visible_alpha(&session, 25, 25) > 0);
}

#[test]
fn test_resize_drops_content_by_default() {
    let mut session = session(50, 50);
    stroke(&mut session, Point::new(0.0, 25.0), Point::new(50.0, 25.0));
    session.execute(Command::Resize { width: 60, height: 60 }).unwrap();
    assert!(session.stack().active().is_blank());

    stroke(&mut session, Point::new(0.0, 25.0), Point::new(50.0, 25.0));
    session.set_resize_policy(ResizePolicy::PreserveContent);
    session.execute(Command::Resize { width: 70, height: 70 }).unwrap();
    assert!(!session.stack().active().is_blank());
}

#[test]
fn test_remote_draw_message_applies() {
    let mut session = session(100, 100);
    let message = ClientMessage::parse(
        r##"{"type":"draw","prev":{"x":0,"y":40},"curr":{"x":100,"y":40},"color":"#0000ff","size":4}"##,
    )
    .unwrap();
    let ClientMessage::Draw(draw) = message else {
        panic!("expected draw");
    };
    session.apply_remote(&draw.to_segment().unwrap());
    let px = session.compositor().surface().pixel(50, 40).unwrap();
    assert_eq!(px.blue(), 255);
}

#[test]
fn test_render_is_deterministic() {
    let mut session = session(80, 80);
    session.execute(Command::Zoom(1.3)).unwrap();
    stroke(&mut session, Point::new(5.0, 5.0), Point::new(70.0, 60.0));
    let first = session.pixels();
    session.render();
    assert_eq!(session.pixels(), first);
}
