//! End-to-end scenarios driven entirely through `Drawing::send_event`,
//! mirroring the kind of acceptance tests a host integration would run.

use pretty_assertions::assert_eq;
use sketch_core::Point;
use sketch_editor::{Button, Drawing, Event, ObjectRequest};

fn add_node(drawing: &mut Drawing, point: Point) -> sketch_core::ObjectId {
    drawing
        .send_event(Event::AddObject { guide: false, object: ObjectRequest::Node { point } })
        .unwrap();
    drawing
        .data_state()
        .objects
        .iter()
        .map(|(id, _)| *id)
        .max()
        .unwrap()
}

fn add_line(drawing: &mut Drawing, p1: sketch_core::ObjectId, p2: sketch_core::ObjectId) -> sketch_core::ObjectId {
    drawing
        .send_event(Event::AddObject { guide: false, object: ObjectRequest::Line { point1: p1, point2: p2 } })
        .unwrap();
    drawing
        .data_state()
        .objects
        .iter()
        .map(|(id, _)| *id)
        .max()
        .unwrap()
}

fn click(drawing: &mut Drawing, p: Point, ctrl: bool) {
    drawing
        .send_event(Event::MouseDown { button: Button::Primary, ctrl, p })
        .unwrap();
}

/// S1 — Perpendicular, driven end to end: select both lines by clicking on
/// their midpoints, then request the constraint.
#[test]
fn s1_perpendicular_via_selection_and_event() {
    let mut drawing = Drawing::new();
    let a1 = add_node(&mut drawing, Point::new(0.0, 0.0));
    let a2 = add_node(&mut drawing, Point::new(100.0, 0.0));
    add_line(&mut drawing, a1, a2);
    let b1 = add_node(&mut drawing, Point::new(50.0, -20.0));
    let b2 = add_node(&mut drawing, Point::new(150.0, 80.0));
    add_line(&mut drawing, b1, b2);

    click(&mut drawing, Point::new(50.0, 0.0), false); // on line A, replaces selection
    click(&mut drawing, Point::new(100.0, 30.0), true); // midpoint of B, ctrl-adds

    drawing.send_event(Event::AddPerpendicularConstraint).unwrap();

    let pa1 = drawing.data_state().objects.point_of(a1).unwrap();
    let pa2 = drawing.data_state().objects.point_of(a2).unwrap();
    let pb1 = drawing.data_state().objects.point_of(b1).unwrap();
    let pb2 = drawing.data_state().objects.point_of(b2).unwrap();
    let dot = (pa2 - pa1).dot(pb2 - pb1);
    assert!(dot.abs() < 1e-4, "dot product {dot} not near zero");
}

/// S2 — Horizontal.
#[test]
fn s2_horizontal_via_selection_and_event() {
    let mut drawing = Drawing::new();
    let p1 = add_node(&mut drawing, Point::new(0.0, 0.0));
    let p2 = add_node(&mut drawing, Point::new(100.0, 5.0));
    add_line(&mut drawing, p1, p2);

    click(&mut drawing, Point::new(50.0, 2.5), false);
    drawing.send_event(Event::AddHorizontalConstraint).unwrap();

    let a = drawing.data_state().objects.point_of(p1).unwrap();
    let b = drawing.data_state().objects.point_of(p2).unwrap();
    assert!((a.y - b.y).abs() < 1e-6);
}

/// S5 — Pen commit: draw two segments then commit with Enter, expecting the
/// trailing rubber-band point/line to be pruned from the committed Path.
#[test]
fn s5_pen_commit_prunes_trailing_rubber_band() {
    let mut drawing = Drawing::new();
    drawing.send_event(Event::KeyDown { key: "p".to_string() }).unwrap();
    drawing.send_event(Event::MouseMove { p: Point::new(10.0, 10.0) }).unwrap();
    drawing
        .send_event(Event::MouseDown { button: Button::Primary, ctrl: false, p: Point::new(10.0, 10.0) })
        .unwrap();
    drawing.send_event(Event::MouseMove { p: Point::new(20.0, 30.0) }).unwrap();
    drawing
        .send_event(Event::MouseDown { button: Button::Primary, ctrl: false, p: Point::new(20.0, 30.0) })
        .unwrap();
    drawing.send_event(Event::MouseMove { p: Point::new(40.0, 40.0) }).unwrap();
    drawing.send_event(Event::KeyDown { key: "Enter".to_string() }).unwrap();

    let objects = &drawing.data_state().objects;
    let paths: Vec<_> = objects
        .iter()
        .filter(|(_, o)| matches!(o, sketch_core::CanvasObject::Path(_)))
        .collect();
    assert_eq!(paths.len(), 1);
    let nodes: Vec<_> = objects
        .iter()
        .filter(|(_, o)| matches!(o, sketch_core::CanvasObject::Node(_)))
        .collect();
    assert_eq!(nodes.len(), 2);
    let lines: Vec<_> = objects
        .iter()
        .filter(|(_, o)| matches!(o, sketch_core::CanvasObject::Line(_)))
        .collect();
    assert_eq!(lines.len(), 1);

    let points: Vec<Point> = nodes.iter().filter_map(|(_, o)| o.point()).collect();
    assert!(points.contains(&Point::new(10.0, 10.0)));
    assert!(points.contains(&Point::new(20.0, 30.0)));
}

/// S6 — Pan round trip returns the view offset to its starting value.
#[test]
fn s6_pan_round_trip() {
    let mut drawing = Drawing::new();
    drawing.send_event(Event::SetViewOffset { o: Point::new(0.0, 0.0) }).unwrap();
    drawing
        .send_event(Event::MouseDown { button: Button::Secondary, ctrl: false, p: Point::new(100.0, 100.0) })
        .unwrap();
    drawing.send_event(Event::MouseMove { p: Point::new(120.0, 130.0) }).unwrap();
    drawing.send_event(Event::MouseMove { p: Point::new(100.0, 100.0) }).unwrap();
    drawing
        .send_event(Event::MouseUp { button: Button::Secondary, ctrl: false, p: Point::new(100.0, 100.0) })
        .unwrap();

    let offset = drawing.tool_state().view_box.offset;
    assert!(offset.x.abs() < 1e-9 && offset.y.abs() < 1e-9);
}
