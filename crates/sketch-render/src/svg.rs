//! Object map → SVG document.
//!
//! Walks the committed `ObjectMap` and emits a static SVG string: each
//! non-guide `Path`'s sub-segments become `<line>` elements, each non-guide
//! `Text` becomes a `<foreignObject>` carrying its raw body. There is no
//! paint order to preserve — SVG element order follows map iteration order,
//! which is fine since none of the emitted shapes overlap in a way that
//! would make stacking matter.

use crate::coords::data_to_svg;
use sketch_core::{CanvasObject, ObjectMap, Point};
use std::fmt::Write as _;

/// Render `objects` to an SVG document, placing data-space coordinates at
/// `data_origin` (see [`crate::coords`]). Guide objects are omitted.
pub fn export_svg(objects: &ObjectMap, data_origin: Point) -> String {
    let mut body = String::new();
    for object in objects.values() {
        if object.is_guide() {
            continue;
        }
        match object {
            CanvasObject::Path(path) => write_path(&mut body, objects, path, data_origin),
            CanvasObject::Text(text) => write_text(&mut body, objects, text, data_origin),
            CanvasObject::Node(_) | CanvasObject::FixedNode(_) | CanvasObject::Line(_) => {}
        }
    }

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n{body}</svg>\n"
    )
}

fn write_path(out: &mut String, objects: &ObjectMap, path: &sketch_core::Path, data_origin: Point) {
    for &line_id in &path.lines {
        let Some((p1, p2)) = objects.line_endpoints(line_id) else {
            continue;
        };
        let (Some(a), Some(b)) = (objects.point_of(p1), objects.point_of(p2)) else {
            continue;
        };
        let a = data_to_svg(a, data_origin);
        let b = data_to_svg(b, data_origin);
        let _ = writeln!(
            out,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"1\"/>",
            a.x, a.y, b.x, b.y
        );
    }
}

fn write_text(out: &mut String, objects: &ObjectMap, text: &sketch_core::Text, data_origin: Point) {
    let Some(anchor) = objects.point_of(text.anchor) else {
        return;
    };
    let anchor = data_to_svg(anchor, data_origin);
    let _ = writeln!(
        out,
        "  <foreignObject x=\"{}\" y=\"{}\" width=\"1\" height=\"1\" overflow=\"visible\">{}</foreignObject>",
        anchor.x,
        anchor.y,
        escape(&text.body)
    );
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_core::{IdGenerator, Line, Node, ObjectHeader, Path, Text};

    #[test]
    fn exports_non_guide_path_as_lines() {
        let gen = IdGenerator::new();
        let mut objects = ObjectMap::new();
        let a = gen.next();
        let b = gen.next();
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: a, guide: false },
            point: Point::new(0.0, 0.0),
        }));
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: b, guide: false },
            point: Point::new(10.0, 0.0),
        }));
        let line_id = gen.next();
        objects.insert(CanvasObject::Line(Line {
            header: ObjectHeader { id: line_id, guide: false },
            point1: a,
            point2: b,
        }));
        let path_id = gen.next();
        objects.insert(CanvasObject::Path(Path {
            header: ObjectHeader { id: path_id, guide: false },
            points: vec![a, b],
            lines: vec![line_id],
        }));

        let svg = export_svg(&objects, Point::ZERO);
        assert!(svg.contains("<line"));
        assert!(svg.contains("stroke=\"black\""));
    }

    #[test]
    fn guide_path_is_omitted() {
        let gen = IdGenerator::new();
        let mut objects = ObjectMap::new();
        let a = gen.next();
        let b = gen.next();
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: a, guide: true },
            point: Point::new(0.0, 0.0),
        }));
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: b, guide: true },
            point: Point::new(10.0, 0.0),
        }));
        let line_id = gen.next();
        objects.insert(CanvasObject::Line(Line {
            header: ObjectHeader { id: line_id, guide: true },
            point1: a,
            point2: b,
        }));
        let path_id = gen.next();
        objects.insert(CanvasObject::Path(Path {
            header: ObjectHeader { id: path_id, guide: true },
            points: vec![a, b],
            lines: vec![line_id],
        }));

        let svg = export_svg(&objects, Point::ZERO);
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn text_becomes_foreign_object_with_raw_body() {
        let gen = IdGenerator::new();
        let mut objects = ObjectMap::new();
        let anchor = gen.next();
        objects.insert(CanvasObject::Node(Node {
            header: ObjectHeader { id: anchor, guide: false },
            point: Point::new(3.0, 4.0),
        }));
        let text_id = gen.next();
        objects.insert(CanvasObject::Text(Text {
            header: ObjectHeader { id: text_id, guide: false },
            anchor,
            body: "x^2".to_string(),
        }));

        let svg = export_svg(&objects, Point::ZERO);
        assert!(svg.contains("<foreignObject"));
        assert!(svg.contains("x^2"));
    }
}
