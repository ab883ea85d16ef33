//! Hit testing: point → object lookup against a flat [`ObjectMap`].
//!
//! No scene tree to walk here — objects have no paint order, so "topmost"
//! is simply iteration order. `hit_object` returns the first object the
//! query point falls within tolerance of.

use sketch_core::{CanvasObject, ObjectId, ObjectMap, Point};

/// Tolerances for [`hit_node`]/[`hit_segment`]/[`hit_object`]. Defaults match
/// the values the Selector tool uses: a 15-unit pick radius around a point,
/// a 10-unit tolerance band around a line.
#[derive(Debug, Clone, Copy)]
pub struct HitTestConfig {
    pub node_radius: f64,
    pub segment_tol: f64,
    /// Segments shorter than this (squared length) never hit; guards
    /// against a division-free projection blowing up on a zero-length line.
    pub degenerate_segment_threshold: f64,
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self {
            node_radius: 15.0,
            segment_tol: 10.0,
            degenerate_segment_threshold: 1e-2,
        }
    }
}

/// True iff `q` lies within `tol` of point `p`. Compares squared distance
/// against `tol²` — no square root on this path.
pub fn hit_node(p: Point, tol: f64, q: Point) -> bool {
    (q - p).length_squared() < tol * tol
}

/// True iff `q`'s perpendicular projection onto the infinite line through
/// `a, b` lands within the segment (extended by `tol` at either end) and
/// the perpendicular distance is at most `tol`.
///
/// Works entirely in squared quantities: the projection parameter and the
/// perpendicular distance are both compared after multiplying through by
/// `‖b−a‖²`, so neither a square root nor a division is needed.
pub fn hit_segment(a: Point, b: Point, tol: f64, q: Point, degenerate_threshold: f64) -> bool {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < degenerate_threshold {
        return false;
    }

    let aq = q - a;
    let dot = aq.dot(ab); // = t * len2, for the unclamped projection parameter t
    let tol2 = tol * tol;

    if dot < 0.0 && dot * dot > tol2 * len2 {
        return false;
    }
    if dot > len2 && (dot - len2) * (dot - len2) > tol2 * len2 {
        return false;
    }

    let perp_lhs = aq.length_squared() * len2 - dot * dot;
    perp_lhs <= tol2 * len2
}

/// Scan `objects` in iteration order and return the first hit: a
/// `Node`/`FixedNode` within `config.node_radius`, or a `Line` within
/// `config.segment_tol`. `Path` and `Text` are not directly hit-testable —
/// a `Path`'s constituent `Line`s are.
pub fn hit_object(objects: &ObjectMap, config: &HitTestConfig, q: Point) -> Option<ObjectId> {
    for (&id, object) in objects.iter() {
        let hit = match object {
            CanvasObject::Node(n) => hit_node(n.point, config.node_radius, q),
            CanvasObject::FixedNode(n) => hit_node(n.point, config.node_radius, q),
            CanvasObject::Line(l) => {
                let (Some(p1), Some(p2)) =
                    (objects.point_of(l.point1), objects.point_of(l.point2))
                else {
                    continue;
                };
                hit_segment(p1, p2, config.segment_tol, q, config.degenerate_segment_threshold)
            }
            CanvasObject::Path(_) | CanvasObject::Text(_) => false,
        };
        if hit {
            return Some(id);
        }
    }
    None
}
