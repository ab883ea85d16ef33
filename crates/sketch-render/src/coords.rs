//! Bijections between the three coordinate frames a sketch lives in.
//!
//! - **Viewport** — screen-space pixel offsets from the drawing surface's
//!   top-left; y grows downward.
//! - **SVG** — viewport coordinates translated by `viewBox.offset`; y still
//!   grows downward.
//! - **Data** — the mathematical plane the solver and the object model work
//!   in; y grows upward, origin at `dataOrigin`.
//!
//! Every function here is a pure coordinate change — none of them touch an
//! `ObjectMap` or a tool state. The tool state machine owns `offset` and
//! `dataOrigin` and threads them through.

use sketch_core::Point;

/// `p` shifted from viewport space into SVG space.
pub fn viewport_to_svg(p: Point, offset: Point) -> Point {
    p + offset
}

/// `p` shifted from SVG space back into viewport space.
pub fn svg_to_viewport(p: Point, offset: Point) -> Point {
    p - offset
}

/// `p` converted from SVG space (y down) into data space (y up), with the
/// data origin expressed in SVG coordinates.
pub fn svg_to_data(p: Point, data_origin: Point) -> Point {
    Point::new(p.x - data_origin.x, data_origin.y - p.y)
}

/// Inverse of [`svg_to_data`].
pub fn data_to_svg(p: Point, data_origin: Point) -> Point {
    Point::new(p.x + data_origin.x, data_origin.y - p.y)
}

/// `svg_to_data ∘ viewport_to_svg`.
pub fn viewport_to_data(p: Point, offset: Point, data_origin: Point) -> Point {
    svg_to_data(viewport_to_svg(p, offset), data_origin)
}

/// `svg_to_viewport ∘ data_to_svg`.
pub fn data_to_viewport(p: Point, offset: Point, data_origin: Point) -> Point {
    svg_to_viewport(data_to_svg(p, data_origin), offset)
}

/// The portion of `viewBox` that `ResizeView(w, h)` recomputes: width and
/// height in SVG units, derived from the new pixel dimensions and the
/// current zoom.
pub fn resize_view_box(width_px: f64, height_px: f64, scale: f64) -> (f64, f64) {
    (width_px / scale, height_px / scale)
}
