use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, Rect};

/// Rounded rectangle outline with quadratic-curve corners.
///
/// Each corner is a quadratic curve whose control point is the rectangle corner itself, so the
/// corners are slightly tighter than circular arcs of the same radius.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let Rect { x0, y0, x1, y1 } = rect;
    let r = radius;
    let mut p = BezPath::new();
    p.move_to((x0 + r, y0));
    p.line_to((x1 - r, y0));
    p.quad_to((x1, y0), (x1, y0 + r));
    p.line_to((x1, y1 - r));
    p.quad_to((x1, y1), (x1 - r, y1));
    p.line_to((x0 + r, y1));
    p.quad_to((x0, y1), (x0, y1 - r));
    p.line_to((x0, y0 + r));
    p.quad_to((x0, y0), (x0 + r, y0));
    p.close_path();
    p
}

/// Closed circle outline.
pub fn circle_path(center: Point, radius: f64) -> BezPath {
    kurbo::Circle::new(center, radius).to_path(0.1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geometry.rs"]
mod tests;
