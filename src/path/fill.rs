//! Winding-number computation against a rightward ray.

use crate::geometry::CurveSegment;
use crate::math::Point2;

use super::Path;

/// Curves whose bounding box is smaller than this are treated as their
/// chord when counting crossings.
const BISECT_EPS: f64 = 0.001;

/// Sums ray crossings over all contours of the path.
///
/// Contours that do not end where they started contribute an implicit
/// closing chord.
pub(super) fn winding_number(path: &Path, point: &Point2) -> i32 {
    let mut winding = 0;
    for contour in path.contours() {
        for curve in contour.curves_for_fill() {
            winding += curve_crossing(&curve, point);
        }
    }
    winding
}

/// Number of times a rightward ray from `point` crosses the segment:
/// `+1` for an upward crossing, `-1` for a downward one.
fn curve_crossing(curve: &CurveSegment, point: &Point2) -> i32 {
    match curve {
        CurveSegment::Line(p) => line_crossing(point, &p[0], &p[1]),
        _ => crossing_by_bisection(curve, point),
    }
}

/// Crossing count for a line segment.
///
/// The y-range is half-open so that a crossing through a shared vertex is
/// counted exactly once across adjacent segments.
fn line_crossing(point: &Point2, a: &Point2, b: &Point2) -> i32 {
    if a.y <= point.y {
        if b.y > point.y {
            let side = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
            if side > 0.0 {
                return 1;
            }
        }
    } else if b.y <= point.y {
        let side = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        if side < 0.0 {
            return -1;
        }
    }
    0
}

/// Crossing count for a curved segment by recursive bisection.
///
/// Pieces whose bounding box lies strictly left of the point, or entirely
/// off the ray's y-range, cannot cross; pieces entirely right of the
/// point, or small enough, are counted via their chord.
fn crossing_by_bisection(curve: &CurveSegment, point: &Point2) -> i32 {
    let bounds = curve.bounds();
    if bounds.max.y < point.y || bounds.min.y > point.y || bounds.max.x < point.x {
        return 0;
    }

    let start = curve.start_point();
    let end = curve.end_point();
    if bounds.min.x > point.x || bounds.diagonal() < BISECT_EPS {
        return line_crossing(point, &start, &end);
    }

    let (left, right) = curve.split(0.5);
    crossing_by_bisection(&left, point) + crossing_by_bisection(&right, point)
}
