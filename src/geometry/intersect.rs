use crate::math::{points_near, Point2, NEAR_PARAM, TOLERANCE};

use super::CurveSegment;

/// Maximum number of intersections reported for one curve pair.
///
/// Curve pairs are not expected to cross more often; additional
/// intersections are silently dropped.
pub const MAX_INTERSECTIONS: usize = 9;

/// Curve pairs whose direction vectors have a cross product below this
/// are treated as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// Subdivision stops once both sub-curve boxes are smaller than this.
const SPATIAL_EPS: f64 = 1e-4;

/// Subdivision depth limit; parameters are resolved to about `2^-depth`.
const MAX_DEPTH: u32 = 48;

/// One intersection between two curve segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Parameter on the first curve.
    pub t1: f64,
    /// Parameter on the second curve.
    pub t2: f64,
    /// Intersection point.
    pub point: Point2,
}

/// Computes the intersections of two curve segments, capped at
/// [`MAX_INTERSECTIONS`] results.
///
/// Line pairs are solved analytically; any pair involving a curved
/// segment uses recursive bounding-box subdivision. Coincident segments
/// (same variant tracing the same geometry, in either direction) report
/// no crossings — they are collapsed later by coincidence handling.
#[must_use]
pub fn curve_intersect(a: &CurveSegment, b: &CurveSegment) -> Vec<Intersection> {
    if let (CurveSegment::Line(l1), CurveSegment::Line(l2)) = (a, b) {
        return line_line_intersect(l1, l2).into_iter().collect();
    }

    if curves_trace_same_geometry(a, b) {
        return Vec::new();
    }

    let mut out = Vec::new();
    subdivide(a, b, (0.0, 1.0), (0.0, 1.0), MAX_DEPTH, &mut out);
    out
}

/// Analytic segment/segment intersection; parallel lines yield nothing.
fn line_line_intersect(l1: &[Point2; 2], l2: &[Point2; 2]) -> Option<Intersection> {
    let d1 = l1[1] - l1[0];
    let d2 = l2[1] - l2[0];

    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < PARALLEL_EPS {
        return None;
    }

    let dx = l2[0].x - l1[0].x;
    let dy = l2[0].y - l1[0].y;
    let t1 = (dx * d2.y - dy * d2.x) / cross;
    let t2 = (dx * d1.y - dy * d1.x) / cross;

    // Include endpoints within the snap tolerance so that crossings at
    // shared corners are found.
    if t1 < -NEAR_PARAM || t1 > 1.0 + NEAR_PARAM || t2 < -NEAR_PARAM || t2 > 1.0 + NEAR_PARAM {
        return None;
    }
    let t1 = t1.clamp(0.0, 1.0);
    let t2 = t2.clamp(0.0, 1.0);
    Some(Intersection {
        t1,
        t2,
        point: l1[0] + d1 * t1,
    })
}

/// Returns whether two segments of the same variant trace the same
/// geometry, in either direction.
fn curves_trace_same_geometry(a: &CurveSegment, b: &CurveSegment) -> bool {
    if std::mem::discriminant(a) != std::mem::discriminant(b) {
        return false;
    }
    let (a0, a1) = (a.start_point(), a.end_point());
    let (b0, b1) = (b.start_point(), b.end_point());

    let same_way = points_near(&a0, &b0, TOLERANCE) && points_near(&a1, &b1, TOLERANCE);
    let reversed = points_near(&a0, &b1, TOLERANCE) && points_near(&a1, &b0, TOLERANCE);
    if !same_way && !reversed {
        return false;
    }

    let mid_a = a.point_at(0.5);
    let mid_b = b.point_at(0.5);
    points_near(&mid_a, &mid_b, TOLERANCE)
}

fn subdivide(
    a: &CurveSegment,
    b: &CurveSegment,
    ta: (f64, f64),
    tb: (f64, f64),
    depth: u32,
    out: &mut Vec<Intersection>,
) {
    if out.len() >= MAX_INTERSECTIONS {
        return;
    }

    let bounds_a = a.bounds();
    let bounds_b = b.bounds();
    if !bounds_a.intersects(&bounds_b) {
        return;
    }

    let small_a = bounds_a.diagonal() < SPATIAL_EPS;
    let small_b = bounds_b.diagonal() < SPATIAL_EPS;

    if depth == 0 || (small_a && small_b) {
        push_candidate(
            out,
            Intersection {
                t1: (ta.0 + ta.1) / 2.0,
                t2: (tb.0 + tb.1) / 2.0,
                point: a.point_at(0.5),
            },
        );
        return;
    }

    let mid = |r: (f64, f64)| (r.0 + r.1) / 2.0;

    if small_b {
        let (a1, a2) = a.split(0.5);
        subdivide(&a1, b, (ta.0, mid(ta)), tb, depth - 1, out);
        subdivide(&a2, b, (mid(ta), ta.1), tb, depth - 1, out);
    } else if small_a {
        let (b1, b2) = b.split(0.5);
        subdivide(a, &b1, ta, (tb.0, mid(tb)), depth - 1, out);
        subdivide(a, &b2, ta, (mid(tb), tb.1), depth - 1, out);
    } else {
        let (a1, a2) = a.split(0.5);
        let (b1, b2) = b.split(0.5);
        subdivide(&a1, &b1, (ta.0, mid(ta)), (tb.0, mid(tb)), depth - 1, out);
        subdivide(&a1, &b2, (ta.0, mid(ta)), (mid(tb), tb.1), depth - 1, out);
        subdivide(&a2, &b1, (mid(ta), ta.1), (tb.0, mid(tb)), depth - 1, out);
        subdivide(&a2, &b2, (mid(ta), ta.1), (mid(tb), tb.1), depth - 1, out);
    }
}

/// Records a candidate unless an equivalent intersection (both parameters
/// nearby) is already present.
fn push_candidate(out: &mut Vec<Intersection>, candidate: Intersection) {
    const DEDUP_EPS: f64 = 0.01;

    if out.len() >= MAX_INTERSECTIONS {
        return;
    }
    for existing in out.iter() {
        if (existing.t1 - candidate.t1).abs() < DEDUP_EPS
            && (existing.t2 - candidate.t2).abs() < DEDUP_EPS
        {
            return;
        }
    }
    out.push(candidate);
}
