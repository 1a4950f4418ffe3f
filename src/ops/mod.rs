//! Boolean operations over closed vector paths.
//!
//! The engine runs a fixed five-phase pipeline over a planar graph:
//! collect the input contours into edges, split edges at every pairwise
//! intersection, classify each edge side against the combined fill,
//! repair classification inconsistencies, and reassemble the surviving
//! boundary edges into output contours.

mod classify;
mod collect;
mod graph;
mod reassemble;
mod repair;
mod split;

use crate::path::{FillRule, Path};

use graph::OpGraph;

/// The boolean operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    /// Resolve the self-overlaps of a single path.
    Simplify,
    /// Area covered by either path.
    Union,
    /// Area covered by both paths.
    Intersection,
    /// Area of the first path not covered by the second.
    Difference,
    /// Area covered by exactly one of the paths.
    Xor,
}

/// Read-only inputs of one operation, shared by all phases.
pub(crate) struct OpParams {
    pub op: PathOp,
    pub fill_rule: FillRule,
    pub first: Path,
    pub second: Option<Path>,
}

/// Applies a boolean operation to one or two paths.
///
/// Open contours are invisible to the operation and dropped up front.
/// The call never fails: numerical trouble degrades into a best-effort
/// result rather than an error, and unsupported situations (such as a
/// curve pair crossing more than nine times) are silently truncated.
///
/// For [`PathOp::Simplify`], `second` is ignored. For the binary
/// operations, a missing `second` behaves like an empty path.
#[must_use]
pub fn path_op(op: PathOp, fill_rule: FillRule, first: &Path, second: Option<&Path>) -> Path {
    let params = OpParams {
        op,
        fill_rule,
        first: first.without_open_contours(),
        second: match op {
            PathOp::Simplify => None,
            _ => second.map(Path::without_open_contours),
        },
    };

    let mut graph = OpGraph::new();
    let mut next_curve_index = 0;
    collect::collect_path(&mut graph, &params.first, 0, &mut next_curve_index);
    if let Some(ref second) = params.second {
        collect::collect_path(&mut graph, second, 1, &mut next_curve_index);
    }

    split::split_edges(&mut graph);
    graph.purge_removed();

    classify::classify(&mut graph, &params);

    graph.compute_angles();
    graph.sort_node_edges();
    repair::repair(&mut graph, &params);

    reassemble::reassemble(&mut graph)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::path::PathBuilder;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        let mut b = PathBuilder::new();
        b.add_rect(p(x0, y0), p(x1, y1));
        b.build()
    }

    fn area(path: &Path) -> f64 {
        path.area().abs()
    }

    #[test]
    fn union_of_overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let out = path_op(PathOp::Union, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 1);
        assert!((area(&out) - 175.0).abs() < 1e-6, "area {}", area(&out));
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let out = path_op(PathOp::Intersection, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 1);
        assert!((area(&out) - 25.0).abs() < 1e-6, "area {}", area(&out));
    }

    #[test]
    fn difference_of_overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let out = path_op(PathOp::Difference, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 1);
        assert!((area(&out) - 75.0).abs() < 1e-6, "area {}", area(&out));
    }

    #[test]
    fn xor_of_overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let out = path_op(PathOp::Xor, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 2);
        assert!((area(&out) - 150.0).abs() < 1e-6, "area {}", area(&out));
    }

    #[test]
    fn simplify_preserves_area_of_simple_paths() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let out = path_op(PathOp::Simplify, FillRule::NonZero, &a, None);
        assert!((area(&out) - 100.0).abs() < 1e-6);

        let mut b = PathBuilder::new();
        b.add_circle(p(3.0, 4.0), 6.0);
        let circle = b.build();
        let out = path_op(PathOp::Simplify, FillRule::EvenOdd, &circle, None);
        let expect = std::f64::consts::PI * 36.0;
        assert!((area(&out) - expect).abs() / expect < 0.01);
    }

    #[test]
    fn simplify_is_idempotent() {
        let mut b = PathBuilder::new();
        // Self-overlapping figure: two overlapping rects in one path.
        b.add_rect(p(0.0, 0.0), p(10.0, 10.0));
        b.add_rect(p(5.0, 5.0), p(15.0, 15.0));
        let path = b.build();
        let once = path_op(PathOp::Simplify, FillRule::NonZero, &path, None);
        let twice = path_op(PathOp::Simplify, FillRule::NonZero, &once, None);
        assert!((area(&once) - 175.0).abs() < 1e-6, "area {}", area(&once));
        assert!((area(&twice) - area(&once)).abs() < 1e-6);
        assert!((once.area() - twice.area()).abs() < 1e-6);
    }

    #[test]
    fn union_with_self_equals_simplify() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let union = path_op(PathOp::Union, FillRule::NonZero, &a, Some(&a));
        let simplified = path_op(PathOp::Simplify, FillRule::NonZero, &a, None);
        assert_eq!(union.contours().len(), simplified.contours().len());
        assert!((area(&union) - area(&simplified)).abs() < 1e-6);
    }

    #[test]
    fn difference_with_self_is_empty() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let out = path_op(PathOp::Difference, FillRule::NonZero, &a, Some(&a));
        assert!(out.is_empty());
    }

    #[test]
    fn contained_square_union_is_the_outer_square() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(2.0, 2.0, 8.0, 8.0);
        let out = path_op(PathOp::Union, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 1);
        assert!((area(&out) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn contained_square_difference_leaves_a_ring() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(2.0, 2.0, 8.0, 8.0);
        let out = path_op(PathOp::Difference, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 2);
        // The hole winds opposite to the outer contour, so the signed
        // areas cancel down to the ring.
        assert!((area(&out) - 64.0).abs() < 1e-6, "area {}", out.area());
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 20.0, 30.0, 30.0);
        let out = path_op(PathOp::Intersection, FillRule::NonZero, &a, Some(&b));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_second_path_behaves_like_empty() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let union = path_op(PathOp::Union, FillRule::NonZero, &a, None);
        assert!((area(&union) - 100.0).abs() < 1e-6);
        let inter = path_op(PathOp::Intersection, FillRule::NonZero, &a, None);
        assert!(inter.is_empty());
    }

    #[test]
    fn union_of_circles() {
        let mut b1 = PathBuilder::new();
        b1.add_circle(p(0.0, 0.0), 5.0);
        let c1 = b1.build();
        let mut b2 = PathBuilder::new();
        b2.add_circle(p(4.0, 0.0), 5.0);
        let c2 = b2.build();
        let out = path_op(PathOp::Union, FillRule::NonZero, &c1, Some(&c2));
        assert_eq!(out.contours().len(), 1);
        let one = std::f64::consts::PI * 25.0;
        let got = area(&out);
        // Bigger than one circle, smaller than two.
        assert!(got > one * 1.05, "area {got}");
        assert!(got < one * 2.0, "area {got}");
    }

    #[test]
    fn union_survives_a_crossing_near_a_corner() {
        // The second rectangle's left side crosses the first one's
        // bottom edge 0.008 from its corner, inside node snapping
        // distance; the crossing must land on the corner node instead of
        // cutting off a degenerate fragment.
        let a = rect(0.0, 0.0, 1.2, 1.2);
        let b = rect(0.008, -1.0, 0.7, 0.6);
        let out = path_op(PathOp::Union, FillRule::NonZero, &a, Some(&b));
        assert_eq!(out.contours().len(), 1);
        assert!(out.contours()[0].is_closed());
        assert!((area(&out) - 2.136).abs() < 0.02, "area {}", area(&out));
    }

    #[test]
    fn xor_with_contained_square_under_even_odd() {
        // EvenOdd and NonZero agree for disjoint-boundary nesting.
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(2.0, 2.0, 8.0, 8.0);
        for rule in [FillRule::NonZero, FillRule::EvenOdd] {
            let out = path_op(PathOp::Xor, rule, &a, Some(&b));
            assert_eq!(out.contours().len(), 2);
            assert!((area(&out) - 64.0).abs() < 1e-6);
        }
    }
}
