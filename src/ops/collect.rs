//! Builds the operation graph from the input paths.

use crate::geometry::CurveSegment;
use crate::math::{points_near, TOLERANCE};
use crate::path::{Path, PathVerb};

use super::graph::OpGraph;

/// Collects every closed contour of `path` into the graph as a chain of
/// edges, merging the last node of each contour back into its start
/// node.
///
/// `next_curve_index` runs across both input paths so that every
/// original curve gets a unique index for the intersection sweep.
pub(crate) fn collect_path(
    graph: &mut OpGraph,
    path: &Path,
    path_index: usize,
    next_curve_index: &mut usize,
) {
    for contour in path.contours() {
        if !contour.is_closed() {
            continue;
        }
        let Some(start) = contour.start_point() else {
            continue;
        };
        let mut current = start;
        let mut first_node = None;
        let mut last_node = None;

        for verb in contour.verbs() {
            let curve = match *verb {
                PathVerb::Move(p) => {
                    current = p;
                    continue;
                }
                PathVerb::Line(p) => CurveSegment::Line([current, p]),
                PathVerb::Quad(c, p) => CurveSegment::Quad([current, c, p]),
                PathVerb::Cubic(c1, c2, p) => CurveSegment::Cubic([current, c1, c2, p]),
                PathVerb::Conic { ctrl, end, weight } => CurveSegment::Conic {
                    points: [current, ctrl, end],
                    weight,
                },
                // An implicit line back to the start.
                PathVerb::Close => CurveSegment::Line([current, start]),
            };
            current = curve.end_point();

            // Zero-length leftovers (a close verb on an already-closed
            // contour, degenerate input segments) are dropped.
            if curve.is_tiny() && points_near(&curve.start_point(), &curve.end_point(), TOLERANCE) {
                continue;
            }

            let edge = graph.add_edge(curve, path_index, *next_curve_index);
            *next_curve_index += 1;
            if first_node.is_none() {
                first_node = Some(graph.edges[edge].start);
            }
            last_node = Some(graph.edges[edge].end);
        }

        if let (Some(first), Some(last)) = (first_node, last_node) {
            graph.merge_nodes(first, last);
        }
    }
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

    #[test]
    fn rect_collects_into_a_cycle() {
        let mut g = OpGraph::new();
        let mut next = 0;
        collect_path(&mut g, &rect(0.0, 0.0, 10.0, 10.0), 0, &mut next);
        assert_eq!(g.edges.len(), 4);
        assert_eq!(g.nodes.len(), 4);
        assert_eq!(next, 4);
        for (_, node) in &g.nodes {
            assert_eq!(node.edges.len(), 2);
        }
        g.validate();
    }

    #[test]
    fn open_contours_are_skipped() {
        let mut b = PathBuilder::new();
        b.move_to(p(0.0, 0.0));
        b.line_to(p(10.0, 0.0));
        let path = b.build();
        let mut g = OpGraph::new();
        let mut next = 0;
        collect_path(&mut g, &path, 0, &mut next);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn close_synthesizes_the_missing_line() {
        let mut b = PathBuilder::new();
        b.move_to(p(0.0, 0.0));
        b.line_to(p(10.0, 0.0));
        b.line_to(p(5.0, 8.0));
        b.close();
        let path = b.build();
        let mut g = OpGraph::new();
        let mut next = 0;
        collect_path(&mut g, &path, 0, &mut next);
        assert_eq!(g.edges.len(), 3);
        assert_eq!(g.nodes.len(), 3);
        g.validate();
    }

    #[test]
    fn curve_indices_continue_across_paths() {
        let mut g = OpGraph::new();
        let mut next = 0;
        collect_path(&mut g, &rect(0.0, 0.0, 10.0, 10.0), 0, &mut next);
        collect_path(&mut g, &rect(20.0, 0.0, 30.0, 10.0), 1, &mut next);
        assert_eq!(next, 8);
        let indices: Vec<usize> = g
            .edge_order
            .iter()
            .map(|&e| g.edges[e].curve_index)
            .collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }
}
