//! Classifies edge sides against the combined fill of the operation.

use crate::math::{points_near, Point2, TOLERANCE};
use crate::path::Path;

use super::graph::{AreaClass, EdgeId, NodeId, OpGraph, SideInfo};
use super::{OpParams, PathOp};

/// Runs the full classification phase: collapse coincident edge pairs,
/// classify every remaining edge by probing, and spread results along
/// chains of two-valence nodes.
pub(crate) fn classify(graph: &mut OpGraph, params: &OpParams) {
    mark_coincident(graph);
    graph.purge_removed();

    let order = graph.edge_order.clone();
    for edge in order {
        if graph.edges[edge].left.combined != AreaClass::Unknown {
            continue;
        }
        reclassify_edge(graph, edge, params);
        propagate_from(graph, edge);
    }
}

/// Finds pairs of edges from different input paths tracing the same
/// geometry and keeps only one of each pair, flagged `coincides`.
fn mark_coincident(graph: &mut OpGraph) {
    let nodes = graph.node_order.clone();
    for node in nodes {
        let incident = graph.nodes[node].edges.clone();
        for (i, &a) in incident.iter().enumerate() {
            for &b in &incident[i + 1..] {
                let (ea, eb) = (&graph.edges[a], &graph.edges[b]);
                if ea.remove || eb.remove || ea.path_index == eb.path_index {
                    continue;
                }
                if std::mem::discriminant(&ea.curve) != std::mem::discriminant(&eb.curve) {
                    continue;
                }
                let aligned = ea.start == eb.start && ea.end == eb.end;
                let reversed = ea.start == eb.end && ea.end == eb.start;
                if !aligned && !reversed {
                    continue;
                }
                let mid_a = ea.curve.point_at(0.5);
                let mid_b = eb.curve.point_at(0.5);
                if !points_near(&mid_a, &mid_b, TOLERANCE) {
                    continue;
                }
                graph.edges[a].coincides = true;
                graph.edges[b].remove = true;
            }
        }
    }
}

/// Classifies one edge from scratch by point-in-fill probes.
///
/// The probe points sit half a unit off the curve midpoint,
/// perpendicular to the tangent; the edge's own path is always probed on
/// both sides, while the other path is tested once at the midpoint for
/// non-coincident edges (after splitting, an edge cannot cross the other
/// path's boundary mid-curve).
pub(crate) fn reclassify_edge(graph: &mut OpGraph, edge: EdgeId, params: &OpParams) {
    let (left, right) = fresh_classification(graph, edge, params);
    let e = &mut graph.edges[edge];
    e.left = left;
    e.right = right;
    e.interior = left.combined == right.combined;
}

/// Computes the classification an edge would get from probing, without
/// storing it.
pub(crate) fn fresh_classification(
    graph: &OpGraph,
    edge: EdgeId,
    params: &OpParams,
) -> (SideInfo, SideInfo) {
    let e = &graph.edges[edge];
    let pos = e.curve.point_at(0.5);
    let tan = e.curve.tangent_at(0.5);
    let left_probe = Point2::new(pos.x + tan.y / 2.0, pos.y - tan.x / 2.0);
    let right_probe = Point2::new(pos.x - tan.y / 2.0, pos.y + tan.x / 2.0);

    let probe = |path: &Path, p: &Point2| AreaClass::from_fill(path.in_fill(p, params.fill_rule));

    let (first_l, first_r) = if e.path_index == 0 || e.coincides {
        (
            probe(&params.first, &left_probe),
            probe(&params.first, &right_probe),
        )
    } else {
        let c = probe(&params.first, &pos);
        (c, c)
    };

    let (second_l, second_r) = match &params.second {
        None => (AreaClass::Out, AreaClass::Out),
        Some(second) => {
            if e.path_index == 1 || e.coincides {
                (probe(second, &left_probe), probe(second, &right_probe))
            } else {
                let c = probe(second, &pos);
                (c, c)
            }
        }
    };

    let left = SideInfo {
        first: first_l,
        second: second_l,
        combined: apply_op(params.op, first_l, second_l),
    };
    let right = SideInfo {
        first: first_r,
        second: second_r,
        combined: apply_op(params.op, first_r, second_r),
    };
    (left, right)
}

/// Truth table of the boolean operators over per-path membership.
fn apply_op(op: PathOp, a: AreaClass, b: AreaClass) -> AreaClass {
    let a = a.is_in();
    let b = b.is_in();
    let inside = match op {
        PathOp::Simplify => a,
        PathOp::Union => a || b,
        PathOp::Intersection => a && b,
        PathOp::Difference => a && !b,
        PathOp::Xor => a != b,
    };
    AreaClass::from_fill(inside)
}

/// Copies a classification along two-valence chains in both directions,
/// stopping at junctions or at already-classified edges.
fn propagate_from(graph: &mut OpGraph, edge: EdgeId) {
    for towards_end in [true, false] {
        let mut cur = edge;
        let mut node = if towards_end {
            graph.edges[cur].end
        } else {
            graph.edges[cur].start
        };
        let mut steps = graph.edges.len();
        while steps > 0 {
            steps -= 1;
            let Some(next) = graph.other_edge(node, cur) else {
                break;
            };
            if graph.edges[next].left.combined != AreaClass::Unknown {
                break;
            }
            copy_classification(graph, cur, next, node);
            node = graph.other_end(next, node);
            cur = next;
        }
    }
}

/// Copies edge classes across a shared node, flipping sides when the two
/// edges run in opposite directions through it.
fn copy_classification(graph: &mut OpGraph, from: EdgeId, to: EdgeId, node: NodeId) {
    let (left, right, interior) = {
        let f = &graph.edges[from];
        (f.left, f.right, f.interior)
    };
    let head_to_tail = (graph.edges[from].end == node && graph.edges[to].start == node)
        || (graph.edges[from].start == node && graph.edges[to].end == node);
    let e = &mut graph.edges[to];
    if head_to_tail {
        e.left = left;
        e.right = right;
    } else {
        e.left = right;
        e.right = left;
    }
    e.interior = interior;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::path::{FillRule, PathBuilder};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        let mut b = PathBuilder::new();
        b.add_rect(p(x0, y0), p(x1, y1));
        b.build()
    }

    fn params(op: PathOp, first: Path, second: Option<Path>) -> OpParams {
        OpParams {
            op,
            fill_rule: FillRule::NonZero,
            first,
            second,
        }
    }

    #[test]
    fn truth_table() {
        use AreaClass::{In, Out};
        assert_eq!(apply_op(PathOp::Union, In, Out), In);
        assert_eq!(apply_op(PathOp::Union, Out, Out), Out);
        assert_eq!(apply_op(PathOp::Intersection, In, Out), Out);
        assert_eq!(apply_op(PathOp::Intersection, In, In), In);
        assert_eq!(apply_op(PathOp::Difference, In, In), Out);
        assert_eq!(apply_op(PathOp::Difference, In, Out), In);
        assert_eq!(apply_op(PathOp::Xor, In, In), Out);
        assert_eq!(apply_op(PathOp::Xor, Out, In), In);
        assert_eq!(apply_op(PathOp::Simplify, In, Out), In);
        assert_eq!(apply_op(PathOp::Simplify, Out, In), Out);
    }

    #[test]
    fn simplify_square_edges_are_boundary() {
        let path = rect(0.0, 0.0, 10.0, 10.0);
        let prm = params(PathOp::Simplify, path.clone(), None);
        let mut g = OpGraph::new();
        let mut next = 0;
        super::super::collect::collect_path(&mut g, &path, 0, &mut next);
        classify(&mut g, &prm);
        for (_, e) in &g.edges {
            assert!(!e.interior);
            assert_ne!(e.left.combined, e.right.combined);
        }
    }

    #[test]
    fn union_hides_edges_inside_the_other_square() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let prm = params(PathOp::Union, a.clone(), Some(b.clone()));
        let mut g = OpGraph::new();
        let mut next = 0;
        super::super::collect::collect_path(&mut g, &a, 0, &mut next);
        super::super::collect::collect_path(&mut g, &b, 1, &mut next);
        super::super::split::split_edges(&mut g);
        g.purge_removed();
        classify(&mut g, &prm);

        let mut interior = 0;
        let mut boundary = 0;
        for (_, e) in &g.edges {
            if e.interior {
                interior += 1;
            } else {
                boundary += 1;
            }
        }
        // Each square contributes 2 whole outer edges plus 2 split ones
        // (4 fragments), of which one fragment each lies inside the other
        // square.
        assert_eq!(interior, 4);
        assert_eq!(boundary, 8);
    }

    #[test]
    fn coincident_edges_collapse_to_one() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let prm = params(PathOp::Union, a.clone(), Some(a.clone()));
        let mut g = OpGraph::new();
        let mut next = 0;
        super::super::collect::collect_path(&mut g, &a, 0, &mut next);
        super::super::collect::collect_path(&mut g, &a, 1, &mut next);
        super::super::split::split_edges(&mut g);
        g.purge_removed();
        classify(&mut g, &prm);
        assert_eq!(g.edges.len(), 4);
        for (_, e) in &g.edges {
            assert!(e.coincides);
            assert!(!e.interior);
        }
    }

    #[test]
    fn propagation_covers_chain_fragments() {
        // One long edge split by nothing still propagates over the chain
        // of curves in a circle approximation.
        let mut b = PathBuilder::new();
        b.add_circle(p(0.0, 0.0), 5.0);
        let path = b.build();
        let prm = params(PathOp::Simplify, path.clone(), None);
        let mut g = OpGraph::new();
        let mut next = 0;
        super::super::collect::collect_path(&mut g, &path, 0, &mut next);
        classify(&mut g, &prm);
        for (_, e) in &g.edges {
            assert_ne!(e.left.combined, AreaClass::Unknown);
            assert_ne!(e.right.combined, AreaClass::Unknown);
        }
    }
}
