//! Detects and patches locally inconsistent classifications.
//!
//! Point-in-fill probes can land on the wrong side of a boundary when
//! geometry is thin or nearly tangent; the resulting misclassification
//! shows up as a parity or neighbor violation at a node. This pass finds
//! those nodes and re-derives the classification of nearby edges until
//! the violations disappear or the iteration budget runs out.

use super::classify::{fresh_classification, reclassify_edge};
use super::graph::{AreaClass, EdgeId, Inconsistency, NodeId, OpGraph};
use super::OpParams;

/// Checks every node and repairs inconsistent ones, best effort.
///
/// Nodes that cannot be repaired stay flagged; the operation still
/// produces output (the artifact is local to that node).
pub(crate) fn repair(graph: &mut OpGraph, params: &OpParams) {
    let mut worklist: Vec<NodeId> = Vec::new();
    let nodes = graph.node_order.clone();
    for node in nodes {
        let (boundaries, inconsistent) = check_node(graph, node);
        let n = &mut graph.nodes[node];
        n.boundaries = boundaries;
        n.inconsistent = inconsistent;
        if inconsistent.is_some() {
            worklist.push(node);
        }
    }

    // Every repair can re-enqueue its neighborhood; cap the total work
    // so pathological inputs terminate with a best-effort result.
    let mut budget = graph.edges.len() * 4 + 16;
    while let Some(node) = worklist.pop() {
        if budget == 0 {
            break;
        }
        budget -= 1;
        if !graph.nodes.contains_key(node) {
            continue;
        }
        let (boundaries, inconsistent) = check_node(graph, node);
        {
            let n = &mut graph.nodes[node];
            n.boundaries = boundaries;
            n.inconsistent = inconsistent;
        }
        let Some(kind) = inconsistent else {
            continue;
        };

        let repaired = match kind {
            Inconsistency::OddParity => repair_parity(graph, params, node, &mut worklist),
            Inconsistency::NeighborMismatch => false,
        };
        if !repaired {
            // Second chance: throw away everything derived around this
            // node and probe each incident edge from scratch.
            let incident = graph.nodes[node].edges.clone();
            for edge in incident {
                reclassify_edge(graph, edge, params);
                let far = graph.other_end(edge, node);
                worklist.push(far);
            }
        }
        let (boundaries, inconsistent) = check_node(graph, node);
        let n = &mut graph.nodes[node];
        n.boundaries = boundaries;
        n.inconsistent = inconsistent;
    }

    // Leave every node's stored state truthful for whoever inspects the
    // graph afterwards.
    let nodes = graph.node_order.clone();
    for node in nodes {
        let (boundaries, inconsistent) = check_node(graph, node);
        let n = &mut graph.nodes[node];
        n.boundaries = boundaries;
        n.inconsistent = inconsistent;
    }
}

/// Recomputes the consistency state of one node.
///
/// A consistent node has an even number of incident boundary edges, its
/// angle-adjacent edges agree on the classification of each wedge
/// between them, and none of its non-coincident edges claims to cross
/// the other path's boundary mid-curve.
pub(crate) fn check_node(graph: &OpGraph, node: NodeId) -> (usize, Option<Inconsistency>) {
    let incident = &graph.nodes[node].edges;
    let boundaries = incident
        .iter()
        .filter(|&&e| !graph.edges[e].interior)
        .count();
    if boundaries % 2 == 1 {
        return (boundaries, Some(Inconsistency::OddParity));
    }

    for &e in incident {
        let edge = &graph.edges[e];
        if !edge.coincides {
            let crosses_other = if edge.path_index == 0 {
                edge.left.second != edge.right.second
            } else {
                edge.left.first != edge.right.first
            };
            if crosses_other {
                return (boundaries, Some(Inconsistency::NeighborMismatch));
            }
        }
    }

    let len = incident.len();
    if len > 1 {
        for i in 0..len {
            let a = incident[i];
            let b = incident[(i + 1) % len];
            if graph.wedge_after(a, node) != graph.wedge_before(b, node) {
                return (boundaries, Some(Inconsistency::NeighborMismatch));
            }
        }
    }
    (boundaries, None)
}

/// Tries to fix an odd-parity node by finding a partner odd-parity node
/// and re-deriving the chain of edges between them.
///
/// A chain whose stored classification already matches a fresh probe is
/// not a candidate; the error must live elsewhere. As a fallback, a
/// direct neighbor in the odd-parity state gets the first incident
/// boundary edge between them toggled.
fn repair_parity(
    graph: &mut OpGraph,
    params: &OpParams,
    node: NodeId,
    worklist: &mut Vec<NodeId>,
) -> bool {
    let incident = graph.nodes[node].edges.clone();

    for &edge in &incident {
        let Some((chain, far)) = chain_to_junction(graph, node, edge) else {
            continue;
        };
        if check_node(graph, far).1 != Some(Inconsistency::OddParity) {
            continue;
        }
        if chain_is_consistent(graph, params, &chain) {
            continue;
        }
        for &e in &chain {
            reclassify_edge(graph, e, params);
        }
        worklist.push(far);
        if check_node(graph, node).1.is_none() {
            return true;
        }
    }

    // Single-hop fallback: force the parity by toggling one edge to a
    // neighboring odd node.
    for &edge in &incident {
        let far = graph.other_end(edge, node);
        if far == node {
            continue;
        }
        if check_node(graph, far).1 == Some(Inconsistency::OddParity) {
            toggle_interior(graph, edge);
            worklist.push(far);
            return check_node(graph, node).1.is_none();
        }
    }
    false
}

/// Walks from `node` along `edge` through two-valence nodes until a
/// junction. Returns `None` when the walk loops back to `node`.
fn chain_to_junction(
    graph: &OpGraph,
    node: NodeId,
    edge: EdgeId,
) -> Option<(Vec<EdgeId>, NodeId)> {
    let mut chain = vec![edge];
    let mut cur = edge;
    let mut at = graph.other_end(edge, node);
    let mut steps = graph.edges.len();
    while graph.nodes[at].edges.len() == 2 && steps > 0 {
        if at == node {
            return None;
        }
        let next = graph.other_edge(at, cur)?;
        chain.push(next);
        at = graph.other_end(next, at);
        cur = next;
        steps -= 1;
    }
    if at == node {
        return None;
    }
    Some((chain, at))
}

/// Whether every edge of the chain would be classified the same way by a
/// fresh probe.
fn chain_is_consistent(graph: &OpGraph, params: &OpParams, chain: &[EdgeId]) -> bool {
    chain.iter().all(|&e| {
        let (left, right) = fresh_classification(graph, e, params);
        let stored = &graph.edges[e];
        stored.left == left && stored.right == right
    })
}

/// Flips an edge between interior and boundary by adjusting one side's
/// combined class.
fn toggle_interior(graph: &mut OpGraph, edge: EdgeId) {
    let e = &mut graph.edges[edge];
    if e.interior {
        e.right.combined = match e.left.combined {
            AreaClass::In => AreaClass::Out,
            AreaClass::Out | AreaClass::Unknown => AreaClass::In,
        };
    } else {
        e.right.combined = e.left.combined;
    }
    e.interior = e.left.combined == e.right.combined;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::ops::{collect, split, PathOp};
    use crate::path::{FillRule, Path, PathBuilder};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
        let mut b = PathBuilder::new();
        b.add_rect(p(x0, y0), p(x1, y1));
        b.build()
    }

    fn build_graph(op: PathOp, first: &Path, second: Option<&Path>) -> (OpGraph, OpParams) {
        let params = OpParams {
            op,
            fill_rule: FillRule::NonZero,
            first: first.clone(),
            second: second.cloned(),
        };
        let mut g = OpGraph::new();
        let mut next = 0;
        collect::collect_path(&mut g, &params.first, 0, &mut next);
        if let Some(ref s) = params.second {
            collect::collect_path(&mut g, s, 1, &mut next);
        }
        split::split_edges(&mut g);
        g.purge_removed();
        super::super::classify::classify(&mut g, &params);
        g.compute_angles();
        g.sort_node_edges();
        (g, params)
    }

    fn inconsistent_count(g: &OpGraph) -> usize {
        g.node_order
            .iter()
            .filter(|&&n| g.nodes[n].inconsistent.is_some())
            .count()
    }

    #[test]
    fn clean_union_is_consistent() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let (mut g, params) = build_graph(PathOp::Union, &a, Some(&b));
        repair(&mut g, &params);
        assert_eq!(inconsistent_count(&g), 0);
    }

    #[test]
    fn injected_misclassification_is_repaired() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let (mut g, params) = build_graph(PathOp::Union, &a, Some(&b));
        // Sabotage one boundary edge.
        let victim = g
            .edge_order
            .iter()
            .copied()
            .find(|&e| !g.edges[e].interior)
            .unwrap();
        toggle_interior(&mut g, victim);
        repair(&mut g, &params);
        assert_eq!(inconsistent_count(&g), 0);
        assert!(!g.edges[victim].interior);
    }

    #[test]
    fn parity_detects_a_dangling_edge() {
        // A bare line has a single boundary edge at each endpoint.
        let mut g = OpGraph::new();
        let e = g.add_edge(
            crate::geometry::CurveSegment::Line([p(0.0, 0.0), p(10.0, 0.0)]),
            0,
            0,
        );
        let node = g.edges[e].start;
        let (boundaries, inconsistent) = check_node(&g, node);
        assert_eq!(boundaries, 1);
        assert_eq!(inconsistent, Some(Inconsistency::OddParity));
    }

    #[test]
    fn rectangle_grid_converges() {
        // A deterministic pile of overlapping rectangles, laid out so
        // that no two edges are collinear, must come out fully
        // consistent under every operator.
        let mut first = PathBuilder::new();
        first.add_rect(p(0.0, 0.0), p(17.0, 11.0));
        first.add_rect(p(20.5, 3.5), p(37.5, 14.5));
        first.add_rect(p(5.25, 18.25), p(22.25, 29.25));
        let mut second = PathBuilder::new();
        second.add_rect(p(8.5, 6.5), p(25.5, 17.5));
        second.add_rect(p(30.25, 9.75), p(47.25, 20.75));
        second.add_rect(p(12.75, 24.5), p(29.75, 35.5));
        let a = first.build();
        let b = second.build();
        for op in [PathOp::Union, PathOp::Intersection, PathOp::Difference, PathOp::Xor] {
            let (mut g, params) = build_graph(op, &a, Some(&b));
            repair(&mut g, &params);
            assert_eq!(inconsistent_count(&g), 0, "op {op:?}");
        }
    }
}
