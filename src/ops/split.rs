//! Splits edges at their pairwise intersections.

use crate::geometry::{curve_intersect, Intersection};
use crate::math::{param_near, points_near, TOLERANCE};

use super::graph::{EdgeId, NodeId, OpGraph};

/// One forward sweep over the edge list, intersecting every eligible
/// pair and subdividing both edges at the found parameters.
///
/// The list grows while sweeping: split fragments are inserted right
/// after their parent and carry the parent's `curve_index` and
/// `intersect_next`, so each original curve pair is resolved exactly
/// once.
pub(crate) fn split_edges(graph: &mut OpGraph) {
    let mut i = 0;
    while i < graph.edge_order.len() {
        let e1 = graph.edge_order[i];
        if graph.edges[e1].curve.is_tiny() {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < graph.edge_order.len() {
            let e2 = graph.edge_order[j];
            j += 1;

            let skip = {
                let c1 = &graph.edges[e1];
                let c2 = &graph.edges[e2];
                c2.curve.is_tiny()
                    || c2.curve_index <= c1.intersect_next
                    || (c1.path_index == c2.path_index && c1.curve_index == c2.curve_index)
            };
            if skip {
                continue;
            }

            let hits = {
                let c1 = &graph.edges[e1];
                let c2 = &graph.edges[e2];
                curve_intersect(&c1.curve, &c2.curve)
            };
            // Fragments of either edge never need this pair again.
            let done = graph.edges[e2].curve_index;
            graph.edges[e1].intersect_next = done;

            if hits.is_empty() {
                continue;
            }
            if hits.len() == 1 && endpoints_already_joined(graph, e1, e2, &hits[0]) {
                continue;
            }
            apply_intersections(graph, e1, e2, hits);
        }
        i += 1;
    }
}

/// A single intersection sitting at a node both edges already share is
/// an existing junction, not a new crossing.
fn endpoints_already_joined(
    graph: &OpGraph,
    e1: EdgeId,
    e2: EdgeId,
    hit: &Intersection,
) -> bool {
    let n1 = endpoint_snap(graph, e1, hit.t1);
    let n2 = endpoint_snap(graph, e2, hit.t2);
    matches!((n1, n2), (Some(a), Some(b)) if a == b)
}

/// The node a split parameter lands on when it sits at, or snaps onto,
/// an endpoint of the edge.
///
/// The spatial check matters on short edges: a crossing whose parameter
/// is well away from 0 or 1 can still lie within node snapping distance
/// of an endpoint, and cutting there would collapse one fragment into a
/// tiny self-loop.
fn endpoint_snap(graph: &OpGraph, edge: EdgeId, t: f64) -> Option<NodeId> {
    let e = &graph.edges[edge];
    if param_near(t, 0.0) {
        return Some(e.start);
    }
    if param_near(t, 1.0) {
        return Some(e.end);
    }
    let cut = e.curve.point_at(t);
    if points_near(&cut, &graph.nodes[e.start].position, TOLERANCE) {
        return Some(e.start);
    }
    if points_near(&cut, &graph.nodes[e.end].position, TOLERANCE) {
        return Some(e.end);
    }
    None
}

/// Splits both edges at every intersection parameter.
///
/// The first edge is cut into a chain front to back, remembering which
/// node each parameter landed on; the second chain is then cut the same
/// way and each split node is merged with the matching one from the
/// first pass.
fn apply_intersections(
    graph: &mut OpGraph,
    e1: EdgeId,
    e2: EdgeId,
    mut hits: Vec<Intersection>,
) {
    hits.sort_by(|a, b| a.t1.partial_cmp(&b.t1).unwrap_or(std::cmp::Ordering::Equal));

    let mut splits: Vec<(NodeId, f64)> = Vec::with_capacity(hits.len());
    let mut cur = e1;
    let mut prev = 0.0;
    for hit in &hits {
        let local = renormalize(hit.t1, prev);
        let node = if let Some(joined) = endpoint_snap(graph, cur, local) {
            joined
        } else {
            let (right, mid) = split_edge(graph, cur, local);
            cur = right;
            prev = hit.t1;
            mid
        };
        splits.push((node, hit.t2));
    }

    splits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut cur = e2;
    let mut prev = 0.0;
    for k in 0..splits.len() {
        let (node, t2) = splits[k];
        let local = renormalize(t2, prev);
        let counterpart = if let Some(joined) = endpoint_snap(graph, cur, local) {
            joined
        } else {
            let (right, mid) = split_edge(graph, cur, local);
            cur = right;
            prev = t2;
            mid
        };
        if counterpart != node {
            // Keep the node from the first pass; later split entries may
            // reference the one going away.
            for later in splits.iter_mut().skip(k + 1) {
                if later.0 == counterpart {
                    later.0 = node;
                }
            }
            graph.merge_nodes(node, counterpart);
        }
    }
}

/// Maps a global parameter onto the remaining right fragment after a cut
/// at `prev`.
fn renormalize(t: f64, prev: f64) -> f64 {
    if prev >= 1.0 {
        1.0
    } else {
        ((t - prev) / (1.0 - prev)).clamp(0.0, 1.0)
    }
}

/// Cuts `edge` at local parameter `t`, keeping the left part in place
/// and inserting the right part after it. Returns the right fragment and
/// the node at the cut.
fn split_edge(graph: &mut OpGraph, edge: EdgeId, t: f64) -> (EdgeId, NodeId) {
    let (left, right) = graph.edges[edge].curve.split(t);
    let right_id = graph.insert_edge_after(edge, right);
    let mid = graph.edges[right_id].start;

    let old_end = graph.edges[edge].end;
    if old_end != mid {
        let incident = &mut graph.nodes[old_end].edges;
        if let Some(pos) = incident.iter().position(|&e| e == edge) {
            incident.remove(pos);
        }
        graph.edges[edge].end = mid;
        graph.nodes[mid].edges.push(edge);
    }
    graph.edges[edge].curve = left;
    (right_id, mid)
}
