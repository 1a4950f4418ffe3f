//! Walks the classified graph and emits the result contours.

use crate::path::{Path, PathBuilder};

use super::graph::{angles_near, AreaClass, EdgeId, NodeId, OpGraph};

/// Collects every boundary edge into closed output contours.
///
/// Each contour starts at an arbitrary uncollected boundary edge,
/// oriented so the inside of the result lies to its left, then always
/// turns the same way at junctions: the next edge is the angular
/// neighbor of the incoming one on the inside. Contours that fail to
/// close (a repair leftover) are dropped from the output.
pub(crate) fn reassemble(graph: &mut OpGraph) -> Path {
    let mut builder = PathBuilder::new();

    loop {
        let Some(seed) = next_seed(graph) else {
            break;
        };
        if graph.edges[seed].left.combined == AreaClass::Out {
            graph.reverse_edge(seed);
        }

        let contour_start = graph.edges[seed].start;
        builder.move_to(graph.edges[seed].curve.start_point());

        let mut cur = seed;
        let mut guard = graph.edge_order.len() + 1;
        loop {
            graph.edges[cur].collected = true;
            builder.segment_to(&graph.edges[cur].curve);

            let at = graph.edges[cur].end;
            if at == contour_start {
                builder.close();
                break;
            }
            guard -= 1;
            if guard == 0 {
                break;
            }
            let Some(next) = find_next(graph, at, cur) else {
                break;
            };
            if graph.edges[next].end == at {
                graph.reverse_edge(next);
            }
            cur = next;
        }
    }

    builder.build().without_open_contours()
}

fn next_seed(graph: &OpGraph) -> Option<EdgeId> {
    graph
        .edge_order
        .iter()
        .copied()
        .find(|&e| !graph.edges[e].collected && !graph.edges[e].interior)
}

/// Picks the edge to continue with at node `at`, having arrived along
/// `incoming`.
///
/// Scanning starts at the incoming edge's slot in the angle-sorted list
/// and proceeds towards the side the inside is on, so the walk hugs the
/// result region. An edge leaving at the same angle as the incoming one
/// doubles back along coincident geometry and is only used when nothing
/// else is available.
fn find_next(graph: &OpGraph, at: NodeId, incoming: EdgeId) -> Option<EdgeId> {
    let incident = &graph.nodes[at].edges;
    let len = incident.len();
    let idx = incident.iter().position(|&e| e == incoming)?;

    let dir = if graph.edges[incoming].left.combined == AreaClass::In {
        len - 1
    } else {
        1
    };

    let incoming_angle = graph.edge_angle_at(incoming, at);
    let mut fallback = None;
    for d in 0..len {
        let cand = incident[(idx + dir * (d + 1)) % len];
        let e = &graph.edges[cand];
        if e.collected || e.interior {
            continue;
        }
        if angles_near(graph.edge_angle_at(cand, at), incoming_angle) {
            if fallback.is_none() {
                fallback = Some(cand);
            }
            continue;
        }
        return Some(cand);
    }
    fallback
}
