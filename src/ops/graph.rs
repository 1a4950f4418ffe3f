use std::cmp::Ordering;

use slotmap::{new_key_type, SlotMap};

use crate::geometry::CurveSegment;
use crate::math::{points_near, Point2, TOLERANCE};

new_key_type! {
    /// Identifier of a node in the operation graph.
    pub(crate) struct NodeId;
    /// Identifier of an edge in the operation graph.
    pub(crate) struct EdgeId;
}

/// Angles closer than this (in radians) are considered equal when
/// ordering edges around a node.
const ANGLE_EPS: f64 = 0.01;

/// Classification of a region relative to an input path's fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum AreaClass {
    #[default]
    Unknown,
    In,
    Out,
}

impl AreaClass {
    pub(crate) fn is_in(self) -> bool {
        matches!(self, Self::In)
    }

    pub(crate) fn from_fill(inside: bool) -> Self {
        if inside {
            Self::In
        } else {
            Self::Out
        }
    }
}

/// Area classification of one side of an edge: with respect to the
/// first input path, the second one, and the combined result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SideInfo {
    pub first: AreaClass,
    pub second: AreaClass,
    pub combined: AreaClass,
}

/// Why a node failed its local consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inconsistency {
    /// The node has an odd number of boundary edges.
    OddParity,
    /// Angle-adjacent edges disagree about the region between them.
    NeighborMismatch,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub position: Point2,
    /// Incident edges, sorted by angle once [`OpGraph::sort_node_edges`]
    /// has run.
    pub edges: Vec<EdgeId>,
    pub inconsistent: Option<Inconsistency>,
    /// Number of incident non-interior edges.
    pub boundaries: usize,
}

#[derive(Debug)]
pub(crate) struct Edge {
    pub curve: CurveSegment,
    pub start: NodeId,
    pub end: NodeId,
    pub left: SideInfo,
    pub right: SideInfo,
    /// Edges inside the result do not appear in the output.
    pub interior: bool,
    /// Set when another edge of the other path traces the same geometry.
    pub coincides: bool,
    /// Set while the edge has been picked up by contour reassembly.
    pub collected: bool,
    /// Scheduled for deletion.
    pub remove: bool,
    /// Direction angle leaving the start node.
    pub start_angle: f64,
    /// Direction angle leaving the end node (against the edge direction).
    pub end_angle: f64,
    /// 0 for the first input path, 1 for the second.
    pub path_index: usize,
    /// Position of the originating curve within the input, used to order
    /// the intersection sweep.
    pub curve_index: usize,
    /// Intersections against curves up to this index are already done.
    pub intersect_next: usize,
}

/// The planar graph a boolean operation works on.
///
/// Nodes and edges live in generational arenas; `edge_order` and
/// `node_order` keep deterministic iteration orders, with splits placing
/// fragments right after their parent.
#[derive(Debug, Default)]
pub(crate) struct OpGraph {
    pub nodes: SlotMap<NodeId, Node>,
    pub edges: SlotMap<EdgeId, Edge>,
    pub edge_order: Vec<EdgeId>,
    pub node_order: Vec<NodeId>,
}

impl OpGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the node at `position`, reusing an existing node within
    /// the snapping tolerance.
    pub(crate) fn add_node(&mut self, position: Point2) -> NodeId {
        for &id in &self.node_order {
            if points_near(&self.nodes[id].position, &position, TOLERANCE) {
                return id;
            }
        }
        let id = self.nodes.insert(Node {
            position,
            edges: Vec::new(),
            inconsistent: None,
            boundaries: 0,
        });
        self.node_order.push(id);
        id
    }

    /// Adds an edge for `curve`, snapping its endpoints onto nodes.
    pub(crate) fn add_edge(
        &mut self,
        curve: CurveSegment,
        path_index: usize,
        curve_index: usize,
    ) -> EdgeId {
        let start = self.add_node(curve.start_point());
        let end = self.add_node(curve.end_point());
        let id = self.edges.insert(Edge {
            curve,
            start,
            end,
            left: SideInfo::default(),
            right: SideInfo::default(),
            interior: false,
            coincides: false,
            collected: false,
            remove: false,
            start_angle: 0.0,
            end_angle: 0.0,
            path_index,
            curve_index,
            intersect_next: 0,
        });
        self.edge_order.push(id);
        self.nodes[start].edges.push(id);
        self.nodes[end].edges.push(id);
        id
    }

    /// Inserts a split fragment of `parent` directly after it in the
    /// sweep order.
    pub(crate) fn insert_edge_after(&mut self, parent: EdgeId, curve: CurveSegment) -> EdgeId {
        let (path_index, curve_index, intersect_next) = {
            let p = &self.edges[parent];
            (p.path_index, p.curve_index, p.intersect_next)
        };
        let id = self.add_edge(curve, path_index, curve_index);
        self.edges[id].intersect_next = intersect_next;
        // add_edge appended at the back; move into place.
        self.edge_order.pop();
        if let Some(pos) = self.edge_order.iter().position(|&e| e == parent) {
            self.edge_order.insert(pos + 1, id);
        } else {
            self.edge_order.push(id);
        }
        id
    }

    /// Merges `drop` into `keep`, re-pointing all incident edges.
    ///
    /// Edges that collapse into a tiny self-loop are scheduled for
    /// removal.
    pub(crate) fn merge_nodes(&mut self, keep: NodeId, drop: NodeId) {
        if keep == drop {
            return;
        }
        let moved = std::mem::take(&mut self.nodes[drop].edges);
        for &eid in &moved {
            let edge = &mut self.edges[eid];
            if edge.start == drop {
                edge.start = keep;
            }
            if edge.end == drop {
                edge.end = keep;
            }
            if edge.start == edge.end && edge.curve.is_tiny() {
                edge.remove = true;
            }
        }
        self.nodes[keep].edges.extend(moved);
        self.node_order.retain(|&n| n != drop);
        self.nodes.remove(drop);
    }

    /// Reverses the direction of an edge in place.
    pub(crate) fn reverse_edge(&mut self, id: EdgeId) {
        let edge = &mut self.edges[id];
        edge.curve = edge.curve.reverse();
        std::mem::swap(&mut edge.start, &mut edge.end);
        std::mem::swap(&mut edge.left, &mut edge.right);
        std::mem::swap(&mut edge.start_angle, &mut edge.end_angle);
    }

    /// Deletes all edges marked for removal, then drops nodes that lost
    /// all their edges.
    pub(crate) fn purge_removed(&mut self) {
        let doomed: Vec<EdgeId> = self
            .edge_order
            .iter()
            .copied()
            .filter(|&e| self.edges[e].remove)
            .collect();
        for eid in doomed {
            let (start, end) = {
                let e = &self.edges[eid];
                (e.start, e.end)
            };
            self.nodes[start].edges.retain(|&e| e != eid);
            if end != start {
                self.nodes[end].edges.retain(|&e| e != eid);
            }
            self.edge_order.retain(|&e| e != eid);
            self.edges.remove(eid);
        }
        let empty: Vec<NodeId> = self
            .node_order
            .iter()
            .copied()
            .filter(|&n| self.nodes[n].edges.is_empty())
            .collect();
        for nid in empty {
            self.node_order.retain(|&n| n != nid);
            self.nodes.remove(nid);
        }
    }

    /// Computes direction angles at both ends of every edge.
    ///
    /// Angles are measured with the y axis flipped so that increasing
    /// angle walks counter-clockwise on screen.
    pub(crate) fn compute_angles(&mut self) {
        for &id in &self.edge_order {
            let edge = &mut self.edges[id];
            let t0 = edge.curve.start_tangent();
            let t1 = -edge.curve.end_tangent();
            edge.start_angle = (-t0.y).atan2(t0.x);
            edge.end_angle = (-t1.y).atan2(t1.x);
        }
    }

    /// The angle of `edge` as seen from `node`.
    pub(crate) fn edge_angle_at(&self, edge: EdgeId, node: NodeId) -> f64 {
        let e = &self.edges[edge];
        if e.start == node {
            e.start_angle
        } else {
            e.end_angle
        }
    }

    /// Secondary sort key for edges that leave a node at the same angle:
    /// the direction towards a sample point taken a little way along the
    /// curve, so that curves sharing a tangent are ordered by how they
    /// bend.
    fn turning_angle(&self, edge: EdgeId, node: NodeId) -> f64 {
        let e = &self.edges[edge];
        let t = match e.curve {
            CurveSegment::Cubic(_) => {
                if e.start == node {
                    0.333
                } else {
                    0.666
                }
            }
            _ => 0.5,
        };
        let sample = e.curve.point_at(t);
        let origin = self.nodes[node].position;
        (-(sample.y - origin.y)).atan2(sample.x - origin.x)
    }

    /// Sorts the incident edges of every node by angle.
    pub(crate) fn sort_node_edges(&mut self) {
        let order = self.node_order.clone();
        for node in order {
            let mut incident = std::mem::take(&mut self.nodes[node].edges);
            incident.sort_by(|&a, &b| {
                let fa = self.edge_angle_at(a, node);
                let fb = self.edge_angle_at(b, node);
                if angles_near(fa, fb) {
                    let ta = self.turning_angle(a, node);
                    let tb = self.turning_angle(b, node);
                    ta.partial_cmp(&tb).unwrap_or(Ordering::Equal)
                } else {
                    fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
                }
            });
            self.nodes[node].edges = incident;
        }
    }

    /// The endpoint of `edge` other than `node`.
    pub(crate) fn other_end(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let e = &self.edges[edge];
        if e.start == node {
            e.end
        } else {
            e.start
        }
    }

    /// For a node with exactly two incident edges, the one that is not
    /// `edge`.
    pub(crate) fn other_edge(&self, node: NodeId, edge: EdgeId) -> Option<EdgeId> {
        let incident = &self.nodes[node].edges;
        if incident.len() != 2 {
            return None;
        }
        incident.iter().copied().find(|&e| e != edge)
    }

    /// The side classification of `edge` facing the wedge that follows it
    /// counter-clockwise around `node`.
    pub(crate) fn wedge_after(&self, edge: EdgeId, node: NodeId) -> SideInfo {
        let e = &self.edges[edge];
        if e.end == node {
            e.right
        } else {
            e.left
        }
    }

    /// The side classification of `edge` facing the wedge that precedes
    /// it counter-clockwise around `node`.
    pub(crate) fn wedge_before(&self, edge: EdgeId, node: NodeId) -> SideInfo {
        let e = &self.edges[edge];
        if e.end == node {
            e.left
        } else {
            e.right
        }
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) {
        assert_eq!(self.edge_order.len(), self.edges.len());
        assert_eq!(self.node_order.len(), self.nodes.len());
        for (id, edge) in &self.edges {
            assert!(self.nodes[edge.start].edges.contains(&id));
            assert!(self.nodes[edge.end].edges.contains(&id));
        }
        for (id, node) in &self.nodes {
            for &eid in &node.edges {
                let e = &self.edges[eid];
                assert!(e.start == id || e.end == id);
            }
        }
    }
}

/// Whether two angles are equal up to [`ANGLE_EPS`], accounting for
/// wrap-around at `±2π`.
pub(crate) fn angles_near(f1: f64, f2: f64) -> bool {
    let d = (f1 - f2).rem_euclid(std::f64::consts::TAU);
    d < ANGLE_EPS || d > std::f64::consts::TAU - ANGLE_EPS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn line(a: Point2, b: Point2) -> CurveSegment {
        CurveSegment::Line([a, b])
    }

    #[test]
    fn nearby_endpoints_share_a_node() {
        let mut g = OpGraph::new();
        let e1 = g.add_edge(line(p(0.0, 0.0), p(10.0, 0.0)), 0, 0);
        let e2 = g.add_edge(line(p(10.0, 0.005), p(10.0, 10.0)), 0, 1);
        assert_eq!(g.edges[e1].end, g.edges[e2].start);
        assert_eq!(g.nodes.len(), 3);
        g.validate();
    }

    #[test]
    fn merge_repoints_edges() {
        let mut g = OpGraph::new();
        let e = g.add_edge(line(p(0.0, 0.0), p(10.0, 0.0)), 0, 0);
        let a = g.add_node(p(20.0, 0.0));
        let end = g.edges[e].end;
        g.merge_nodes(a, end);
        assert_eq!(g.edges[e].end, a);
        assert!(!g.edges[e].remove);
        g.validate();
    }

    #[test]
    fn merge_marks_tiny_self_loop() {
        let mut g = OpGraph::new();
        let e = g.add_edge(line(p(0.0, 0.0), p(0.002, 0.0)), 0, 0);
        let (s, t) = (g.edges[e].start, g.edges[e].end);
        assert_ne!(s, t);
        g.merge_nodes(s, t);
        assert!(g.edges[e].remove);
        g.purge_removed();
        assert!(g.edges.is_empty());
        assert!(g.nodes.is_empty());
        g.validate();
    }

    #[test]
    fn reverse_swaps_everything() {
        let mut g = OpGraph::new();
        let e = g.add_edge(line(p(0.0, 0.0), p(10.0, 5.0)), 0, 0);
        g.compute_angles();
        let (s, t) = (g.edges[e].start, g.edges[e].end);
        let (sa, ea) = (g.edges[e].start_angle, g.edges[e].end_angle);
        g.reverse_edge(e);
        assert_eq!(g.edges[e].start, t);
        assert_eq!(g.edges[e].end, s);
        assert!((g.edges[e].start_angle - ea).abs() < 1e-12);
        assert!((g.edges[e].end_angle - sa).abs() < 1e-12);
    }

    #[test]
    fn edges_sorted_by_angle() {
        let mut g = OpGraph::new();
        // Four spokes leaving the origin towards +x, up, -x, down
        // (screen coordinates, y grows downwards).
        let east = g.add_edge(line(p(0.0, 0.0), p(10.0, 0.0)), 0, 0);
        let north = g.add_edge(line(p(0.0, 0.0), p(0.0, -10.0)), 0, 1);
        let west = g.add_edge(line(p(0.0, 0.0), p(-10.0, 0.0)), 0, 2);
        let south = g.add_edge(line(p(0.0, 0.0), p(0.0, 10.0)), 0, 3);
        g.compute_angles();
        g.sort_node_edges();
        let center = g.edges[east].start;
        let sorted = &g.nodes[center].edges;
        // Ascending angle: south (-pi/2), east (0), north (pi/2), west (pi).
        assert_eq!(sorted.as_slice(), &[south, east, north, west]);
    }

    #[test]
    fn angle_wraparound_near() {
        use std::f64::consts::PI;
        assert!(angles_near(PI - 0.001, -PI + 0.001));
        assert!(angles_near(0.0, 0.005));
        assert!(!angles_near(0.0, 0.5));
    }
}
