//! Room-level A* over the connectivity graph.
//!
//! Standard A* with a `BinaryHeap` (min-heap via reversed ordering).  Scores
//! and predecessors live in dense `Vec`s indexed by `NodeIdx` for O(1) access
//! and deterministic behavior — no hash maps in the inner loop.
//!
//! The heuristic is horizontal Euclidean distance between node centers
//! (admissible: every route is at least that long).  Edge cost routes through
//! the doorway/stairs entry point rather than center-to-center, which keeps
//! doorway crossings geometrically meaningful:
//!
//!   cost = dist(current center, entry point) + dist(entry point, target center)
//!
//! The search produces a goal→start hop sequence; local path reconstruction
//! (bnav-route) walks it in that order and reverses the finished path once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bnav_core::{AgentParams, DoorId, NavParams, NodeIdx, Point2};

use crate::building::DoorState;
use crate::error::{GraphError, GraphResult};
use crate::graph::{edge_entry, NavGraph};

// ── Query & result types ──────────────────────────────────────────────────────

/// Which vertical direction the caller would rather travel, when a choice of
/// connectors exists.  A bias, not a constraint: taking a connector against
/// the preference costs [`NavParams::against_dir_penalty`] extra.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VertPref {
    Up,
    Down,
}

/// Parameters for one room-level search.
pub struct RouteQuery<'a> {
    pub start: NodeIdx,
    pub goal: NodeIdx,
    pub agent: &'a AgentParams,
    /// When `false`, stairs/ramp nodes may not be traversed — unless one of
    /// them *is* the goal.
    pub allow_vertical: bool,
    pub pref_dir: Option<VertPref>,
    pub door_state: &'a dyn DoorState,
}

/// The doorway or connector entrance crossed between a hop and the next hop
/// toward the start.
#[derive(Copy, Clone, Debug)]
pub struct HopConn {
    pub pt: Point2,
    pub door: Option<DoorId>,
}

/// One node in the route, in goal→start order.
#[derive(Copy, Clone, Debug)]
pub struct Hop {
    pub node: NodeIdx,
    /// Crossing toward the start-side neighbor; `None` on the start hop.
    pub conn: Option<HopConn>,
}

/// Result of a successful room-level search: hops in goal→start order.
#[derive(Clone, Debug)]
pub struct NodeRoute {
    pub hops: Vec<Hop>,
    pub total_cost: f32,
}

// ── Open-set entry ────────────────────────────────────────────────────────────

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    node: NodeIdx,
    f_score: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.total_cmp(&other.f_score) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap; NodeIdx breaks f-score ties deterministically.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.0.cmp(&self.node.0))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Find the minimum-cost node sequence from `q.start` to `q.goal`.
///
/// Optimal under the chosen abstraction: the search terminates on the first
/// pop of the goal node, which with an admissible, consistent heuristic is
/// the cheapest route.  Open-set exhaustion means no route exists under the
/// current door state and connector policy.
pub fn find_node_route(
    graph: &NavGraph,
    params: &NavParams,
    q: &RouteQuery<'_>,
) -> GraphResult<NodeRoute> {
    let n = graph.node_count();
    if q.start == q.goal {
        return Ok(NodeRoute {
            hops: vec![Hop { node: q.start, conn: None }],
            total_cost: 0.0,
        });
    }

    let goal_center = graph.node(q.goal).bcube.center_xy();

    let mut g_score = vec![f32::INFINITY; n];
    let mut came_from: Vec<Option<(NodeIdx, HopConn)>> = vec![None; n];
    let mut closed = vec![false; n];

    g_score[q.start.index()] = 0.0;

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        node: q.start,
        f_score: graph.node(q.start).bcube.center_xy().dist(goal_center),
    });

    while let Some(OpenEntry { node: current, .. }) = open.pop() {
        if current == q.goal {
            return Ok(reconstruct(&came_from, q.start, q.goal, g_score[current.index()]));
        }
        if closed[current.index()] {
            continue;
        }
        closed[current.index()] = true;

        let cur_node = graph.node(current);
        let cur_center = cur_node.bcube.center_xy();
        let cur_g = g_score[current.index()];
        let cur_z = cur_node.floor_z();

        for edge in cur_node.conns() {
            let target = graph.node(edge.to);
            if closed[edge.to.index()] {
                continue;
            }
            // Connector policy: vertical nodes are off-limits unless allowed
            // or the connector itself is the destination.
            if target.is_connector() && !q.allow_vertical && edge.to != q.goal {
                continue;
            }
            if !graph.edge_passable(
                edge,
                q.door_state,
                cur_z,
                q.agent.can_open_doors,
                q.agent.has_key,
            ) {
                continue;
            }

            let entry = edge_entry(graph, current, edge);
            let mut step = cur_center.dist(entry) + entry.dist(target.bcube.center_xy());
            // Bias against connectors that head the wrong way.
            if target.is_connector() {
                if let Some(pref) = q.pref_dir {
                    let going_up = target.bcube.center().z > cur_node.bcube.center().z;
                    let against = match pref {
                        VertPref::Up => !going_up,
                        VertPref::Down => going_up,
                    };
                    if against {
                        step += params.against_dir_penalty;
                    }
                }
            }

            let tentative = cur_g + step;
            if tentative < g_score[edge.to.index()] {
                g_score[edge.to.index()] = tentative;
                came_from[edge.to.index()] = Some((
                    current,
                    HopConn { pt: entry, door: edge.door },
                ));
                open.push(OpenEntry {
                    node: edge.to,
                    f_score: tentative + target.bcube.center_xy().dist(goal_center),
                });
            }
        }
    }

    Err(GraphError::NoRoute { from: q.start, to: q.goal })
}

/// Walk predecessor links from the goal back to the start.  The hop list is
/// deliberately left in goal→start order — local reconstruction consumes it
/// that way and reverses the finished point path once at the end.
fn reconstruct(
    came_from: &[Option<(NodeIdx, HopConn)>],
    start: NodeIdx,
    goal: NodeIdx,
    total_cost: f32,
) -> NodeRoute {
    let mut hops = Vec::new();
    let mut current = goal;
    loop {
        match came_from[current.index()] {
            Some((prev, conn)) => {
                hops.push(Hop { node: current, conn: Some(conn) });
                current = prev;
            }
            None => {
                debug_assert_eq!(current, start, "predecessor chain must end at start");
                hops.push(Hop { node: current, conn: None });
                break;
            }
        }
    }
    NodeRoute { hops, total_cost }
}
