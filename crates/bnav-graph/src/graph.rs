//! The room connectivity graph.
//!
//! # Data layout
//!
//! Rooms and connectors reference each other bidirectionally, so the graph is
//! a flat arena of [`NavNode`]s addressed by [`NodeIdx`]; each node holds a
//! list of `(target index, ...)` edges.  No `Rc` cycles, trivial to discard
//! and rebuild.  Node ordering is fixed for the lifetime of a built graph:
//! rooms first (`NodeIdx(i)` == `RoomId(i)`), then stairwells, then the ramp
//! if the building has one.
//!
//! Every edge has a mirror edge at the target (the graph is undirected) and
//! duplicate edges to the same target are rejected at insertion time.

use bnav_core::{Axis, BCube, DoorId, NavParams, NodeIdx, Point2, RoomId};

use crate::building::{BuildingMap, DoorState, StairShape};

/// Tolerance for "these faces touch" tests during graph construction.
const ADJ_TOL: f32 = 1e-3;

// ── Nodes & edges ─────────────────────────────────────────────────────────────

/// Connector orientation, carried by stairwell and ramp nodes.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StairGeom {
    /// Axis the flights run along.
    pub dim: Axis,
    /// `true` if ascent moves toward +`dim` (first flight, for U-shapes).
    pub dir: bool,
    pub u_shaped: bool,
}

/// A doorway, hallway-adjacency, or stairs link between two nodes.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavEdge {
    pub to: NodeIdx,
    /// Door guarding this edge; `None` for open hallway adjacencies and
    /// doorless connectors.
    pub door: Option<DoorId>,
    /// Entry point for an upward traversal (the connector's lower entrance).
    /// Door edges store the doorway center in both fields.
    pub pt_up: Point2,
    /// Entry point for a downward traversal (the connector's upper entrance).
    pub pt_down: Point2,
}

/// One room or one vertical connector.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavNode {
    pub bcube: BCube,
    pub is_hallway: bool,
    pub has_exit: bool,
    pub is_stairs: bool,
    pub is_ramp: bool,
    /// Orientation, present iff the node is a connector.
    pub stairs: Option<StairGeom>,
    conns: Vec<NavEdge>,
}

impl NavNode {
    fn room_node(bcube: BCube, is_hallway: bool, has_exit: bool) -> Self {
        Self {
            bcube,
            is_hallway,
            has_exit,
            is_stairs: false,
            is_ramp: false,
            stairs: None,
            conns: Vec::new(),
        }
    }

    fn connector_node(bcube: BCube, geom: StairGeom, is_ramp: bool) -> Self {
        Self {
            bcube,
            is_hallway: false,
            has_exit: false,
            is_stairs: !is_ramp,
            is_ramp,
            stairs: Some(geom),
            conns: Vec::new(),
        }
    }

    /// `true` for stairwell and ramp nodes.
    #[inline]
    pub fn is_connector(&self) -> bool {
        self.is_stairs || self.is_ramp
    }

    pub fn conns(&self) -> &[NavEdge] {
        &self.conns
    }

    /// z of the node's walking surface (rooms) or base (connectors).
    #[inline]
    pub fn floor_z(&self) -> f32 {
        self.bcube.lo.z
    }
}

// ── NavGraph ──────────────────────────────────────────────────────────────────

/// Node/edge topology for one building.  Build with [`NavGraph::build`] (or
/// assemble by hand in tests via the `add_*` methods).
pub struct NavGraph {
    nodes: Vec<NavNode>,
    num_rooms: usize,
    num_stairs: usize,
    has_ramp: bool,
}

impl NavGraph {
    // ── Construction ──────────────────────────────────────────────────────

    /// Create an unconnected graph with the node arena laid out for `map`:
    /// one node per room, one per stairwell, one for the ramp if present.
    pub fn with_nodes(map: &BuildingMap) -> Self {
        let mut nodes =
            Vec::with_capacity(map.room_count() + map.stairwell_count() + 1);
        for r in map.rooms() {
            nodes.push(NavNode::room_node(r.bcube, r.is_hallway, r.has_exit));
        }
        for s in map.stairwells() {
            let geom = StairGeom {
                dim: s.dim,
                dir: s.dir,
                u_shaped: s.shape == StairShape::UShaped,
            };
            nodes.push(NavNode::connector_node(s.bcube, geom, false));
        }
        if let Some(ramp) = map.ramp() {
            let geom = StairGeom {
                dim: ramp.dim,
                dir: ramp.dir,
                u_shaped: false,
            };
            nodes.push(NavNode::connector_node(ramp.bcube, geom, true));
        }
        Self {
            nodes,
            num_rooms: map.room_count(),
            num_stairs: map.stairwell_count(),
            has_ramp: map.ramp().is_some(),
        }
    }

    /// Derive the full connectivity from the building geometry:
    /// interior doors link the two rooms incident on them, abutting hallways
    /// link doorlessly, and each stairwell/ramp links the rooms containing
    /// its bottom and top landings.
    pub fn build(map: &BuildingMap, params: &NavParams) -> Self {
        let mut g = Self::with_nodes(map);

        // Door edges.  A door touching exactly one room is an exterior door;
        // it contributes no edge (the room's has_exit flag records it).
        for (i, door) in map.doors().iter().enumerate() {
            let probe = door.bcube.expand_xy(ADJ_TOL);
            let rooms = map.rooms_touching(&probe);
            if let [a, b, ..] = rooms[..] {
                g.add_connection(
                    g.room_node(a),
                    g.room_node(b),
                    Some(DoorId(i as u32)),
                    &door.bcube,
                );
            }
        }

        // Doorless hallway adjacencies.
        for a in 0..map.room_count() {
            let ra = map.room(RoomId(a as u32));
            if !ra.is_hallway {
                continue;
            }
            for b in (a + 1)..map.room_count() {
                let rb = map.room(RoomId(b as u32));
                if !rb.is_hallway || !ra.bcube.intersects_z(&rb.bcube) {
                    continue;
                }
                for axis in [Axis::X, Axis::Y] {
                    if ra.bcube.abuts_xy(&rb.bcube, axis, ADJ_TOL) {
                        let shared = shared_face(&ra.bcube, &rb.bcube, axis);
                        g.add_connection(
                            g.room_node(RoomId(a as u32)),
                            g.room_node(RoomId(b as u32)),
                            None,
                            &shared,
                        );
                        break;
                    }
                }
            }
        }

        // Stairwell edges: attach the rooms containing the lower and upper
        // entrance points.
        for (i, s) in map.stairwells().iter().enumerate() {
            let conn = g.stairs_node(i);
            let geom = StairGeom {
                dim: s.dim,
                dir: s.dir,
                u_shaped: s.shape == StairShape::UShaped,
            };
            g.attach_connector(map, conn, geom, s.door, params.stairs_extend);
        }
        if let (Some(ramp), Some(conn)) = (map.ramp(), g.ramp_node()) {
            let geom = StairGeom {
                dim: ramp.dim,
                dir: ramp.dir,
                u_shaped: false,
            };
            g.attach_connector(map, conn, geom, None, params.stairs_extend);
        }

        g
    }

    fn attach_connector(
        &mut self,
        map: &BuildingMap,
        conn: NodeIdx,
        geom: StairGeom,
        door: Option<DoorId>,
        stairs_extend: f32,
    ) {
        let bc = self.nodes[conn.index()].bcube;
        let (lower, upper) = entry_points(&bc, geom, stairs_extend);
        // Probe just above each floor so the landing point falls inside the
        // right floor's room, not the slab between floors.
        let z_lo = bc.lo.z + 0.01 * bc.dz();
        let z_hi = bc.hi.z - 0.01 * bc.dz();
        if let Some(room) = map.room_at(lower.at_z(z_lo)) {
            self.add_stairs_connection(
                self.room_node(room),
                conn,
                geom.dim,
                geom.dir,
                geom.u_shaped,
                door,
                stairs_extend,
            );
        }
        if let Some(room) = map.room_at(upper.at_z(z_hi)) {
            self.add_stairs_connection(
                self.room_node(room),
                conn,
                geom.dim,
                geom.dir,
                geom.u_shaped,
                door,
                stairs_extend,
            );
        }
    }

    /// Link two nodes through a doorway or open adjacency.  Bidirectional and
    /// idempotent: a duplicate edge to the same target is ignored.
    pub fn add_connection(
        &mut self,
        a: NodeIdx,
        b: NodeIdx,
        door: Option<DoorId>,
        shared_bcube: &BCube,
    ) {
        let pt = shared_bcube.center_xy();
        self.add_edge_pair(a, b, door, pt, pt);
    }

    /// Link a room to a vertical connector.  Computes the two connector entry
    /// points — lower and upper — offset outward by `stairs_extend` in the
    /// direction away from the connector, giving agents a straight run-up.
    /// U-shaped stairs place both entries on the entrance end, on separate
    /// lanes; straight stairs place them on opposite ends.
    #[allow(clippy::too_many_arguments)]
    pub fn add_stairs_connection(
        &mut self,
        room: NodeIdx,
        connector: NodeIdx,
        dim: Axis,
        dir: bool,
        is_u_shaped: bool,
        door: Option<DoorId>,
        stairs_extend: f32,
    ) {
        let bc = self.nodes[connector.index()].bcube;
        let geom = StairGeom { dim, dir, u_shaped: is_u_shaped };
        let (pt_up, pt_down) = entry_points(&bc, geom, stairs_extend);
        self.add_edge_pair(room, connector, door, pt_up, pt_down);
    }

    fn add_edge_pair(
        &mut self,
        a: NodeIdx,
        b: NodeIdx,
        door: Option<DoorId>,
        pt_up: Point2,
        pt_down: Point2,
    ) {
        debug_assert_ne!(a, b, "self-edge");
        if self.nodes[a.index()].conns.iter().any(|e| e.to == b) {
            return; // duplicate — mirror edge exists too, by symmetry
        }
        self.nodes[a.index()].conns.push(NavEdge { to: b, door, pt_up, pt_down });
        self.nodes[b.index()].conns.push(NavEdge { to: a, door, pt_up, pt_down });
    }

    // ── Node access ───────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, idx: NodeIdx) -> &NavNode {
        &self.nodes[idx.index()]
    }

    pub fn room_count(&self) -> usize {
        self.num_rooms
    }

    /// Graph node for a room (identity mapping by construction).
    #[inline]
    pub fn room_node(&self, room: RoomId) -> NodeIdx {
        debug_assert!(room.index() < self.num_rooms);
        NodeIdx(room.0)
    }

    /// Graph node for the `i`-th stairwell.
    #[inline]
    pub fn stairs_node(&self, i: usize) -> NodeIdx {
        debug_assert!(i < self.num_stairs);
        NodeIdx((self.num_rooms + i) as u32)
    }

    /// Graph node for the ramp, if the building has one.
    #[inline]
    pub fn ramp_node(&self) -> Option<NodeIdx> {
        self.has_ramp
            .then(|| NodeIdx((self.num_rooms + self.num_stairs) as u32))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.conns.len()).sum::<usize>() / 2
    }

    // ── Door gating ───────────────────────────────────────────────────────

    /// Whether an agent with the given door capabilities can pass `edge` at
    /// floor height `z`.  Doorless edges are always passable.
    pub fn edge_passable(
        &self,
        edge: &NavEdge,
        door_state: &dyn DoorState,
        z: f32,
        can_open_doors: bool,
        has_key: bool,
    ) -> bool {
        let Some(door) = edge.door else {
            return true;
        };
        if door_state.is_open(door, z) {
            return true;
        }
        if !can_open_doors {
            return false;
        }
        !door_state.is_locked(door, z) || has_key
    }

    // ── Reachability queries ──────────────────────────────────────────────

    /// Unweighted BFS: `true` if a route exists from room `a` to room `b`
    /// using only edges the agent can pass.  O(nodes + edges); the cheap
    /// substitute for full A* when only a yes/no answer is needed.
    pub fn is_room_connected_to(
        &self,
        a: RoomId,
        b: RoomId,
        door_state: &dyn DoorState,
        z: f32,
        has_key: bool,
    ) -> bool {
        let start = self.room_node(a);
        let goal = self.room_node(b);
        if start == goal {
            return true;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = std::collections::VecDeque::new();
        seen[start.index()] = true;
        queue.push_back(start);
        while let Some(cur) = queue.pop_front() {
            for edge in &self.nodes[cur.index()].conns {
                if seen[edge.to.index()] {
                    continue;
                }
                if !self.edge_passable(edge, door_state, z, true, has_key) {
                    continue;
                }
                if edge.to == goal {
                    return true;
                }
                seen[edge.to.index()] = true;
                queue.push_back(edge.to);
            }
        }
        false
    }

    /// Number of connected components, ignoring door state.  Used for
    /// structural validation of generated buildings.
    pub fn count_connected_components(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = 0;
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(cur) = stack.pop() {
                for edge in &self.nodes[cur].conns {
                    if !seen[edge.to.index()] {
                        seen[edge.to.index()] = true;
                        stack.push(edge.to.index());
                    }
                }
            }
        }
        components
    }

    pub fn is_fully_connected(&self) -> bool {
        self.nodes.is_empty() || self.count_connected_components() == 1
    }
}

// ── Entry-point geometry ──────────────────────────────────────────────────────

/// Compute a connector's (lower, upper) entry points, each pushed
/// `stairs_extend` beyond the connector footprint so the agent gets a short
/// straight run-up before the first step.
fn entry_points(bc: &BCube, geom: StairGeom, stairs_extend: f32) -> (Point2, Point2) {
    let (lo, hi) = bc.span(geom.dim);
    let perp_center = match geom.dim {
        Axis::X => 0.5 * (bc.lo.y + bc.hi.y),
        Axis::Y => 0.5 * (bc.lo.x + bc.hi.x),
    };
    let mk = |along: f32, perp: f32| match geom.dim {
        Axis::X => Point2::new(along, perp),
        Axis::Y => Point2::new(perp, along),
    };

    if geom.u_shaped {
        // Entrance end is opposite the first flight's ascent; both entries
        // share it, one per lane.
        let end = if geom.dir { lo - stairs_extend } else { hi + stairs_extend };
        let (w_lo, w_hi) = bc.span(geom.dim.perp());
        let lane = 0.25 * (w_hi - w_lo);
        (mk(end, perp_center - lane), mk(end, perp_center + lane))
    } else {
        let (bottom, top) = if geom.dir {
            (lo - stairs_extend, hi + stairs_extend)
        } else {
            (hi + stairs_extend, lo - stairs_extend)
        };
        (mk(bottom, perp_center), mk(top, perp_center))
    }
}

/// The axis-aligned contact rectangle between two abutting room cubes; its
/// center is the doorless passage point.
fn shared_face(a: &BCube, b: &BCube, axis: Axis) -> BCube {
    let (a_lo, a_hi) = a.span(axis);
    let (b_lo, b_hi) = b.span(axis);
    // Face coordinate: whichever pair of opposing faces touch.
    let face = if (a_hi - b_lo).abs() <= ADJ_TOL { a_hi } else { a_lo.max(b_hi) };
    let p = axis.perp();
    let (pa_lo, pa_hi) = a.span(p);
    let (pb_lo, pb_hi) = b.span(p);
    let (o_lo, o_hi) = (pa_lo.max(pb_lo), pa_hi.min(pb_hi));
    let z_lo = a.lo.z.max(b.lo.z);
    let z_hi = a.hi.z.min(b.hi.z);
    match axis {
        Axis::X => BCube::new(face, o_lo, z_lo, face, o_hi, z_hi),
        Axis::Y => BCube::new(o_lo, face, z_lo, o_hi, face, z_hi),
    }
}

/// Entry point for traversing `edge` given the room-side floor height.
/// Door edges store the same point in both slots; connector edges pick the
/// entrance nearest the room's floor.
pub fn edge_entry(graph: &NavGraph, from: NodeIdx, edge: &NavEdge) -> Point2 {
    let a = graph.node(from);
    let b = graph.node(edge.to);
    let (room, conn) = if b.is_connector() {
        (a, b)
    } else if a.is_connector() {
        (b, a)
    } else {
        return edge.pt_up; // door edge: both slots equal
    };
    if room.bcube.center().z < conn.bcube.center().z {
        edge.pt_up
    } else {
        edge.pt_down
    }
}
