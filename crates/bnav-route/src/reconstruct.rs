//! Local path reconstruction: expanding a room-level [`NodeRoute`] into a
//! concrete sequence of 3-D waypoints that respects agent radius and the
//! caller's obstacle list.
//!
//! The route arrives in goal→start order and the path is built in that order
//! too, then reversed once at the end.  Inside each room the doorway-to-doorway
//! segment is checked against the radius-expanded obstacle footprints; a
//! blocked segment triggers a randomized via-point search (single point first,
//! then pairs), seeded per agent/room/attempt so replanning after a failed
//! attempt explores different candidates.  Rooms flagged as open areas fall
//! back to the dense grid pathfinder when the via search gives up.

use bnav_core::{
    AgentId, AgentRng, Axis, BCube, NavParams, NodeIdx, Path, Point2, Point3, RoomId,
};
use bnav_graph::{BuildingMap, NavGraph, NavNode, NodeRoute};
use bnav_grid::DenseGrid;
use rustc_hash::FxHashMap;

use crate::error::{RouteError, RouteResult};

// ── Via-point search ──────────────────────────────────────────────────────────

/// Sampling counters for one room crossing, used by tests to verify the
/// single-before-double search order.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct ViaStats {
    pub single_tries: u32,
    pub double_tries: u32,
}

/// `true` if the segment `a`..`b` touches none of the keepout footprints.
fn segment_clear(keepouts: &[BCube], a: Point2, b: Point2) -> bool {
    keepouts.iter().all(|k| !k.segment_intersects_xy(a, b))
}

fn sample_in(rng: &mut AgentRng, w: &BCube) -> Point2 {
    Point2::new(
        rng.gen_range(w.lo.x..=w.hi.x),
        rng.gen_range(w.lo.y..=w.hi.y),
    )
}

/// Try to connect `from` and `to` inside `walkable`, writing any needed
/// intermediate points (in `from`→`to` order) into `vias`.
///
/// Straight line first; then up to `single_via_tries` random single via
/// points, keeping the shortest; then up to `double_via_tries` random pairs,
/// each tried in both orders.  Returns `false` if all of that fails.
pub(crate) fn connect_room_endpoints(
    rng: &mut AgentRng,
    nav: &NavParams,
    walkable: &BCube,
    keepouts: &[BCube],
    from: Point2,
    to: Point2,
    vias: &mut Vec<Point2>,
    stats: &mut ViaStats,
) -> bool {
    vias.clear();
    if segment_clear(keepouts, from, to) {
        return true;
    }

    let mut best: Option<(Point2, f32)> = None;
    for _ in 0..nav.single_via_tries {
        stats.single_tries += 1;
        let v = sample_in(rng, walkable);
        if segment_clear(keepouts, from, v) && segment_clear(keepouts, v, to) {
            let len = from.dist(v) + v.dist(to);
            if best.map_or(true, |(_, bl)| len < bl) {
                best = Some((v, len));
            }
        }
    }
    if let Some((v, _)) = best {
        vias.push(v);
        return true;
    }

    let mut best: Option<([Point2; 2], f32)> = None;
    for _ in 0..nav.double_via_tries {
        stats.double_tries += 1;
        let a = sample_in(rng, walkable);
        let b = sample_in(rng, walkable);
        for pair in [[a, b], [b, a]] {
            if segment_clear(keepouts, from, pair[0])
                && segment_clear(keepouts, pair[0], pair[1])
                && segment_clear(keepouts, pair[1], to)
            {
                let len = from.dist(pair[0]) + pair[0].dist(pair[1]) + pair[1].dist(to);
                if best.map_or(true, |(_, bl)| len < bl) {
                    best = Some((pair, len));
                }
            }
        }
    }
    if let Some((pair, _)) = best {
        vias.extend_from_slice(&pair);
        return true;
    }
    false
}

// ── Room geometry helpers ─────────────────────────────────────────────────────

/// The area of a room an agent center may occupy: the footprint shrunk by the
/// agent radius, with extra clearance on a hallway's narrow axis.
pub(crate) fn walkable_area(
    bc: &BCube,
    is_hallway: bool,
    radius: f32,
    hallway_margin: f32,
) -> BCube {
    let w = bc.shrink_xy(radius);
    if !is_hallway {
        return w;
    }
    let narrow = if bc.dx() < bc.dy() { Axis::X } else { Axis::Y };
    let c = w.center();
    match narrow {
        Axis::X => BCube {
            lo: Point3::new((w.lo.x + hallway_margin).min(c.x), w.lo.y, w.lo.z),
            hi: Point3::new((w.hi.x - hallway_margin).max(c.x), w.hi.y, w.hi.z),
        },
        Axis::Y => BCube {
            lo: Point3::new(w.lo.x, (w.lo.y + hallway_margin).min(c.y), w.lo.z),
            hi: Point3::new(w.hi.x, (w.hi.y - hallway_margin).max(c.y), w.hi.z),
        },
    }
}

/// Obstacles overlapping this room's footprint and floor slab.
fn room_obstacles(obstacles: &[BCube], bc: &BCube) -> Vec<BCube> {
    obstacles
        .iter()
        .filter(|o| o.intersects_xy(bc) && o.intersects_z(bc))
        .cloned()
        .collect()
}

fn room_keepouts(obstacles: &[BCube], bc: &BCube, radius: f32) -> Vec<BCube> {
    room_obstacles(obstacles, bc)
        .iter()
        .map(|o| o.expand_xy(radius))
        .collect()
}

fn clamp_to(w: &BCube, p: Point2) -> Point2 {
    Point2::new(p.x.clamp(w.lo.x, w.hi.x), p.y.clamp(w.lo.y, w.hi.y))
}

// ── Connector waypoints ───────────────────────────────────────────────────────

/// Fixed interior waypoints for one connector traversal, in upward walk
/// order.  Straight stairs/ramps get the two face points; U-shaped stairs add
/// the two landing turn points at mid-height, one per lane.
fn connector_waypoints(node: &NavNode, lower_z: f32, upper_z: f32) -> Vec<Point3> {
    let Some(geom) = node.stairs else {
        return Vec::new();
    };
    let bc = &node.bcube;
    let (lo, hi) = bc.span(geom.dim);
    let (p_lo, p_hi) = bc.span(geom.dim.perp());
    let perp_center = 0.5 * (p_lo + p_hi);
    let mk = |along: f32, perp: f32| match geom.dim {
        Axis::X => Point2::new(along, perp),
        Axis::Y => Point2::new(perp, along),
    };

    if geom.u_shaped {
        let lane = 0.25 * (p_hi - p_lo);
        let entrance = if geom.dir { lo } else { hi };
        // Landing turns sit just short of the far wall.
        let far = if geom.dir { hi - 0.5 * lane } else { lo + 0.5 * lane };
        let landing_z = 0.5 * (lower_z + upper_z);
        vec![
            mk(entrance, perp_center - lane).at_z(lower_z),
            mk(far, perp_center - lane).at_z(landing_z),
            mk(far, perp_center + lane).at_z(landing_z),
            mk(entrance, perp_center + lane).at_z(upper_z),
        ]
    } else {
        let (bottom, top) = if geom.dir { (lo, hi) } else { (hi, lo) };
        vec![
            mk(bottom, perp_center).at_z(lower_z),
            mk(top, perp_center).at_z(upper_z),
        ]
    }
}

// ── Reconstructor ─────────────────────────────────────────────────────────────

/// Everything one reconstruction pass needs; held mutably so the dense-grid
/// cache can be populated on first use.
pub(crate) struct Reconstructor<'a> {
    pub graph: &'a NavGraph,
    pub map: &'a BuildingMap,
    pub nav: &'a NavParams,
    pub obstacles: &'a [BCube],
    pub grids: &'a mut FxHashMap<NodeIdx, DenseGrid>,
    pub global_seed: u64,
    pub agent: AgentId,
    pub attempt: u32,
    pub radius: f32,
}

impl<'a> Reconstructor<'a> {
    /// Room flag lookup; connectors never fall back to the grid.
    fn is_open_area(&self, idx: NodeIdx) -> bool {
        idx.index() < self.graph.room_count() && self.map.room(RoomId(idx.0)).is_open_area
    }

    fn rng_for(&self, idx: NodeIdx) -> AgentRng {
        AgentRng::for_room_attempt(self.global_seed, self.agent, idx, self.attempt)
    }

    /// Grid path between two points on a room's floor, appended in `from`→`to`
    /// order.  The first point is skipped when the caller already pushed it.
    /// The grid searches on the floor plane, so when the true endpoint sits
    /// off that plane the caller supplies it in `exact_to` and it replaces
    /// the grid path's final point.
    fn grid_segment(
        &mut self,
        idx: NodeIdx,
        bc: &BCube,
        from: Point3,
        to: Point3,
        exact_to: Option<Point3>,
        skip_first: bool,
        path: &mut Path,
    ) -> RouteResult<()> {
        let grid = self.grids.entry(idx).or_insert_with(|| {
            DenseGrid::build(bc, &room_obstacles(self.obstacles, bc), self.radius)
        });
        let gp = bnav_grid::find_path(grid, from, to)?;
        let n = gp.len();
        for (k, p) in gp.iter().enumerate() {
            if k == 0 && skip_first {
                continue;
            }
            if k + 1 == n {
                path.push(exact_to.unwrap_or(*p));
            } else {
                path.push(*p);
            }
        }
        Ok(())
    }

    /// Cross an intermediate or start room from its goal-side endpoint
    /// (already on the path) to `to`.  Pushes via points only; returns whether
    /// the caller still needs to push `to` (the grid fallback pushes it).
    fn cross_room(
        &mut self,
        idx: NodeIdx,
        node: &'a NavNode,
        from: Point2,
        to: Point2,
        to_exact: Option<Point3>,
        allow_partial: bool,
        path: &mut Path,
    ) -> RouteResult<bool> {
        let z = node.floor_z();
        let walkable =
            walkable_area(&node.bcube, node.is_hallway, self.radius, self.nav.hallway_margin);
        let keepouts = room_keepouts(self.obstacles, &node.bcube, self.radius);

        let mut rng = self.rng_for(idx);
        let mut vias = Vec::new();
        let mut stats = ViaStats::default();
        if connect_room_endpoints(
            &mut rng, self.nav, &walkable, &keepouts, from, to, &mut vias, &mut stats,
        ) {
            for v in &vias {
                path.push(v.at_z(z));
            }
            return Ok(true);
        }

        if self.is_open_area(idx) {
            self.grid_segment(idx, &node.bcube, from.at_z(z), to.at_z(z), to_exact, true, path)?;
            return Ok(false);
        }
        if allow_partial {
            // First path after spawn: accept the straight leg even though it
            // clips something, rather than stranding the agent.
            return Ok(true);
        }
        Err(RouteError::Unnavigable { node: idx })
    }

    /// Pick and connect a destination point in the goal room, pushing the
    /// point and any vias.  Returns whether the caller still needs to push
    /// the exit endpoint.
    fn dest_segment(
        &mut self,
        idx: NodeIdx,
        node: &'a NavNode,
        exit: Point2,
        exit_exact: Option<Point3>,
        custom_goal: Option<Point3>,
        path: &mut Path,
    ) -> RouteResult<bool> {
        let z = node.floor_z();
        let walkable =
            walkable_area(&node.bcube, node.is_hallway, self.radius, self.nav.hallway_margin);
        let keepouts = room_keepouts(self.obstacles, &node.bcube, self.radius);

        // Default destination: the room center, nudged toward the part center
        // so L-shaped footprints do not aim into the notch.
        let (first, first_is_center) = match custom_goal {
            Some(g) => (clamp_to(&walkable, g.xy()), false),
            None => {
                let c = node.bcube.center_xy();
                let biased = if idx.index() < self.graph.room_count() {
                    let part = self.map.room(RoomId(idx.0)).part;
                    match self.map.part_center(part) {
                        Some(pc) => {
                            Point2::new(c.x + 0.1 * (pc.x - c.x), c.y + 0.1 * (pc.y - c.y))
                        }
                        None => c,
                    }
                } else {
                    c
                };
                (clamp_to(&walkable, biased), true)
            }
        };

        let mut rng = self.rng_for(idx);
        let mut vias = Vec::new();
        let mut stats = ViaStats::default();
        let mut chosen = None;
        for k in 0..self.nav.dest_retries {
            let cand = if k == 0 { first } else { sample_in(&mut rng, &walkable) };
            if connect_room_endpoints(
                &mut rng, self.nav, &walkable, &keepouts, cand, exit, &mut vias, &mut stats,
            ) {
                chosen = Some(cand);
                break;
            }
            // The center is the anchor the room-level search costed against;
            // if even it cannot reach the doorway, random points won't save
            // this attempt.
            if k == 0 && first_is_center {
                break;
            }
        }

        match chosen {
            Some(cand) => {
                path.push(cand.at_z(z));
                for v in &vias {
                    path.push(v.at_z(z));
                }
                Ok(true)
            }
            None if self.is_open_area(idx) => {
                self.grid_segment(
                    idx,
                    &node.bcube,
                    first.at_z(z),
                    exit.at_z(z),
                    exit_exact,
                    false,
                    path,
                )?;
                Ok(false)
            }
            None => Err(RouteError::Unnavigable { node: idx }),
        }
    }

    /// Expand `route` into waypoints ending at `agent_pos` (build order), then
    /// reverse so the agent walks start→goal.
    pub(crate) fn run(
        &mut self,
        route: &NodeRoute,
        agent_pos: Point3,
        custom_goal: Option<Point3>,
        first_path: bool,
    ) -> RouteResult<Path> {
        let graph = self.graph;
        let hops = &route.hops;
        debug_assert!(!hops.is_empty());
        let mut path = Path::with_capacity(hops.len() * 2 + 2);

        for (i, hop) in hops.iter().enumerate() {
            let node = graph.node(hop.node);
            let last = i + 1 == hops.len();

            if node.is_connector() && i > 0 && !last {
                // Fixed waypoints; the run-ups on either side are the crossing
                // points pushed by the neighboring room hops.
                let prev_floor = graph.node(hops[i - 1].node).floor_z();
                let next_floor = graph.node(hops[i + 1].node).floor_z();
                let (lower_z, upper_z) = if prev_floor < next_floor {
                    (prev_floor, next_floor)
                } else {
                    (next_floor, prev_floor)
                };
                let wps = connector_waypoints(node, lower_z, upper_z);
                if prev_floor > next_floor {
                    // Goal side is the upper floor; build order descends.
                    for p in wps.iter().rev() {
                        path.push(*p);
                    }
                } else {
                    for p in &wps {
                        path.push(*p);
                    }
                }
                if let Some(c) = hop.conn {
                    path.push(c.pt.at_z(next_floor));
                }
                continue;
            }

            // Crossing toward the start side; the start hop has none and the
            // segment runs to the agent instead.
            let to = hop.conn.map_or(agent_pos.xy(), |c| c.pt);

            let push_to = if i == 0 {
                let exit_exact = if last { Some(agent_pos) } else { None };
                self.dest_segment(hop.node, node, to, exit_exact, custom_goal, &mut path)?
            } else {
                // Every non-start hop carries a crossing, so hops[i-1].conn is
                // present for i >= 1.
                let from = hops[i - 1].conn.map_or(agent_pos.xy(), |c| c.pt);
                let to_exact = if last { Some(agent_pos) } else { None };
                self.cross_room(hop.node, node, from, to, to_exact, last && first_path, &mut path)?
            };

            if push_to {
                if last {
                    path.push(agent_pos);
                } else {
                    path.push(to.at_z(node.floor_z()));
                }
            }
        }

        path.reverse();
        Ok(path)
    }
}

// ── Same-room shortcut ────────────────────────────────────────────────────────

/// Connect two points inside a single room with no node route involved.
/// Used both for same-room queries and for re-completing an interrupted path.
pub(crate) fn within_room(
    rec: &mut Reconstructor<'_>,
    room: RoomId,
    from: Point3,
    to: Point3,
) -> RouteResult<Path> {
    let graph = rec.graph;
    let idx = NodeIdx(room.0);
    let node = graph.node(idx);
    let mut path = Path::with_capacity(4);

    // Build order runs goal→start, so the destination goes down first.
    path.push(to);
    if rec.cross_room(idx, node, to.xy(), from.xy(), Some(from), false, &mut path)? {
        path.push(from);
    }
    path.reverse();
    Ok(path)
}
