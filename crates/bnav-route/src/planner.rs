//! The top-level route planner: owns the graph cache and the per-room dense
//! grids, and exposes the whole pipeline (room-level A* → local
//! reconstruction) behind point-to-point and room-to-room queries.

use bnav_core::{AgentId, AgentParams, BCube, NavParams, NodeIdx, Path, Point3, RoomId};
use bnav_graph::{find_node_route, BuildingMap, DoorState, GraphCache, NavGraph, RouteQuery, VertPref};
use bnav_grid::DenseGrid;
use rustc_hash::FxHashMap;

use crate::error::{RouteError, RouteResult};
use crate::reconstruct::{within_room, Reconstructor};

/// Floors whose z differs by less than this count as the same floor.
const FLOOR_TOL: f32 = 1e-3;

// ── AgentState ────────────────────────────────────────────────────────────────

/// Per-agent planning state carried across queries.  The caller owns it,
/// bumps `path_attempt` whenever a returned path proves unusable and a fresh
/// one is requested, and clears `first_path` once the agent completes a path.
#[derive(Copy, Clone, Debug)]
pub struct AgentState {
    pub id: AgentId,
    pub pos: Point3,
    pub params: AgentParams,
    /// Diversifies the via-point RNG streams between retries.
    pub path_attempt: u32,
    /// While set, the start-room segment may be returned even if it clips an
    /// obstacle, so a badly spawned agent can still get moving.
    pub first_path: bool,
}

impl AgentState {
    pub fn new(id: AgentId, pos: Point3) -> Self {
        Self {
            id,
            pos,
            params: AgentParams::default(),
            path_attempt: 0,
            first_path: true,
        }
    }
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// One planner serves all agents in a building; agents differ only through
/// the [`AgentState`] passed per query.  Dense grids are built lazily per
/// open-area room and reused until the planner is dropped.
pub struct RoutePlanner {
    nav: NavParams,
    global_seed: u64,
    graph: GraphCache,
    grids: FxHashMap<NodeIdx, DenseGrid>,
}

impl RoutePlanner {
    pub fn new(global_seed: u64) -> Self {
        Self::with_params(NavParams::default(), global_seed)
    }

    pub fn with_params(nav: NavParams, global_seed: u64) -> Self {
        Self {
            nav,
            global_seed,
            graph: GraphCache::new(),
            grids: FxHashMap::default(),
        }
    }

    pub fn nav_params(&self) -> &NavParams {
        &self.nav
    }

    /// Mark the cached connectivity graph stale after a geometry or door
    /// *topology* change; it is rebuilt on the next query.  Pure door *state*
    /// flips (open/closed/locked) do not require this — they are read live
    /// through the [`DoorState`] passed with each query.
    pub fn invalidate_graph(&self) {
        self.graph.invalidate();
    }

    /// The current connectivity graph, building it if absent or stale.
    pub fn build_graph(&mut self, map: &BuildingMap) -> &NavGraph {
        self.graph.get_or_build(map, &self.nav)
    }

    /// Room-to-room reachability for one agent under the given door state.
    pub fn is_room_connected_to(
        &mut self,
        map: &BuildingMap,
        from: RoomId,
        to: RoomId,
        door_state: &dyn DoorState,
        z: f32,
        has_key: bool,
    ) -> bool {
        self.build_graph(map).is_room_connected_to(from, to, door_state, z, has_key)
    }

    /// Number of connected components, ignoring door state.
    pub fn count_connected_components(&mut self, map: &BuildingMap) -> usize {
        self.build_graph(map).count_connected_components()
    }

    /// The full pipeline for a room-to-room query: room-level A* over the
    /// connectivity graph, then local reconstruction with obstacle avoidance.
    /// The returned path starts at `agent.pos` and ends at a point in
    /// `goal_room` (`custom_goal` when given and reachable, otherwise the
    /// room center or a nearby random point).
    #[allow(clippy::too_many_arguments)]
    pub fn find_path_points(
        &mut self,
        map: &BuildingMap,
        agent: &AgentState,
        start_room: RoomId,
        goal_room: RoomId,
        allow_vertical: bool,
        pref_dir: Option<VertPref>,
        obstacles: &[BCube],
        door_state: &dyn DoorState,
        custom_goal: Option<Point3>,
    ) -> RouteResult<Path> {
        let Self { nav, global_seed, graph, grids } = self;
        let g = graph.get_or_build(map, nav);

        let query = RouteQuery {
            start: g.room_node(start_room),
            goal: g.room_node(goal_room),
            agent: &agent.params,
            allow_vertical,
            pref_dir,
            door_state,
        };
        let route = find_node_route(g, nav, &query)?;

        let mut rec = Reconstructor {
            graph: g,
            map,
            nav,
            obstacles,
            grids,
            global_seed: *global_seed,
            agent: agent.id,
            attempt: agent.path_attempt,
            radius: agent.params.radius,
        };
        rec.run(&route, agent.pos, custom_goal, agent.first_path)
    }

    /// Connect two points inside one room, skipping the graph search
    /// entirely (e.g. chasing a target already in the same room).
    pub fn complete_path_within_room(
        &mut self,
        map: &BuildingMap,
        agent: &AgentState,
        room: RoomId,
        from: Point3,
        to: Point3,
        obstacles: &[BCube],
    ) -> RouteResult<Path> {
        let Self { nav, global_seed, graph, grids } = self;
        let g = graph.get_or_build(map, nav);
        let mut rec = Reconstructor {
            graph: g,
            map,
            nav,
            obstacles,
            grids,
            global_seed: *global_seed,
            agent: agent.id,
            attempt: agent.path_attempt,
            radius: agent.params.radius,
        };
        within_room(&mut rec, room, from, to)
    }

    /// Point-to-point entry: resolves both endpoints to rooms (with a small
    /// nearest-room tolerance for points on thresholds), then dispatches to
    /// the same-room, same-floor, or cross-floor pipeline.  Cross-floor
    /// queries allow vertical connectors and prefer the direction of travel.
    pub fn find_route_to_point(
        &mut self,
        map: &BuildingMap,
        agent: &AgentState,
        goal: Point3,
        obstacles: &[BCube],
        door_state: &dyn DoorState,
    ) -> RouteResult<Path> {
        let r = agent.params.radius;
        let start_room = locate(map, agent.pos, r).ok_or(RouteError::OutsideBuilding(agent.pos))?;
        let goal_room = locate(map, goal, r).ok_or(RouteError::OutsideBuilding(goal))?;

        if start_room == goal_room {
            return self.complete_path_within_room(map, agent, start_room, agent.pos, goal, obstacles);
        }

        let start_z = map.room(start_room).bcube.lo.z;
        let goal_z = map.room(goal_room).bcube.lo.z;
        let (allow_vertical, pref_dir) = if (start_z - goal_z).abs() < FLOOR_TOL {
            (false, None)
        } else if goal_z > start_z {
            (true, Some(VertPref::Up))
        } else {
            (true, Some(VertPref::Down))
        };

        self.find_path_points(
            map,
            agent,
            start_room,
            goal_room,
            allow_vertical,
            pref_dir,
            obstacles,
            door_state,
            Some(goal),
        )
    }
}

fn locate(map: &BuildingMap, p: Point3, radius: f32) -> Option<RoomId> {
    map.room_at(p).or_else(|| map.nearest_room(p, radius))
}
