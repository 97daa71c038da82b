//! Unit tests for bnav-route.
//!
//! Fixtures mirror the hand-crafted buildings used by the graph crate so
//! expected path lengths can be computed by hand.

#[cfg(test)]
mod helpers {
    use bnav_core::{Axis, BCube, DoorId, RoomId};
    use bnav_graph::{
        BuildingMap, BuildingMapBuilder, Door, DoorState, Room, StairShape, Stairwell,
    };

    pub fn room(bcube: BCube) -> Room {
        Room {
            bcube,
            is_hallway: false,
            has_exit: false,
            is_open_area: false,
            part: 0,
        }
    }

    /// Two 10×10 rooms sharing one door at the midpoint of their common wall.
    pub fn two_rooms() -> (BuildingMap, [RoomId; 2], DoorId) {
        let mut b = BuildingMapBuilder::new();
        b.add_part(BCube::new(0.0, 0.0, 0.0, 20.0, 10.0, 3.0));
        let r0 = b.add_room(room(BCube::new(0.0, 0.0, 0.0, 10.0, 10.0, 3.0)));
        let r1 = b.add_room(room(BCube::new(10.0, 0.0, 0.0, 20.0, 10.0, 3.0)));
        let d = b.add_door(Door {
            bcube: BCube::new(9.95, 4.5, 0.0, 10.05, 5.5, 2.2),
            open: true,
            locked: false,
        });
        (b.build(), [r0, r1], d)
    }

    /// Two stacked 10×10 rooms joined by straight stairs along +x
    /// (footprint x 4..7, y 4..6; run-ups at x 3.4 and 7.6 on y = 5).
    pub fn two_floors() -> (BuildingMap, [RoomId; 2]) {
        let mut b = BuildingMapBuilder::new();
        b.add_part(BCube::new(0.0, 0.0, 0.0, 10.0, 10.0, 6.0));
        let lo = b.add_room(room(BCube::new(0.0, 0.0, 0.0, 10.0, 10.0, 3.0)));
        let hi = b.add_room(room(BCube::new(0.0, 0.0, 3.0, 10.0, 10.0, 6.0)));
        b.add_stairwell(Stairwell {
            bcube: BCube::new(4.0, 4.0, 0.0, 7.0, 6.0, 6.0),
            dim: Axis::X,
            dir: true,
            shape: StairShape::Straight,
            door: None,
        });
        (b.build(), [lo, hi])
    }

    /// One 20×20 room, optionally flagged as an open area.
    pub fn one_room(is_open_area: bool) -> (BuildingMap, RoomId) {
        let mut b = BuildingMapBuilder::new();
        b.add_part(BCube::new(0.0, 0.0, 0.0, 20.0, 20.0, 3.0));
        let r = b.add_room(Room {
            bcube: BCube::new(0.0, 0.0, 0.0, 20.0, 20.0, 3.0),
            is_hallway: false,
            has_exit: false,
            is_open_area,
            part: 0,
        });
        (b.build(), r)
    }

    /// Three staggered walls forming a chicane no one- or two-via path can
    /// thread: each crossing flips between the far right and far left gap, and
    /// a straight segment's x coordinate is monotone.
    pub fn chicane() -> Vec<BCube> {
        vec![
            BCube::new(0.0, 4.0, 0.0, 16.0, 5.0, 2.0),
            BCube::new(4.0, 9.0, 0.0, 20.0, 10.0, 2.0),
            BCube::new(0.0, 14.0, 0.0, 16.0, 15.0, 2.0),
        ]
    }

    /// Door-state override that forces one door closed (and optionally
    /// locked) regardless of the map's recorded flags.
    pub struct ForceDoor {
        pub door: DoorId,
        pub locked: bool,
    }

    impl DoorState for ForceDoor {
        fn is_open(&self, door: DoorId, _z: f32) -> bool {
            door != self.door
        }
        fn is_locked(&self, door: DoorId, _z: f32) -> bool {
            door == self.door && self.locked
        }
    }
}

// ── Via-point search ──────────────────────────────────────────────────────────

#[cfg(test)]
mod via {
    use bnav_core::{AgentId, AgentRng, BCube, NavParams, NodeIdx, Point2};

    use crate::reconstruct::{connect_room_endpoints, ViaStats};

    fn rng() -> AgentRng {
        AgentRng::for_room_attempt(7, AgentId(1), NodeIdx(0), 0)
    }

    fn walkable() -> BCube {
        BCube::new(0.35, 0.35, 0.0, 19.65, 19.65, 3.0)
    }

    #[test]
    fn straight_line_needs_no_vias() {
        let nav = NavParams::default();
        let mut vias = vec![Point2::new(9.0, 9.0)]; // stale content must be cleared
        let mut stats = ViaStats::default();
        let ok = connect_room_endpoints(
            &mut rng(),
            &nav,
            &walkable(),
            &[],
            Point2::new(1.0, 1.0),
            Point2::new(19.0, 19.0),
            &mut vias,
            &mut stats,
        );
        assert!(ok);
        assert!(vias.is_empty());
        assert_eq!(stats.single_tries, 0);
        assert_eq!(stats.double_tries, 0);
    }

    #[test]
    fn single_via_searched_before_double() {
        let nav = NavParams::default();
        // One block square across the midpoint: a single via suffices.
        let keepouts = [BCube::new(8.0, 8.0, 0.0, 12.0, 12.0, 2.0)];
        let from = Point2::new(10.0, 2.0);
        let to = Point2::new(10.0, 18.0);
        let mut vias = Vec::new();
        let mut stats = ViaStats::default();
        let ok = connect_room_endpoints(
            &mut rng(), &nav, &walkable(), &keepouts, from, to, &mut vias, &mut stats,
        );
        assert!(ok);
        assert_eq!(vias.len(), 1);
        // The single search scans its whole budget (keeping the shortest) and
        // the double search never starts.
        assert_eq!(stats.single_tries, nav.single_via_tries);
        assert_eq!(stats.double_tries, 0);
        // Both legs of the winning via are clear.
        let v = vias[0];
        for k in &keepouts {
            assert!(!k.segment_intersects_xy(from, v));
            assert!(!k.segment_intersects_xy(v, to));
        }
    }

    #[test]
    fn exhausts_both_budgets_when_sealed() {
        let nav = NavParams::default();
        // A wall spanning the full walkable width: nothing can get through.
        let keepouts = [BCube::new(-1.0, 9.0, 0.0, 21.0, 11.0, 2.0)];
        let mut vias = Vec::new();
        let mut stats = ViaStats::default();
        let ok = connect_room_endpoints(
            &mut rng(),
            &nav,
            &walkable(),
            &keepouts,
            Point2::new(10.0, 2.0),
            Point2::new(10.0, 18.0),
            &mut vias,
            &mut stats,
        );
        assert!(!ok);
        assert_eq!(stats.single_tries, nav.single_via_tries);
        assert_eq!(stats.double_tries, nav.double_via_tries);
    }
}

// ── Planner: room-to-room and point-to-point queries ──────────────────────────

#[cfg(test)]
mod planner {
    use bnav_core::{AgentId, BCube, Point3};
    use bnav_graph::{GraphError, VertPref};

    use super::helpers;
    use crate::error::RouteError;
    use crate::planner::{AgentState, RoutePlanner};

    fn agent_at(x: f32, y: f32, z: f32) -> AgentState {
        AgentState::new(AgentId(1), Point3::new(x, y, z))
    }

    #[test]
    fn two_room_route_runs_through_the_door() {
        let (map, [r0, r1], _) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(5.0, 5.0, 0.0);
        let goal = Point3::new(15.0, 5.0, 0.0);
        let path = planner
            .find_path_points(&map, &agent, r0, r1, false, None, &[], &map, Some(goal))
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));
        // center → doorway → center, all collinear: exactly 10 long.
        assert!((path.total_len_xy() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn locked_door_fails_at_the_graph_level() {
        let (map, [r0, r1], d) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(5.0, 5.0, 0.0);
        let locked = helpers::ForceDoor { door: d, locked: true };
        let err = planner
            .find_path_points(&map, &agent, r0, r1, false, None, &[], &locked, None)
            .unwrap_err();
        assert!(matches!(err, RouteError::Graph(GraphError::NoRoute { .. })));
    }

    #[test]
    fn obstacle_forces_a_detour() {
        let (map, [r0, r1], _) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(5.0, 5.0, 0.0);
        let goal = Point3::new(15.0, 5.0, 0.0);
        // Block the straight doorway→goal leg inside R1.
        let obstacles = [BCube::new(12.0, 4.0, 0.0, 13.0, 6.0, 2.0)];
        let path = planner
            .find_path_points(&map, &agent, r0, r1, false, None, &obstacles, &map, Some(goal))
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));
        assert!(path.total_len_xy() > 10.0);
        // Every leg clears the radius-expanded obstacle.
        let keepout = obstacles[0].expand_xy(agent.params.radius);
        for pair in path.points().windows(2) {
            assert!(!keepout.segment_intersects_xy(pair[0].xy(), pair[1].xy()));
        }
    }

    #[test]
    fn replanning_is_deterministic() {
        let (map, [r0, r1], _) = helpers::two_rooms();
        let agent = agent_at(5.0, 5.0, 0.0);
        let goal = Point3::new(15.0, 5.0, 0.0);
        let obstacles = [BCube::new(12.0, 4.0, 0.0, 13.0, 6.0, 2.0)];
        let run = || {
            let mut planner = RoutePlanner::new(42);
            planner
                .find_path_points(&map, &agent, r0, r1, false, None, &obstacles, &map, Some(goal))
                .unwrap()
        };
        assert_eq!(run().points(), run().points());
    }

    #[test]
    fn same_room_query_skips_the_graph() {
        let (map, ..) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(2.0, 2.0, 0.0);
        let goal = Point3::new(8.0, 8.0, 0.0);
        let path = planner
            .find_route_to_point(&map, &agent, goal, &[], &map)
            .unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));
    }

    #[test]
    fn outside_building_is_rejected() {
        let (map, ..) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(5.0, 5.0, 0.0);
        let err = planner
            .find_route_to_point(&map, &agent, Point3::new(100.0, 100.0, 0.0), &[], &map)
            .unwrap_err();
        assert!(matches!(err, RouteError::OutsideBuilding(_)));
    }

    #[test]
    fn cross_floor_route_climbs_the_stairs() {
        let (map, _) = helpers::two_floors();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(2.0, 2.0, 0.0);
        let goal = Point3::new(2.0, 2.0, 4.0);
        let path = planner
            .find_route_to_point(&map, &agent, goal, &[], &map)
            .unwrap();

        assert_eq!(path.first(), Some(agent.pos));
        // The destination lands on the upper floor plane.
        let end = path.last().unwrap();
        assert!((end.x - 2.0).abs() < 1e-4 && (end.y - 2.0).abs() < 1e-4);
        assert!((end.z - 3.0).abs() < 1e-4);

        // z never decreases on the way up.
        for pair in path.points().windows(2) {
            assert!(pair[1].z >= pair[0].z - 1e-6);
        }
        // Run-up waypoints on both sides of the stairwell.
        let has = |x: f32, y: f32, z: f32| {
            path.iter()
                .any(|p| (p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3 && (p.z - z).abs() < 1e-3)
        };
        assert!(has(3.4, 5.0, 0.0), "lower run-up missing: {:?}", path.points());
        assert!(has(4.0, 5.0, 0.0), "lower face point missing");
        assert!(has(7.0, 5.0, 3.0), "upper face point missing");
        assert!(has(7.6, 5.0, 3.0), "upper run-up missing");
    }

    #[test]
    fn descending_route_reverses_the_climb() {
        let (map, _) = helpers::two_floors();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(2.0, 2.0, 4.0);
        let goal = Point3::new(2.0, 2.0, 0.5);
        let path = planner
            .find_route_to_point(&map, &agent, goal, &[], &map)
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        for pair in path.points().windows(2) {
            assert!(pair[1].z <= pair[0].z + 1e-6);
        }
    }

    #[test]
    fn vertical_preference_follows_travel_direction() {
        // find_route_to_point derives the preference itself; this pins the
        // explicit API equivalent so the two stay in sync.
        let (map, [lo, hi]) = helpers::two_floors();
        let mut planner = RoutePlanner::new(42);
        let agent = agent_at(2.0, 2.0, 0.0);
        let path = planner
            .find_path_points(
                &map,
                &agent,
                lo,
                hi,
                true,
                Some(VertPref::Up),
                &[],
                &map,
                None,
            )
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        assert!(path.last().unwrap().z > 2.9);
    }

    #[test]
    fn first_path_tolerates_a_sealed_spawn() {
        let (map, [r0, r1], _) = helpers::two_rooms();
        let goal = Point3::new(15.0, 5.0, 0.0);
        // Box the agent in completely.
        let obstacles = [
            BCube::new(1.0, 1.0, 0.0, 1.2, 3.0, 2.0),
            BCube::new(2.8, 1.0, 0.0, 3.0, 3.0, 2.0),
            BCube::new(1.0, 1.0, 0.0, 3.0, 1.2, 2.0),
            BCube::new(1.0, 2.8, 0.0, 3.0, 3.0, 2.0),
        ];
        let mut planner = RoutePlanner::new(42);

        let mut agent = agent_at(2.0, 2.0, 0.0);
        agent.first_path = true;
        let path = planner
            .find_path_points(&map, &agent, r0, r1, false, None, &obstacles, &map, Some(goal))
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));

        agent.first_path = false;
        let err = planner
            .find_path_points(&map, &agent, r0, r1, false, None, &obstacles, &map, Some(goal))
            .unwrap_err();
        assert!(matches!(err, RouteError::Unnavigable { .. }));
    }
}

// ── Grid fallback in open areas ───────────────────────────────────────────────

#[cfg(test)]
mod fallback {
    use bnav_core::{AgentId, BCube, Point3};

    use super::helpers;
    use crate::error::RouteError;
    use crate::planner::{AgentState, RoutePlanner};

    #[test]
    fn open_area_falls_back_to_the_grid() {
        let (map, r) = helpers::one_room(true);
        let obstacles = helpers::chicane();
        let mut planner = RoutePlanner::new(42);
        let agent = AgentState::new(AgentId(1), Point3::new(10.0, 2.0, 0.0));
        let goal = Point3::new(10.0, 18.0, 0.0);
        let path = planner
            .complete_path_within_room(&map, &agent, r, agent.pos, goal, &obstacles)
            .unwrap();

        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));
        // The chicane forces three direction changes; well beyond two vias.
        assert!(path.len() > 4);
        // Interior grid waypoints keep clear of the expanded obstacles.
        let keepouts: Vec<BCube> = obstacles
            .iter()
            .map(|o| o.expand_xy(agent.params.radius))
            .collect();
        for p in path.points().iter().skip(1).take(path.len() - 2) {
            assert!(!keepouts.iter().any(|k| k.contains_xy(p.xy())));
        }
    }

    #[test]
    fn grid_fallback_keeps_the_exact_agent_endpoint() {
        // The grid searches on the floor plane; an agent standing slightly
        // above it must still get its true position back as the endpoint.
        let (map, r) = helpers::one_room(true);
        let obstacles = helpers::chicane();
        let mut planner = RoutePlanner::new(42);
        let agent = AgentState::new(AgentId(1), Point3::new(10.0, 2.0, 0.2));
        let goal = Point3::new(10.0, 18.0, 0.0);
        let path = planner
            .complete_path_within_room(&map, &agent, r, agent.pos, goal, &obstacles)
            .unwrap();
        assert_eq!(path.first(), Some(agent.pos));
        assert_eq!(path.last(), Some(goal));
    }

    #[test]
    fn ordinary_room_reports_unnavigable_instead() {
        let (map, r) = helpers::one_room(false);
        let obstacles = helpers::chicane();
        let mut planner = RoutePlanner::new(42);
        let agent = AgentState::new(AgentId(1), Point3::new(10.0, 2.0, 0.0));
        let err = planner
            .complete_path_within_room(
                &map,
                &agent,
                r,
                agent.pos,
                Point3::new(10.0, 18.0, 0.0),
                &obstacles,
            )
            .unwrap_err();
        assert!(matches!(err, RouteError::Unnavigable { .. }));
    }
}

// ── Door state, reachability, and cache invalidation ──────────────────────────

#[cfg(test)]
mod gating {
    use super::helpers;
    use crate::planner::RoutePlanner;

    #[test]
    fn reachability_follows_live_door_state() {
        let (map, [r0, r1], d) = helpers::two_rooms();
        let mut planner = RoutePlanner::new(42);

        assert!(planner.is_room_connected_to(&map, r0, r1, &map, 1.0, false));

        // Locking the door flips the answer without any rebuild: the state is
        // read through the predicate, not baked into the graph.
        let locked = helpers::ForceDoor { door: d, locked: true };
        assert!(!planner.is_room_connected_to(&map, r0, r1, &locked, 1.0, false));
        assert!(planner.is_room_connected_to(&map, r0, r1, &locked, 1.0, true));

        // Invalidation forces a rebuild on the next query and changes nothing
        // about the answers.
        planner.invalidate_graph();
        assert!(planner.is_room_connected_to(&map, r0, r1, &map, 1.0, false));
        assert_eq!(planner.count_connected_components(&map), 1);
    }
}
