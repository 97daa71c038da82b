//! two_rooms — smallest demo for the rust_bnav navigation library.
//!
//! Builds a two-floor building by hand (two rooms per floor, one door per
//! shared wall, straight stairs between floors), then plans three routes for
//! one agent: across a floor, around a furniture obstacle, and up the stairs.

use anyhow::Result;

use bnav_core::{AgentId, Axis, BCube, Point3};
use bnav_graph::{BuildingMapBuilder, Door, Room, StairShape, Stairwell};
use bnav_route::{AgentState, RoutePlanner};

const SEED: u64 = 42;

fn room(bcube: BCube) -> Room {
    Room {
        bcube,
        is_hallway: false,
        has_exit: false,
        is_open_area: false,
        part: 0,
    }
}

fn main() -> Result<()> {
    // Floor 0: R0 | R1 with a door at (10, 5).  Floor 1: R2 above R0.
    let mut b = BuildingMapBuilder::new();
    b.add_part(BCube::new(0.0, 0.0, 0.0, 20.0, 10.0, 6.0));
    b.add_room(room(BCube::new(0.0, 0.0, 0.0, 10.0, 10.0, 3.0)));
    b.add_room(room(BCube::new(10.0, 0.0, 0.0, 20.0, 10.0, 3.0)));
    b.add_room(room(BCube::new(0.0, 0.0, 3.0, 10.0, 10.0, 6.0)));
    b.add_door(Door {
        bcube: BCube::new(9.95, 4.5, 0.0, 10.05, 5.5, 2.2),
        open: true,
        locked: false,
    });
    b.add_stairwell(Stairwell {
        bcube: BCube::new(4.0, 7.0, 0.0, 7.0, 9.0, 6.0),
        dim: Axis::X,
        dir: true,
        shape: StairShape::Straight,
        door: None,
    });
    let map = b.build();

    let mut planner = RoutePlanner::new(SEED);
    println!(
        "building: {} rooms, {} doors, {} connected component(s)",
        map.room_count(),
        map.door_count(),
        planner.count_connected_components(&map),
    );

    let agent = AgentState::new(AgentId(0), Point3::new(5.0, 5.0, 0.0));

    // 1. Across the floor, through the door.
    let path = planner.find_route_to_point(&map, &agent, Point3::new(15.0, 5.0, 0.0), &[], &map)?;
    print_path("across the floor", &path);

    // 2. Same query with a couch in the way.
    let couch = [BCube::new(12.0, 4.0, 0.0, 13.5, 6.0, 0.8)];
    let path =
        planner.find_route_to_point(&map, &agent, Point3::new(15.0, 5.0, 0.0), &couch, &map)?;
    print_path("around the couch", &path);

    // 3. Up the stairs to the room above.
    let path = planner.find_route_to_point(&map, &agent, Point3::new(5.0, 2.0, 4.0), &[], &map)?;
    print_path("up the stairs", &path);

    Ok(())
}

fn print_path(label: &str, path: &bnav_core::Path) {
    println!("{label}: {:.2} m, {} waypoints", path.total_len_xy(), path.len());
    for p in path.iter() {
        println!("    ({:6.2}, {:6.2}, {:5.2})", p.x, p.y, p.z);
    }
}
