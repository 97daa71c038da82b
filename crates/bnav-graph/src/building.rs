//! Read-only building model: the narrow interface through which externally
//! generated geometry is consumed.
//!
//! This crate never creates geometry.  The caller (a building generator, a
//! level loader, a test fixture) describes rooms, doors, stairwells, and the
//! optional ramp through [`BuildingMapBuilder`]; everything here is lookup.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over room bounding cubes answers "which room
//! contains this point" and "which rooms touch this cube" — the two queries
//! graph construction and the top-level planner need on every call.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use bnav_core::{Axis, BCube, DoorId, Point3, RoomId};

// ── Building elements ─────────────────────────────────────────────────────────

/// One room, as supplied by the geometry collaborator.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub bcube: BCube,
    /// Hallways connect doorlessly to abutting hallways and get extra wall
    /// clearance during local routing.
    pub is_hallway: bool,
    /// Room has a door leading outside the building.
    pub has_exit: bool,
    /// Large unstructured open area (e.g. a warehouse floor).  Local routing
    /// falls back to the dense grid pathfinder when via-point search fails.
    pub is_open_area: bool,
    /// Index of the enclosing building part, used to bias destination points
    /// in non-rectangular rooms toward the part's geometric center.
    pub part: u32,
}

/// One door stack.  Doors are recorded once per vertical stack of floors;
/// state queries carry a z coordinate for per-floor applicability.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Door {
    pub bcube: BCube,
    pub open: bool,
    pub locked: bool,
}

/// Straight stairs run bottom-to-top along `dim`; U-shaped stairs turn at a
/// mid-height landing and re-enter on the side they were entered from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StairShape {
    Straight,
    UShaped,
}

/// A stairwell connecting two floors.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stairwell {
    pub bcube: BCube,
    /// Horizontal axis the flights run along.
    pub dim: Axis,
    /// `true` if ascent moves toward +`dim`.  For U-shaped stairs this is the
    /// first flight; both entrances lie on the opposite end.
    pub dir: bool,
    pub shape: StairShape,
    /// Door guarding the stairwell entrance, if any.
    pub door: Option<DoorId>,
}

/// The building's single ramp, if it has one.  Geometrically a straight,
/// doorless connector.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ramp {
    pub bcube: BCube,
    pub dim: Axis,
    pub dir: bool,
}

// ── Door state ────────────────────────────────────────────────────────────────

/// Door open/lock state as seen by one path query.
///
/// Implemented by [`BuildingMap`] itself (stack-wide flags) and by callers
/// that track per-floor or per-agent door state externally; the `z` argument
/// identifies the floor being crossed.
pub trait DoorState {
    fn is_open(&self, door: DoorId, z: f32) -> bool;
    fn is_locked(&self, door: DoorId, z: f32) -> bool;
}

// ── R-tree room entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a room's bounding cube.
#[derive(Clone)]
struct RoomEntry {
    lo: [f32; 3],
    hi: [f32; 3],
    id: RoomId,
}

impl RTreeObject for RoomEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.lo, self.hi)
    }
}

impl PointDistance for RoomEntry {
    /// Squared distance from `point` to the cube (0 inside).
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        self.envelope().distance_2(point)
    }
}

// ── BuildingMap ───────────────────────────────────────────────────────────────

/// Immutable view of one building's navigable geometry.
///
/// Do not construct directly; use [`BuildingMapBuilder`].
pub struct BuildingMap {
    parts: Vec<BCube>,
    rooms: Vec<Room>,
    doors: Vec<Door>,
    stairwells: Vec<Stairwell>,
    ramp: Option<Ramp>,
    room_idx: RTree<RoomEntry>,
}

impl BuildingMap {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    pub fn stairwell_count(&self) -> usize {
        self.stairwells.len()
    }

    pub fn has_ramp(&self) -> bool {
        self.ramp.is_some()
    }

    // ── Element access ────────────────────────────────────────────────────

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn door(&self, id: DoorId) -> &Door {
        &self.doors[id.index()]
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn stairwells(&self) -> &[Stairwell] {
        &self.stairwells
    }

    pub fn ramp(&self) -> Option<&Ramp> {
        self.ramp.as_ref()
    }

    /// Geometric center of a building part, or `None` for an unknown index.
    pub fn part_center(&self, part: u32) -> Option<Point3> {
        self.parts.get(part as usize).map(BCube::center)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The room containing `p`, if any.  Ties (shared walls) resolve to the
    /// lowest room index for determinism.
    pub fn room_at(&self, p: Point3) -> Option<RoomId> {
        self.room_idx
            .locate_all_at_point(&[p.x, p.y, p.z])
            .map(|e| e.id)
            .min()
    }

    /// The room nearest to `p` within `max_dist`, for points that sit exactly
    /// on a wall or doorway line.
    pub fn nearest_room(&self, p: Point3, max_dist: f32) -> Option<RoomId> {
        let q = [p.x, p.y, p.z];
        self.room_idx
            .nearest_neighbor(&q)
            .filter(|e| e.distance_2(&q) <= max_dist * max_dist)
            .map(|e| e.id)
    }

    /// All rooms whose bounding cubes intersect `bc`, ascending by index.
    pub fn rooms_touching(&self, bc: &BCube) -> Vec<RoomId> {
        let env = AABB::from_corners(
            [bc.lo.x, bc.lo.y, bc.lo.z],
            [bc.hi.x, bc.hi.y, bc.hi.z],
        );
        let mut ids: Vec<RoomId> = self
            .room_idx
            .locate_in_envelope_intersecting(&env)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Default door state: the stack-wide flags recorded on the map, applied to
/// every floor (`z` ignored).
impl DoorState for BuildingMap {
    fn is_open(&self, door: DoorId, _z: f32) -> bool {
        self.doors[door.index()].open
    }

    fn is_locked(&self, door: DoorId, _z: f32) -> bool {
        self.doors[door.index()].locked
    }
}

// ── BuildingMapBuilder ────────────────────────────────────────────────────────

/// Accumulates building geometry, then bulk-loads the spatial index in
/// [`build`](Self::build).
pub struct BuildingMapBuilder {
    parts: Vec<BCube>,
    rooms: Vec<Room>,
    doors: Vec<Door>,
    stairwells: Vec<Stairwell>,
    ramp: Option<Ramp>,
}

impl BuildingMapBuilder {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            rooms: Vec::new(),
            doors: Vec::new(),
            stairwells: Vec::new(),
            ramp: None,
        }
    }

    /// Add a building part (an outer footprint section) and return its index.
    pub fn add_part(&mut self, bcube: BCube) -> u32 {
        self.parts.push(bcube);
        (self.parts.len() - 1) as u32
    }

    pub fn add_room(&mut self, room: Room) -> RoomId {
        let id = RoomId(self.rooms.len() as u32);
        self.rooms.push(room);
        id
    }

    pub fn add_door(&mut self, door: Door) -> DoorId {
        let id = DoorId(self.doors.len() as u32);
        self.doors.push(door);
        id
    }

    pub fn add_stairwell(&mut self, stairs: Stairwell) {
        self.stairwells.push(stairs);
    }

    /// Set the building's ramp.  A building has at most one; a second call
    /// replaces the first.
    pub fn set_ramp(&mut self, ramp: Ramp) {
        self.ramp = Some(ramp);
    }

    /// Consume the builder and bulk-load the room R-tree (O(N log N), faster
    /// than N inserts).
    pub fn build(self) -> BuildingMap {
        let entries: Vec<RoomEntry> = self
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| RoomEntry {
                lo: [r.bcube.lo.x, r.bcube.lo.y, r.bcube.lo.z],
                hi: [r.bcube.hi.x, r.bcube.hi.y, r.bcube.hi.z],
                id: RoomId(i as u32),
            })
            .collect();
        BuildingMap {
            parts: self.parts,
            rooms: self.rooms,
            doors: self.doors,
            stairwells: self.stairwells,
            ramp: self.ramp,
            room_idx: RTree::bulk_load(entries),
        }
    }
}

impl Default for BuildingMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
