//! `bnav-graph` — building model, room connectivity graph, and room-level A*.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`building`] | `BuildingMap` (+ rstar room index), `Room`, `Door`, `Stairwell`, `Ramp`, `DoorState` |
//! | [`graph`]    | `NavGraph`, `NavNode`, `NavEdge`, reachability queries    |
//! | [`search`]   | `find_node_route` (room-level A*), `RouteQuery`, `NodeRoute` |
//! | [`cache`]    | `GraphCache` (invalidate / rebuild-on-next-use)           |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.      |

pub mod building;
pub mod cache;
pub mod error;
pub mod graph;
pub mod search;


pub use building::{
    BuildingMap, BuildingMapBuilder, Door, DoorState, Ramp, Room, StairShape, Stairwell,
};
pub use cache::GraphCache;
pub use error::{GraphError, GraphResult};
pub use graph::{NavEdge, NavGraph, NavNode, StairGeom};
pub use search::{find_node_route, Hop, HopConn, NodeRoute, RouteQuery, VertPref};
