//! `bnav-core` — foundational types for the `rust_bnav` indoor navigation
//! library.
//!
//! This crate is a dependency of every other `bnav-*` crate.  It intentionally
//! has no `bnav-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `RoomId`, `DoorId`, `NodeIdx`              |
//! | [`geom`]    | `Point2`, `Point3`, `BCube`, `Axis`                   |
//! | [`path`]    | `Path` (build-reversed waypoint sequence)             |
//! | [`rng`]     | `AgentRng` (per agent/room/attempt streams)           |
//! | [`params`]  | `AgentParams`, `NavParams`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.     |

pub mod geom;
pub mod ids;
pub mod params;
pub mod path;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geom::{Axis, BCube, Point2, Point3};
pub use ids::{AgentId, DoorId, NodeIdx, RoomId};
pub use params::{AgentParams, NavParams};
pub use path::Path;
pub use rng::AgentRng;
