//! `bnav-route` — the top of the navigation stack: local path reconstruction
//! with randomized obstacle avoidance, plus the [`RoutePlanner`] facade that
//! ties the room-level search and the dense-grid fallback together.
//!
//! # Crate layout
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`planner`]     | `RoutePlanner`, `AgentState` (public entry points)   |
//! | [`reconstruct`] | node route → waypoints, via-point search (internal)  |
//! | [`error`]       | `RouteError`, `RouteResult<T>`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` across the whole stack.  |

pub mod error;
pub mod planner;
mod reconstruct;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use planner::{AgentState, RoutePlanner};
