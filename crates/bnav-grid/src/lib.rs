//! `bnav-grid` — dense-grid pathfinding for large open areas.
//!
//! # Crate layout
//!
//! | Module     | Contents                                       |
//! |------------|------------------------------------------------|
//! | [`grid`]   | `DenseGrid` (occupancy lattice + snapping)     |
//! | [`search`] | `find_path` (8-connected grid A*)              |
//! | [`error`]  | `GridError`, `GridResult<T>`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public data types.  |

pub mod error;
pub mod grid;
pub mod search;


pub use error::{GridError, GridResult};
pub use grid::DenseGrid;
pub use search::find_path;
