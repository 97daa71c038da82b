//! Grid-subsystem error type.

use thiserror::Error;

use bnav_core::Point3;

/// Errors produced by `bnav-grid`.  All are ordinary planning failures;
/// callers retry or report unreachable.
#[derive(Debug, Error)]
pub enum GridError {
    /// `find_path` called before `build`, or the region was too small to
    /// grid (smaller than twice the cell spacing on either axis).
    #[error("grid not built (region absent or too small)")]
    NotBuilt,

    /// The two query points are on different z planes; the grid search is
    /// horizontal only.
    #[error("query endpoints differ in z ({0} vs {1})")]
    EndpointZMismatch(f32, f32),

    /// No open grid node near the query point (2×2 neighborhood all blocked
    /// or outside the region).
    #[error("no open grid node near {0}")]
    SnapFailed(Point3),

    /// Open set exhausted: the endpoints lie in disconnected open regions.
    #[error("no grid path between the query points")]
    NoPath,
}

pub type GridResult<T> = Result<T, GridError>;
