//! Error type for the route planning layer.

use bnav_core::{NodeIdx, Point3};
use bnav_graph::GraphError;
use bnav_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    /// Room-level search found no node sequence at all.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The dense-grid fallback itself could not produce a path.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A node sequence exists but no collision-free local path could be
    /// threaded through this node within the retry budget.
    #[error("no collision-free local path through node {node}")]
    Unnavigable { node: NodeIdx },

    /// The query point lies outside every room in the building.
    #[error("point {0} is outside the building")]
    OutsideBuilding(Point3),
}

pub type RouteResult<T> = Result<T, RouteError>;
