//! Graph-subsystem error type.

use thiserror::Error;

use bnav_core::NodeIdx;

/// Errors produced by `bnav-graph`.  A failed search is an ordinary error
/// value: the caller's policy is to wait and retry or pick another goal.
/// Corrupted graph structure (an edge to an out-of-range node) is a
/// programming error and panics instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A* open-set exhaustion: the goal is unreachable under the current
    /// door state and connector policy.
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeIdx, to: NodeIdx },
}

pub type GraphResult<T> = Result<T, GraphError>;
