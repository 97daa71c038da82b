//! Lazily rebuilt graph cache.
//!
//! The graph lives for the building's lifetime but goes stale whenever door
//! or geometry state changes in a way that affects connectivity.  Rather than
//! rebuilding eagerly on every change, the notification source calls
//! [`GraphCache::invalidate`] — a single atomic flag write, callable through
//! `&self` from a different thread than the one pathfinding — and the next
//! [`GraphCache::get_or_build`] rebuilds.  A search already in progress
//! completes against the pre-invalidation snapshot.

use std::sync::atomic::{AtomicBool, Ordering};

use bnav_core::NavParams;

use crate::building::BuildingMap;
use crate::graph::NavGraph;

/// Holds the current [`NavGraph`] plus its staleness flag.
#[derive(Default)]
pub struct GraphCache {
    graph: Option<NavGraph>,
    stale: AtomicBool,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the cached graph stale.  Cheap, lock-free, and safe to call while
    /// a search is reading the old graph.
    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::Relaxed);
    }

    /// The cached graph, rebuilding it first if absent or stale.
    pub fn get_or_build(&mut self, map: &BuildingMap, params: &NavParams) -> &NavGraph {
        if self.stale.swap(false, Ordering::Relaxed) {
            self.graph = None;
        }
        self.graph
            .get_or_insert_with(|| NavGraph::build(map, params))
    }

    /// The cached graph if present and current, without rebuilding.
    pub fn get(&self) -> Option<&NavGraph> {
        if self.stale.load(Ordering::Relaxed) {
            return None;
        }
        self.graph.as_ref()
    }
}
