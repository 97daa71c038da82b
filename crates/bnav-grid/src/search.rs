//! A* over the occupancy grid.
//!
//! 8-connected neighbors (the 3×3 block minus the center), Euclidean edge
//! cost, straight-line Euclidean heuristic — admissible and consistent on a
//! uniform lattice, so the first pop of the goal is optimal under this
//! connectivity.  Scores and predecessors live in dense arrays sized to the
//! node count.
//!
//! The returned path starts and ends at the *exact* query points; the
//! snapped grid nodes are interior waypoints.  The interior is not
//! post-processed for collinearity.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bnav_core::{Path, Point3};

use crate::error::{GridError, GridResult};
use crate::grid::DenseGrid;

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    node: usize,
    f_score: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.total_cmp(&other.f_score) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Find a path from `p1` to `p2` across the grid.
///
/// Horizontal-only: the endpoints must share a z plane, which is also the z
/// assigned to every returned waypoint.
pub fn find_path(grid: &DenseGrid, p1: Point3, p2: Point3) -> GridResult<Path> {
    if !grid.is_built() {
        return Err(GridError::NotBuilt);
    }
    if p1.z != p2.z {
        return Err(GridError::EndpointZMismatch(p1.z, p2.z));
    }
    let z = p1.z;
    let start = grid.snap(p1).ok_or(GridError::SnapFailed(p1))?;
    let goal = grid.snap(p2).ok_or(GridError::SnapFailed(p2))?;

    let (nx, ny) = grid.dims();
    let start_idx = grid.index(start.0, start.1);
    let goal_idx = grid.index(goal.0, goal.1);
    let goal_pos = grid.node_pos(goal.0, goal.1);

    if start_idx == goal_idx {
        let mut path = Path::with_capacity(2);
        path.push(p2);
        path.push(p1);
        path.reverse();
        return Ok(path);
    }

    let n = grid.node_count();
    let mut g_score = vec![f32::INFINITY; n];
    let mut came_from: Vec<usize> = vec![usize::MAX; n];
    let mut closed = vec![false; n];

    g_score[start_idx] = 0.0;

    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        node: start_idx,
        f_score: grid.node_pos(start.0, start.1).dist(goal_pos),
    });

    while let Some(OpenEntry { node: current, .. }) = open.pop() {
        if current == goal_idx {
            return Ok(reconstruct(grid, &came_from, start_idx, goal_idx, p1, p2, z));
        }
        if closed[current] {
            continue;
        }
        closed[current] = true;

        let (ci, cj) = (current % nx, current / nx);
        let cur_pos = grid.node_pos(ci, cj);
        let cur_g = g_score[current];

        // 3×3 neighborhood minus the center.
        for dj in -1i32..=1 {
            for di in -1i32..=1 {
                if di == 0 && dj == 0 {
                    continue;
                }
                let ni = ci as i32 + di;
                let nj = cj as i32 + dj;
                if ni < 0 || nj < 0 || ni >= nx as i32 || nj >= ny as i32 {
                    continue;
                }
                let (ni, nj) = (ni as usize, nj as usize);
                if !grid.is_open(ni, nj) {
                    continue;
                }
                let neighbor = grid.index(ni, nj);
                if closed[neighbor] {
                    continue;
                }
                let npos = grid.node_pos(ni, nj);
                let tentative = cur_g + cur_pos.dist(npos);
                if tentative < g_score[neighbor] {
                    g_score[neighbor] = tentative;
                    came_from[neighbor] = current;
                    open.push(OpenEntry {
                        node: neighbor,
                        f_score: tentative + npos.dist(goal_pos),
                    });
                }
            }
        }
    }

    Err(GridError::NoPath)
}

/// Walk predecessor links goal→start, bracket with the exact query points,
/// and reverse once into walk order.
fn reconstruct(
    grid: &DenseGrid,
    came_from: &[usize],
    start_idx: usize,
    goal_idx: usize,
    p1: Point3,
    p2: Point3,
    z: f32,
) -> Path {
    let (nx, _) = grid.dims();
    let mut path = Path::new();
    path.push(p2);
    let mut current = goal_idx;
    loop {
        path.push(grid.node_pos(current % nx, current / nx).at_z(z));
        if current == start_idx {
            break;
        }
        current = came_from[current];
        debug_assert_ne!(current, usize::MAX, "broken predecessor chain");
    }
    path.push(p1);
    path.reverse();
    path
}
