//! The path type returned by every search.
//!
//! Searches construct paths goal→start (walking predecessor links or the node
//! sequence backward) and call [`Path::reverse`] exactly once before handing
//! the result to the caller.  This keeps the construction code free of
//! front-insertions without resorting to a linked structure — path lengths
//! are small and bounded.

use crate::Point3;

/// An ordered sequence of 3-D waypoints from the agent's position to its
/// destination.  One-shot: each query recomputes a fresh path.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    points: Vec<Point3>,
}

impl Path {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
        }
    }

    /// Append the next waypoint (in construction order, i.e. goal-first).
    #[inline]
    pub fn push(&mut self, p: Point3) {
        self.points.push(p);
    }

    /// Flip construction order (goal→start) into walk order (start→goal).
    /// Called exactly once, after the last waypoint is pushed.
    #[inline]
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point3> {
        self.points.last().copied()
    }

    /// Sum of horizontal segment lengths — the quantity the planners minimize.
    pub fn total_len_xy(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| w[0].dist_xy(w[1]))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3> {
        self.points.iter()
    }
}

impl From<Vec<Point3>> for Path {
    fn from(points: Vec<Point3>) -> Self {
        Self { points }
    }
}
