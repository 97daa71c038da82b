//! Occupancy grid over one open region.
//!
//! Used where the room graph abstraction is too coarse: a warehouse-like
//! open area with scattered furniture has one graph node but needs real
//! routing around its contents.
//!
//! # Sampling guarantee
//!
//! Node spacing is `√2 × agent_radius`, so the diagonal between adjacent
//! nodes is `2 × agent_radius`: after every obstacle is expanded by the
//! agent's radius, no obstacle large enough to block the agent can fall
//! between sample points undetected.
//!
//! The grid is built once per region and cached on the instance; rebuilding
//! with new parameters is the only invalidation.

use bnav_core::{BCube, Point2, Point3};

/// Row-major lattice of open/blocked nodes covering a region's xy footprint.
pub struct DenseGrid {
    /// Node (0,0) position; node (i,j) is at `origin + (i,j) * spacing`.
    origin: Point2,
    spacing: f32,
    nx: usize,
    ny: usize,
    /// Row-major occupancy; `true` = agent center may stand here.
    open: Vec<bool>,
}

impl DenseGrid {
    /// An unbuilt grid.  [`find_path`](crate::search::find_path) on it fails
    /// with [`GridError::NotBuilt`](crate::GridError::NotBuilt).
    pub fn empty() -> Self {
        Self {
            origin: Point2::new(0.0, 0.0),
            spacing: 0.0,
            nx: 0,
            ny: 0,
            open: Vec::new(),
        }
    }

    /// Build the occupancy grid for `region`.
    ///
    /// Every obstacle is expanded by `agent_radius` in the horizontal plane;
    /// a node is open iff the agent's center at that node is outside all
    /// expanded obstacles.  A region smaller than `2 × spacing` on either
    /// axis produces the explicit unbuilt state rather than an error — the
    /// caller's fallback logic treats it as "no grid available".
    pub fn build(region: &BCube, obstacles: &[BCube], agent_radius: f32) -> Self {
        let spacing = std::f32::consts::SQRT_2 * agent_radius;
        if spacing <= 0.0 || region.dx() <= 2.0 * spacing || region.dy() <= 2.0 * spacing {
            return Self::empty();
        }

        let nx = (region.dx() / spacing).floor() as usize;
        let ny = (region.dy() / spacing).floor() as usize;
        // Center the lattice inside the region.
        let origin = Point2::new(
            region.lo.x + 0.5 * (region.dx() - (nx - 1) as f32 * spacing),
            region.lo.y + 0.5 * (region.dy() - (ny - 1) as f32 * spacing),
        );

        let keepouts: Vec<BCube> = obstacles.iter().map(|o| o.expand_xy(agent_radius)).collect();

        let mut open = vec![true; nx * ny];
        for j in 0..ny {
            for i in 0..nx {
                let p = Point2::new(
                    origin.x + i as f32 * spacing,
                    origin.y + j as f32 * spacing,
                );
                if keepouts.iter().any(|k| k.contains_xy(p)) {
                    open[j * nx + i] = false;
                }
            }
        }

        Self { origin, spacing, nx, ny, open }
    }

    /// `false` for grids from [`empty`](Self::empty) or undersized regions.
    pub fn is_built(&self) -> bool {
        self.nx > 0 && self.ny > 0
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn node_count(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub(crate) fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        j * self.nx + i
    }

    #[inline]
    pub(crate) fn is_open(&self, i: usize, j: usize) -> bool {
        self.open[self.index(i, j)]
    }

    /// World position of node `(i, j)`.
    #[inline]
    pub(crate) fn node_pos(&self, i: usize, j: usize) -> Point2 {
        Point2::new(
            self.origin.x + i as f32 * self.spacing,
            self.origin.y + j as f32 * self.spacing,
        )
    }

    /// Nearest open node to `p`, searched over the 2×2 neighborhood of its
    /// fractional grid coordinate.  Out-of-range and blocked candidates are
    /// rejected; `None` if all four are.
    pub(crate) fn snap(&self, p: Point3) -> Option<(usize, usize)> {
        let fx = (p.x - self.origin.x) / self.spacing;
        let fy = (p.y - self.origin.y) / self.spacing;
        let mut best: Option<((usize, usize), f32)> = None;
        for gx in [fx.floor(), fx.ceil()] {
            for gy in [fy.floor(), fy.ceil()] {
                if gx < 0.0 || gy < 0.0 || gx >= self.nx as f32 || gy >= self.ny as f32 {
                    continue;
                }
                let (i, j) = (gx as usize, gy as usize);
                if !self.is_open(i, j) {
                    continue;
                }
                let d = self.node_pos(i, j).dist(p.xy());
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some(((i, j), d));
                }
            }
        }
        best.map(|(ij, _)| ij)
    }
}
