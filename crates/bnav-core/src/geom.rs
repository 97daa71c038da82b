//! Axis-aligned geometry primitives.
//!
//! Everything is single-precision: building interiors span tens of metres, so
//! `f32` leaves sub-millimetre resolution while keeping the dense search
//! arrays half the size of `f64`.
//!
//! Pathfinding is horizontal: searches operate on the xy plane of a single
//! floor, with z carried along for floor selection.  Hence the split between
//! [`Point3`] (waypoints) and [`Point2`] (in-plane search geometry).

use std::fmt;

// ── Axis ──────────────────────────────────────────────────────────────────────

/// A horizontal axis.  Stairwells and ramps run along exactly one of these.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The other horizontal axis.
    #[inline]
    pub fn perp(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

// ── Point2 / Point3 ───────────────────────────────────────────────────────────

/// A point in the horizontal plane.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn dist(self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component along `axis`.
    #[inline]
    pub fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Lift into 3-D at height `z`.
    #[inline]
    pub fn at_z(self, z: f32) -> Point3 {
        Point3::new(self.x, self.y, z)
    }
}

/// A 3-D waypoint.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Drop the z component.
    #[inline]
    pub fn xy(self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Horizontal (xy-plane) distance to `other`.
    #[inline]
    pub fn dist_xy(self, other: Point3) -> f32 {
        self.xy().dist(other.xy())
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

// ── BCube ─────────────────────────────────────────────────────────────────────

/// An axis-aligned bounding cube: rooms, doors, stairwells, and furniture
/// obstacles are all represented this way.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BCube {
    pub lo: Point3,
    pub hi: Point3,
}

impl BCube {
    /// Construct from explicit corner coordinates.
    ///
    /// # Panics
    /// Debug-panics if any `lo` coordinate exceeds the matching `hi`.
    pub fn new(x1: f32, y1: f32, z1: f32, x2: f32, y2: f32, z2: f32) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2 && z1 <= z2, "inverted bcube");
        Self {
            lo: Point3::new(x1, y1, z1),
            hi: Point3::new(x2, y2, z2),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn dx(&self) -> f32 {
        self.hi.x - self.lo.x
    }

    #[inline]
    pub fn dy(&self) -> f32 {
        self.hi.y - self.lo.y
    }

    #[inline]
    pub fn dz(&self) -> f32 {
        self.hi.z - self.lo.z
    }

    /// `(lo, hi)` extent along a horizontal axis.
    #[inline]
    pub fn span(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::X => (self.lo.x, self.hi.x),
            Axis::Y => (self.lo.y, self.hi.y),
        }
    }

    #[inline]
    pub fn center(&self) -> Point3 {
        Point3::new(
            0.5 * (self.lo.x + self.hi.x),
            0.5 * (self.lo.y + self.hi.y),
            0.5 * (self.lo.z + self.hi.z),
        )
    }

    #[inline]
    pub fn center_xy(&self) -> Point2 {
        Point2::new(0.5 * (self.lo.x + self.hi.x), 0.5 * (self.lo.y + self.hi.y))
    }

    // ── Containment & overlap ─────────────────────────────────────────────

    /// `true` if `p` lies inside the xy footprint (inclusive).
    #[inline]
    pub fn contains_xy(&self, p: Point2) -> bool {
        p.x >= self.lo.x && p.x <= self.hi.x && p.y >= self.lo.y && p.y <= self.hi.y
    }

    /// `true` if `p` lies inside the cube (inclusive) in all three axes.
    #[inline]
    pub fn contains(&self, p: Point3) -> bool {
        self.contains_xy(p.xy()) && p.z >= self.lo.z && p.z <= self.hi.z
    }

    /// `true` if the xy footprints overlap (touching counts).
    #[inline]
    pub fn intersects_xy(&self, other: &BCube) -> bool {
        self.lo.x <= other.hi.x
            && self.hi.x >= other.lo.x
            && self.lo.y <= other.hi.y
            && self.hi.y >= other.lo.y
    }

    /// `true` if the z ranges overlap (touching counts).
    #[inline]
    pub fn intersects_z(&self, other: &BCube) -> bool {
        self.lo.z <= other.hi.z && self.hi.z >= other.lo.z
    }

    /// `true` if the two footprints share a face along `axis` (abut within
    /// `tol`) and overlap on the perpendicular axis.  Used for doorless
    /// hallway adjacency.
    pub fn abuts_xy(&self, other: &BCube, axis: Axis, tol: f32) -> bool {
        let (a_lo, a_hi) = self.span(axis);
        let (b_lo, b_hi) = other.span(axis);
        let touching = (a_hi - b_lo).abs() <= tol || (b_hi - a_lo).abs() <= tol;
        if !touching {
            return false;
        }
        let p = axis.perp();
        let (a_lo, a_hi) = self.span(p);
        let (b_lo, b_hi) = other.span(p);
        a_lo < b_hi && a_hi > b_lo // strict: corner contact is not a passage
    }

    // ── Expansion & shrinking ─────────────────────────────────────────────

    /// Grow the xy footprint outward by `r` on all four sides (keepout for an
    /// agent of radius `r`).
    #[inline]
    pub fn expand_xy(&self, r: f32) -> BCube {
        BCube {
            lo: Point3::new(self.lo.x - r, self.lo.y - r, self.lo.z),
            hi: Point3::new(self.hi.x + r, self.hi.y + r, self.hi.z),
        }
    }

    /// Shrink the xy footprint inward by `r` on all four sides.  If a side
    /// would invert, it collapses to the cube's centerline instead, so the
    /// result is always a valid (possibly zero-area) cube.
    pub fn shrink_xy(&self, r: f32) -> BCube {
        let c = self.center();
        BCube {
            lo: Point3::new((self.lo.x + r).min(c.x), (self.lo.y + r).min(c.y), self.lo.z),
            hi: Point3::new((self.hi.x - r).max(c.x), (self.hi.y - r).max(c.y), self.hi.z),
        }
    }

    // ── Segment intersection ──────────────────────────────────────────────

    /// `true` if the segment `a`..`b` passes through the xy footprint
    /// (standard 2-D slab clipping).
    pub fn segment_intersects_xy(&self, a: Point2, b: Point2) -> bool {
        let p = [a.x, a.y];
        let d = [b.x - a.x, b.y - a.y];
        let lo = [self.lo.x, self.lo.y];
        let hi = [self.hi.x, self.hi.y];

        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        for i in 0..2 {
            if d[i].abs() < 1e-9 {
                // Segment parallel to this slab: inside or miss entirely.
                if p[i] < lo[i] || p[i] > hi[i] {
                    return false;
                }
            } else {
                let inv = 1.0 / d[i];
                let mut t0 = (lo[i] - p[i]) * inv;
                let mut t1 = (hi[i] - p[i]) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }
}
