//! Shared geometric helpers: bounding boxes and triangle areas.

use glam::{DVec3, Vec3};

/// Squared-length floor below which geometry is treated as degenerate.
///
/// A triangle whose longest squared side length falls under this floor
/// collapses to a point; a cell size is clamped above it to avoid division
/// by zero. The margin of `1e10` over the smallest positive double keeps
/// the reciprocal lengths representable.
pub const DEGENERACY_FLOOR: f64 = f64::MIN_POSITIVE * 1e10;

/// An axis-aligned bounding box with inclusive min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// An empty box: growing it by any point yields that point.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// A degenerate box at the origin, used for models with no vertices.
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Creates a box from explicit corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of a set of points.
    #[must_use]
    pub fn of_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::ZERO;
        }
        let mut bb = Self::EMPTY;
        for &p in points {
            bb.grow(p);
        }
        bb
    }

    /// Expands the box to contain `p`.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns the union of two boxes.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns true if `p` lies inside the box (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && self.max.cmpge(p).all()
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.min.as_dvec3().distance(self.max.as_dvec3())
    }
}

/// Area of the triangle `(p1, p2, p3)`.
///
/// Uses the height-projection formula with `u = p1 - p3` and `v = p2 - p3`:
/// the height is `v` minus its projection onto `u`, and the area is
/// `|h| * |u| / 2`. Returns 0 when `u` degenerates below [`DEGENERACY_FLOOR`].
#[must_use]
pub fn tri_area(p1: Vec3, p2: Vec3, p3: Vec3) -> f64 {
    let u = p1.as_dvec3() - p3.as_dvec3();
    let v = p2.as_dvec3() - p3.as_dvec3();
    let nu2 = u.length_squared();
    if nu2 < DEGENERACY_FLOOR {
        return 0.0;
    }
    let h: DVec3 = v - u * (u.dot(v) / nu2);
    h.length() * nu2.sqrt() * 0.5
}
