//! Per-triangle derived data and the point-to-triangle distance primitive.

use glam::{DVec3, Vec3};

use crate::geom::DEGENERACY_FLOOR;

/// A triangle with the derived quantities needed for fast point-to-surface
/// queries.
///
/// The vertices are reordered at construction so that AB is the longest
/// side. The projection of C onto AB then always falls inside the AB
/// segment, which removes a case from [`TriangleInfo::dist_sqr_to_point`].
/// The original winding is preserved by the reordering, so the normal still
/// follows the right-hand rule from AB to AC.
///
/// All fields are in f64; construction widens the f32 vertex data once so
/// the distance kernel never re-converts.
#[derive(Debug, Clone)]
pub struct TriangleInfo {
    a: DVec3,
    b: DVec3,
    c: DVec3,
    ab: DVec3,
    ca: DVec3,
    cb: DVec3,
    ab_len_sqr: f64,
    ca_len_sqr: f64,
    cb_len_sqr: f64,
    ab_1_len_sqr: f64,
    ca_1_len_sqr: f64,
    cb_1_len_sqr: f64,
    /// Unit normal of ABC, or zero for a degenerate triangle.
    normal: DVec3,
    /// Outward normal of the plane through AB, perpendicular to ABC.
    nhsab: DVec3,
    /// Outward normal of the plane through BC, perpendicular to ABC.
    nhsbc: DVec3,
    /// Outward normal of the plane through CA, perpendicular to ABC.
    nhsca: DVec3,
    chsab: f64,
    chsbc: f64,
    chsca: f64,
    /// A dotted with the unit normal.
    a_n: f64,
    /// True if the angle at C is larger than 90 degrees.
    wide_at_c: bool,
    area: f64,
}

impl TriangleInfo {
    /// Builds the derived data for the triangle `(a, b, c)`.
    ///
    /// A triangle whose longest squared side length falls below
    /// [`DEGENERACY_FLOOR`] collapses to the single point A: its area is zero
    /// and its point distance reduces to the distance to A.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let (a, b, c) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3());
        let ab = b - a;
        let ac = c - a;
        let bc = c - b;
        let ab_len_sqr = ab.length_squared();
        let ac_len_sqr = ac.length_squared();
        let bc_len_sqr = bc.length_squared();

        // Relabel so that the longest side becomes AB. Each arm keeps the
        // cyclic order of the input vertices.
        let (ta, tb, tc, t_ab, t_ca, t_cb, l_ab, l_ca, l_cb) = if ab_len_sqr <= ac_len_sqr {
            if ac_len_sqr <= bc_len_sqr {
                // BC longest: A <- B, B <- C, C <- A
                (b, c, a, bc, ab, ac, bc_len_sqr, ab_len_sqr, ac_len_sqr)
            } else {
                // AC longest: A <- C, B <- A, C <- B
                (c, a, b, -ac, bc, -ab, ac_len_sqr, bc_len_sqr, ab_len_sqr)
            }
        } else if ab_len_sqr <= bc_len_sqr {
            // BC longest: A <- B, B <- C, C <- A
            (b, c, a, bc, ab, ac, bc_len_sqr, ab_len_sqr, ac_len_sqr)
        } else {
            // AB longest: labels unchanged
            (a, b, c, ab, -ac, -bc, ab_len_sqr, ac_len_sqr, bc_len_sqr)
        };

        let is_point = l_ab < DEGENERACY_FLOOR;
        let (t_ab, t_ca, t_cb, l_ab, l_ca, l_cb) = if is_point {
            // ABC coincident: everything degenerates to the point A
            (DVec3::ZERO, DVec3::ZERO, DVec3::ZERO, 0.0, 0.0, 0.0)
        } else {
            (t_ab, t_ca, t_cb, l_ab, l_ca, l_cb)
        };

        let mut normal = t_ca.cross(t_ab);
        let n_len = normal.length();
        if n_len < DEGENERACY_FLOOR {
            normal = DVec3::ZERO;
        } else {
            normal /= n_len;
        }

        let nhsab = t_ab.cross(normal);
        let nhsbc = normal.cross(t_cb);
        let nhsca = t_ca.cross(normal);

        let area = if is_point {
            0.0
        } else {
            let ca_ab = t_ca.dot(t_ab);
            let height_sqr = (l_ca - ca_ab * ca_ab / l_ab).max(0.0);
            (l_ab * height_sqr).sqrt() * 0.5
        };

        Self {
            a: ta,
            b: tb,
            c: tc,
            ab: t_ab,
            ca: t_ca,
            cb: t_cb,
            ab_len_sqr: l_ab,
            ca_len_sqr: l_ca,
            cb_len_sqr: l_cb,
            ab_1_len_sqr: 1.0 / l_ab,
            ca_1_len_sqr: 1.0 / l_ca,
            cb_1_len_sqr: 1.0 / l_cb,
            normal,
            nhsab,
            nhsbc,
            nhsca,
            chsab: ta.dot(nhsab),
            chsbc: tb.dot(nhsbc),
            chsca: ta.dot(nhsca),
            a_n: ta.dot(normal),
            wide_at_c: l_ab > l_ca + l_cb,
            area,
        }
    }

    /// The A vertex after longest-side reordering.
    pub fn a(&self) -> DVec3 {
        self.a
    }

    /// The B vertex after longest-side reordering.
    pub fn b(&self) -> DVec3 {
        self.b
    }

    /// The C vertex after longest-side reordering.
    pub fn c(&self) -> DVec3 {
        self.c
    }

    /// Unit normal of the triangle, zero if degenerate.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Surface area of the triangle.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Squared Euclidean distance from `p` to the closest point of the
    /// triangle.
    ///
    /// The query first classifies `p` against the three planes through the
    /// sides, perpendicular to the triangle. Outside the AB plane the
    /// closest feature is the AB segment; outside the BC plane it is BC, or
    /// the CA side when the angle at C is wide; outside the CA plane it is
    /// CA; otherwise `p` projects into the interior and the distance is the
    /// distance to the supporting plane.
    ///
    /// For a degenerate triangle `nhsab` is the zero vector, so the first
    /// branch is always taken and the result reduces to the distance to A.
    #[must_use]
    pub fn dist_sqr_to_point(&self, p: DVec3) -> f64 {
        if p.dot(self.nhsab) >= self.chsab {
            // Exterior side of the AB plane: closest to the AB segment.
            let ap = p - self.a;
            let ap_ab = ap.dot(self.ab);
            if ap_ab > 0.0 {
                if ap_ab < self.ab_len_sqr {
                    (ap.length_squared() - ap_ab * ap_ab * self.ab_1_len_sqr).max(0.0)
                } else {
                    p.distance_squared(self.b)
                }
            } else {
                ap.length_squared()
            }
        } else if p.dot(self.nhsbc) >= self.chsbc {
            // Exterior side of the BC plane: closest to BC, or to CA when
            // the angle at C is wide.
            let cp = p - self.c;
            let cp_cb = cp.dot(self.cb);
            if cp_cb > 0.0 {
                if cp_cb < self.cb_len_sqr {
                    (cp.length_squared() - cp_cb * cp_cb * self.cb_1_len_sqr).max(0.0)
                } else {
                    p.distance_squared(self.b)
                }
            } else if !self.wide_at_c {
                cp.length_squared()
            } else {
                let cp_ca = cp.dot(self.ca);
                if cp_ca > 0.0 {
                    if cp_ca < self.ca_len_sqr {
                        (cp.length_squared() - cp_ca * cp_ca * self.ca_1_len_sqr).max(0.0)
                    } else {
                        p.distance_squared(self.a)
                    }
                } else {
                    cp.length_squared()
                }
            }
        } else if p.dot(self.nhsca) >= self.chsca {
            // Exterior side of the CA plane: closest to the CA segment.
            let cp = p - self.c;
            let cp_ca = cp.dot(self.ca);
            if cp_ca > 0.0 {
                if cp_ca < self.ca_len_sqr {
                    (cp.length_squared() - cp_ca * cp_ca * self.ca_1_len_sqr).max(0.0)
                } else {
                    p.distance_squared(self.a)
                }
            } else {
                cp.length_squared()
            }
        } else {
            // p projects into the triangle interior.
            let dpp = p.dot(self.normal) - self.a_n;
            dpp * dpp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_triangle() -> TriangleInfo {
        TriangleInfo::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        )
    }

    #[test]
    fn test_longest_side_becomes_ab() {
        let t = right_triangle();
        // The hypotenuse (length 5) runs between (4,0,0) and (0,3,0).
        assert!((t.ab_len_sqr - 25.0).abs() < 1e-12);
        assert!((t.a() - t.b()).length() > (t.a() - t.c()).length());
        assert!((t.area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_is_unit_and_perpendicular() {
        let t = right_triangle();
        let n = t.normal();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!(n.dot(t.b() - t.a()).abs() < 1e-9);
        assert!(n.dot(t.c() - t.a()).abs() < 1e-9);
    }

    #[test]
    fn test_distance_above_interior() {
        let t = right_triangle();
        // Straight above a point well inside the triangle.
        let d2 = t.dist_sqr_to_point(DVec3::new(1.0, 1.0, 2.0));
        assert!((d2 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_vertices_and_edges() {
        let t = right_triangle();
        // Beyond the right-angle corner.
        let d2 = t.dist_sqr_to_point(DVec3::new(-3.0, -4.0, 0.0));
        assert!((d2 - 25.0).abs() < 1e-9);
        // Facing the x-axis edge from below.
        let d2 = t.dist_sqr_to_point(DVec3::new(2.0, -2.0, 0.0));
        assert!((d2 - 4.0).abs() < 1e-9);
        // Point on the surface.
        let d2 = t.dist_sqr_to_point(DVec3::new(1.0, 0.5, 0.0));
        assert!(d2 < 1e-12);
    }

    #[test]
    fn test_degenerate_reduces_to_point_distance() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let t = TriangleInfo::new(p, p, p);
        assert_eq!(t.area(), 0.0);
        let q = DVec3::new(1.0, 2.0, 5.0);
        assert!((t.dist_sqr_to_point(q) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_wide_angle_at_c() {
        // Obtuse triangle: the wide angle sits at (0, 0.5, 0), which the
        // reordering maps to C.
        let t = TriangleInfo::new(
            Vec3::new(-4.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        );
        assert!(t.wide_at_c);
        // A point past the obtuse vertex on the far side of BC must resolve
        // against the CA segment, not snap to C. The foot of the
        // perpendicular on CA gives |cp|^2 - (cp.ca)^2/|ca|^2 exactly.
        let d2 = t.dist_sqr_to_point(DVec3::new(-2.0, 1.0, 0.0));
        let expected = 4.25 - (7.75 * 7.75) / 16.25;
        assert!((d2 - expected).abs() < 1e-12);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f32> {
            -100.0f32..100.0
        }

        fn point() -> impl Strategy<Value = Vec3> {
            (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
        }

        proptest! {
            #[test]
            fn distance_never_exceeds_vertex_distance(
                a in point(), b in point(), c in point(), p in point()
            ) {
                let t = TriangleInfo::new(a, b, c);
                let p = p.as_dvec3();
                let d2 = t.dist_sqr_to_point(p);
                prop_assert!(d2.is_finite());
                prop_assert!(d2 >= 0.0);
                let to_vertex = p
                    .distance_squared(t.a())
                    .min(p.distance_squared(t.b()))
                    .min(p.distance_squared(t.c()));
                prop_assert!(d2 <= to_vertex + 1e-9 * (1.0 + to_vertex));
            }

            #[test]
            fn points_on_surface_are_at_zero_distance(
                a in point(), b in point(), c in point(),
                u in 0.0f64..1.0, v in 0.0f64..1.0
            ) {
                let t = TriangleInfo::new(a, b, c);
                // Fold (u, v) into the lower barycentric triangle.
                let (u, v) = if u + v > 1.0 { (1.0 - u, 1.0 - v) } else { (u, v) };
                let q = t.a() + (t.b() - t.a()) * u + (t.c() - t.a()) * v;
                let scale = (t.b() - t.a()).length_squared().max(1.0);
                prop_assert!(t.dist_sqr_to_point(q) <= 1e-9 * scale);
            }
        }
    }
}
