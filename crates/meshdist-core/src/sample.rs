//! Uniform parametric sampling of triangles.

use glam::Vec3;

/// Returns the sampling frequency for the triangle `(a, b, c)` so that the
/// distance between two samples on the longest side is not larger than
/// `step`, and as close to it as possible.
///
/// Depending on the triangle shape the distance between samples along the
/// other sides can be much shorter than `step`. An optional
/// `min_sample_freq` lifts the result to at least that frequency.
#[must_use]
pub fn sampling_freq(a: Vec3, b: Vec3, c: Vec3, step: f64, min_sample_freq: usize) -> usize {
    let (a, b, c) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3());
    let max_len_sqr = a
        .distance_squared(b)
        .max(a.distance_squared(c))
        .max(b.distance_squared(c));
    let n = (max_len_sqr.sqrt() / step).floor() as usize + 1;
    n.max(min_sample_freq.max(1))
}

/// Samples the triangle `(a, b, c)` with `n` samples in each parametric
/// direction, appending the `n * (n + 1) / 2` points to `out` (which is
/// cleared first).
///
/// Samples are emitted for `i` in `0..n` and `j` in `0..n - i`, where `i`
/// and `j` run along the AB and AC sides. As a special case `n == 1` emits
/// the single point `A + (B - A)/2 + (C - A)/2`, the midpoint convention
/// the error statistics are calibrated against.
///
/// Sample coordinates are single precision, like the vertex data they
/// interpolate.
pub fn sample_triangle(a: Vec3, b: Vec3, c: Vec3, n: usize, out: &mut Vec<Vec3>) {
    out.clear();
    out.reserve(n * (n + 1) / 2);
    let u = b - a;
    let v = c - a;
    if n == 1 {
        out.push(a + 0.5 * u + 0.5 * v);
        return;
    }
    let u = (u.as_dvec3() / (n - 1) as f64).as_vec3();
    let v = (v.as_dvec3() / (n - 1) as f64).as_vec3();
    for i in 0..n {
        for j in 0..n - i {
            out.push(a + u * i as f32 + v * j as f32);
        }
    }
}
