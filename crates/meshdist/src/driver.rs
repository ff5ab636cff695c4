//! Pipeline driver: directional distance passes and the two-way
//! comparison surface.

use glam::{DVec3, Vec3};
use meshdist_core::{sample_triangle, sampling_freq, tri_area, Result};
use meshdist_model::Mesh;
use serde::Serialize;

use crate::grid::CellGrid;
use crate::kernel;
use crate::ring::RingCache;
use crate::stats::{DistSurfSurfStats, FaceError, SampleErrors};
use crate::triangles::TriangleList;

/// Computes the distance from `m1` to `m2`.
///
/// Every face of `m1` is sampled so that samples on its longest side are
/// at most `sampling_step` apart (an absolute length), with at least
/// `min_sample_freq` samples per direction when non-zero. Returns the
/// per-face error metrics, in face declaration order, and the aggregate
/// statistics. `quiet` suppresses progress logging.
pub fn dist_surf_surf(
    m1: &Mesh,
    m2: &Mesh,
    sampling_step: f64,
    min_sample_freq: usize,
    quiet: bool,
) -> Result<(Vec<FaceError>, DistSurfSurfStats)> {
    let bounds = m1.bounds().union(m2.bounds());
    let tl2 = TriangleList::from_mesh(m2);
    let grid = CellGrid::build(&tl2, &bounds)?;
    let mut cache = RingCache::new(grid.n_cells());

    let mut face_errors = Vec::with_capacity(m1.num_faces());
    let mut stats = DistSurfSurfStats {
        m1_area: 0.0,
        m2_area: tl2.total_area,
        min_dist: f64::MAX,
        max_dist: 0.0,
        mean_dist: 0.0,
        rms_dist: 0.0,
        m1_samples: 0,
        cell_sz: grid.cell_sz(),
        grid_sz: grid.size(),
    };

    let n_faces = m1.num_faces();
    let report_step = (n_faces / 50).max(1);
    let mut samples: Vec<Vec3> = Vec::new();
    let mut errors = SampleErrors::new();
    // The previous sample and its distance seed the ring scan of the next
    // one; samples of consecutive faces are usually close together.
    let mut prev_p = Vec3::ZERO;
    let mut prev_d = 0.0f64;

    for f in 0..n_faces {
        if !quiet && f != 0 && f % report_step == 0 {
            log::info!("distance pass: {} %", 100 * f / (n_faces - 1).max(1));
        }
        let [a, b, c] = m1.face_vertices(f);
        let n = sampling_freq(a, b, c, sampling_step, min_sample_freq);
        stats.m1_samples += n * (n + 1) / 2;
        sample_triangle(a, b, c, n, &mut samples);
        errors.reset(n);
        for &s in &samples {
            let d = kernel::dist_pt_surf(s, &tl2, &grid, &mut cache, prev_p, prev_d)?;
            errors.push(d);
            prev_p = s;
            prev_d = d;
        }
        let fe = errors.face_error(tri_area(a, b, c));
        stats.m1_area += fe.face_area;
        stats.min_dist = stats.min_dist.min(fe.min_error);
        stats.max_dist = stats.max_dist.max(fe.max_error);
        stats.mean_dist += fe.mean_error * fe.face_area;
        stats.rms_dist += fe.mean_sqr_error * fe.face_area;
        face_errors.push(fe);
    }

    stats.mean_dist /= stats.m1_area;
    stats.rms_dist = (stats.rms_dist / stats.m1_area).sqrt();
    Ok((face_errors, stats))
}

/// Options for [`compare`].
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Sampling step as a fraction of the bounding-box diagonal of the
    /// target mesh.
    pub sampling_step: f64,
    /// Minimum per-direction sampling frequency; 0 disables the floor.
    pub min_sample_freq: usize,
    /// Also run the swapped pass and derive the symmetric statistics.
    pub symmetric: bool,
    /// Suppress progress logging.
    pub quiet: bool,
    /// Derive vertex normals for a target mesh that carries none.
    pub compute_target_normals: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            sampling_step: 0.005,
            min_sample_freq: 0,
            symmetric: false,
            quiet: false,
            compute_target_normals: false,
        }
    }
}

/// Symmetric (Hausdorff) statistics: the max of the two directional
/// values for each metric.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SymmetricStats {
    pub min_dist: f64,
    pub max_dist: f64,
    pub mean_dist: f64,
    pub rms_dist: f64,
}

/// Result of a mesh-to-mesh comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// The absolute sampling step used by both passes.
    pub abs_sampling_step: f64,
    /// Per-face errors of the forward (m1 to m2) pass.
    pub face_errors: Vec<FaceError>,
    /// Statistics of the forward pass.
    pub forward: DistSurfSurfStats,
    /// Statistics of the swapped pass, in symmetric mode.
    pub backward: Option<DistSurfSurfStats>,
    /// Symmetric statistics, in symmetric mode.
    pub symmetric: Option<SymmetricStats>,
    /// Derived target vertex normals, when requested and not present in
    /// the input.
    pub target_normals: Option<Vec<Vec3>>,
}

/// Runs the full comparison pipeline between `m1` and `m2`.
///
/// The sampling step is scaled by the bounding-box diagonal of `m2` and
/// used, as an absolute length, for both directions. In symmetric mode
/// the pipeline runs twice with the roles swapped and no shared state;
/// each symmetric statistic is the max of the two directional values.
pub fn compare(m1: &Mesh, m2: &Mesh, options: &CompareOptions) -> Result<Comparison> {
    let abs_sampling_step = options.sampling_step * m2.bbox_diagonal();
    log::debug!("sampling step {abs_sampling_step:.6e}");

    let (face_errors, forward) =
        dist_surf_surf(m1, m2, abs_sampling_step, options.min_sample_freq, options.quiet)?;

    let mut backward = None;
    let mut symmetric = None;
    if options.symmetric {
        let (_, rev) =
            dist_surf_surf(m2, m1, abs_sampling_step, options.min_sample_freq, options.quiet)?;
        symmetric = Some(SymmetricStats {
            min_dist: forward.min_dist.max(rev.min_dist),
            max_dist: forward.max_dist.max(rev.max_dist),
            mean_dist: forward.mean_dist.max(rev.mean_dist),
            rms_dist: forward.rms_dist.max(rev.rms_dist),
        });
        backward = Some(rev);
    }

    let target_normals = if options.compute_target_normals
        && m2.vertex_normals().is_none()
        && m2.face_normals().is_none()
    {
        Some(vertex_normals_oriented(m2))
    } else {
        None
    };

    Ok(Comparison {
        abs_sampling_step,
        face_errors,
        forward,
        backward,
        symmetric,
        target_normals,
    })
}

/// Vertex normals of `mesh` as the area-weighted average of the incident
/// face normals, assuming consistent orientation. For a non-oriented mesh
/// the result is meaningless but well defined.
#[must_use]
pub fn vertex_normals_oriented(mesh: &Mesh) -> Vec<Vec3> {
    let tl = TriangleList::from_mesh(mesh);
    let mut sums = vec![DVec3::ZERO; mesh.num_vertices()];
    for (f, face) in mesh.faces().iter().enumerate() {
        let t = &tl.triangles[f];
        let weighted = t.normal() * t.area();
        for &v in face {
            sums[v as usize] += weighted;
        }
    }
    sums.iter()
        .map(|n| n.as_vec3().normalize_or_zero())
        .collect()
}

/// Attributes the per-face errors back to the vertices: each vertex gets
/// the area-weighted mean of the mean errors of its incident faces.
#[must_use]
pub fn vertex_errors(mesh: &Mesh, face_errors: &[FaceError]) -> Vec<f64> {
    mesh.faces_of_vertex()
        .iter()
        .map(|faces| {
            let mut area = 0.0;
            let mut sum = 0.0;
            for &f in faces {
                let fe = &face_errors[f as usize];
                area += fe.face_area;
                sum += fe.mean_error * fe.face_area;
            }
            if area > 0.0 {
                sum / area
            } else {
                0.0
            }
        })
        .collect()
}
