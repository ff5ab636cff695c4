//! Per-face and aggregate error statistics.

use serde::Serialize;

/// Per-face error metrics for one source-mesh face.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceError {
    /// Area of the face, the weight used by the global averages.
    pub face_area: f64,
    /// Minimum sample error of the face.
    pub min_error: f64,
    /// Maximum sample error of the face.
    pub max_error: f64,
    /// Mean error over the face surface.
    pub mean_error: f64,
    /// Mean squared error over the face surface.
    pub mean_sqr_error: f64,
}

/// Cell counts of the partitioning grid in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridSize {
    /// Total number of cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Largest dimension, the bound for the ring expansion.
    #[must_use]
    pub fn max_dim(&self) -> usize {
        self.x.max(self.y).max(self.z)
    }
}

/// Aggregate statistics of one directional distance pass.
#[derive(Debug, Clone, Serialize)]
pub struct DistSurfSurfStats {
    /// Surface area of the sampled (source) mesh.
    pub m1_area: f64,
    /// Surface area of the target mesh.
    pub m2_area: f64,
    /// Minimum sample distance.
    pub min_dist: f64,
    /// Maximum sample distance.
    pub max_dist: f64,
    /// Area-weighted mean distance.
    pub mean_dist: f64,
    /// Area-weighted root-mean-square distance.
    pub rms_dist: f64,
    /// Total number of samples taken on the source mesh.
    pub m1_samples: usize,
    /// Side length of the cubic partitioning cells.
    pub cell_sz: f64,
    /// Partitioning grid dimensions.
    pub grid_sz: GridSize,
}

/// Sample errors of one triangle in the sampler's `(i, j)` layout:
/// sample `(i, j)` sits at linear position `row_start(i) + j`, with `i`
/// from 0 to `n - 1` and `j` from 0 to `n - i - 1`.
pub(crate) struct SampleErrors {
    n: usize,
    err: Vec<f64>,
}

impl SampleErrors {
    pub fn new() -> Self {
        Self { n: 0, err: Vec::new() }
    }

    /// Clears the buffer for a triangle sampled at frequency `n`.
    pub fn reset(&mut self, n: usize) {
        self.n = n;
        self.err.clear();
        self.err.reserve(n * (n + 1) / 2);
    }

    /// Appends the error of the next sample, in sampling order.
    pub fn push(&mut self, e: f64) {
        self.err.push(e);
    }

    fn row_start(&self, i: usize) -> usize {
        i * self.n - (i * i - i) / 2
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.err[self.row_start(i) + j]
    }

    /// Folds the sample errors into the per-face metrics.
    ///
    /// The mean is taken over the micro-triangles formed by neighboring
    /// samples, which all have equal area: a linear interpolant over a
    /// triangle with corner values `e1, e2, e3` integrates to
    /// `(e1+e2+e3)/3`, and its square to
    /// `(e1^2+e2^2+e3^2+e1*e2+e2*e3+e1*e3)/6`.
    pub fn face_error(&self, face_area: f64) -> FaceError {
        debug_assert_eq!(self.err.len(), self.n * (self.n + 1) / 2);
        let n = self.n;
        let mut err_min = f64::MAX;
        let mut err_max = 0.0f64;
        for &e in &self.err {
            err_min = err_min.min(e);
            err_max = err_max.max(e);
        }
        let (mean_error, mean_sqr_error) = if n == 1 {
            (self.err[0], self.err[0] * self.err[0])
        } else {
            let mut err_tot = 0.0;
            let mut err_sqr_tot = 0.0;
            // "Up" micro-triangles, (n-1)*n/2 of them.
            for i in 0..n - 1 {
                for j in 0..n - 1 - i {
                    let (a, b, c) = (self.at(i, j), self.at(i, j + 1), self.at(i + 1, j));
                    err_tot += a + b + c;
                    err_sqr_tot += a * (a + b + c) + b * (b + c) + c * c;
                }
            }
            // "Down" micro-triangles, (n-2)*(n-1)/2 of them.
            for i in 1..n {
                for j in 1..n - i {
                    let (a, b, c) = (self.at(i - 1, j), self.at(i, j - 1), self.at(i, j));
                    err_tot += a + b + c;
                    err_sqr_tot += a * (a + b + c) + b * (b + c) + c * c;
                }
            }
            let n_tri = (n - 1) * n / 2 + (n - 2) * (n - 1) / 2;
            (
                err_tot / (n_tri * 3) as f64,
                err_sqr_tot / (n_tri * 6) as f64,
            )
        };
        FaceError {
            face_area,
            min_error: err_min,
            max_error: err_max,
            mean_error,
            mean_sqr_error,
        }
    }
}
