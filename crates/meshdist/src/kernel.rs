//! Point-to-surface distance via outward ring expansion over the cell
//! grid.

use glam::{DVec3, Vec3};
use meshdist_core::{MeshError, Result};

use crate::grid::CellGrid;
use crate::ring::RingCache;
use crate::stats::GridSize;
use crate::triangles::TriangleList;

const SQRT_1_3: f64 = 0.577_350_269_189_625_8;

/// Euclidean distance from `p` to the closest point anywhere on the
/// surface described by `tl` and its cell grid.
///
/// `(prev_p, prev_d)` is the previous sample and its distance; by the
/// triangle inequality the surface cannot be closer to `p` than
/// `prev_d - |p - prev_p|`, which lets the scan start past the rings that
/// cannot contain the minimum. Pass the origin and 0.0 for the first call.
///
/// Scanning each ring, cells whose lower-bound distance already exceeds
/// the best value are skipped without touching their triangles. The scan
/// stops once no cell of any further ring can improve the minimum, or all
/// rings are exhausted. A non-finite result aborts with
/// [`MeshError::NumericAbort`].
pub(crate) fn dist_pt_surf(
    p: Vec3,
    tl: &TriangleList,
    grid: &CellGrid,
    cache: &mut RingCache,
    prev_p: Vec3,
    prev_d: f64,
) -> Result<f64> {
    let pd = p.as_dvec3();
    let p_rel = pd - grid.origin();
    let size = grid.size();
    let cell_sz = grid.cell_sz();
    let coord = grid.grid_coord(p_rel);
    let center_idx =
        coord.0 as usize + coord.1 as usize * size.x + coord.2 as usize * size.x * size.y;

    // Lower-bound seed from the previous sample, biased two rings down.
    let dmin_seed = prev_d - pd.distance(prev_p.as_dvec3());
    let kmax = size.max_dim() as i64;
    let mut k = ((dmin_seed * SQRT_1_3 / cell_sz).floor() as i64 - 2).clamp(0, kmax - 1);

    let cell_sz_sqr = cell_sz * cell_sz;
    let mut dmin_sqr = f64::MAX;
    loop {
        for &cell in cache.ring(grid, coord, center_idx, k as usize) {
            let cell = cell as usize;
            if dmin_sqr < dist_sqr_pt_cell(p_rel, coord, cell, size, cell_sz) {
                continue;
            }
            for &t in grid.triangles_in(cell) {
                let d2 = tl.triangles[t as usize].dist_sqr_to_point(pd);
                if d2 < dmin_sqr {
                    dmin_sqr = d2;
                }
            }
        }
        k += 1;
        // No cell at ring >= k can hold a point closer than (k * cell_sz).
        if k >= kmax || dmin_sqr < (k * k) as f64 * cell_sz_sqr {
            break;
        }
    }

    if dmin_sqr >= f64::MAX || dmin_sqr.is_nan() || dmin_sqr < 0.0 {
        log::error!("NaN or infinite value in model, aborting the distance computation");
        return Err(MeshError::NumericAbort);
    }
    Ok(dmin_sqr.sqrt())
}

/// Squared lower-bound distance from a point (relative to the grid
/// origin) to the cell with linear index `cell_idx`. Each axis where the
/// point sits outside the cell's slab contributes its squared gap.
fn dist_sqr_pt_cell(
    p_rel: DVec3,
    (gx, gy, gz): (i64, i64, i64),
    cell_idx: usize,
    size: GridSize,
    cell_sz: f64,
) -> f64 {
    let stride_z = size.x * size.y;
    let o = (cell_idx / stride_z) as i64;
    let rem = cell_idx % stride_z;
    let n = (rem / size.x) as i64;
    let m = (rem % size.x) as i64;

    let mut d2 = 0.0;
    if gx != m {
        let t = if m > gx {
            m as f64 * cell_sz - p_rel.x
        } else {
            p_rel.x - (m + 1) as f64 * cell_sz
        };
        d2 += t * t;
    }
    if gy != n {
        let t = if n > gy {
            n as f64 * cell_sz - p_rel.y
        } else {
            p_rel.y - (n + 1) as f64 * cell_sz
        };
        d2 += t * t;
    }
    if gz != o {
        let t = if o > gz {
            o as f64 * cell_sz - p_rel.z
        } else {
            p_rel.z - (o + 1) as f64 * cell_sz
        };
        d2 += t * t;
    }
    d2
}
