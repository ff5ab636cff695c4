//! Lazy per-cell cache of the non-empty cells at each ring distance.
//!
//! For a center cell, the list at ring index `k` holds the non-empty
//! cells of the shell at Chebyshev distance `k + 1` (the list at index 0
//! also holds the center cell itself). Lists are built on first use and
//! never change afterwards; the cache lives for one distance pass.

use crate::grid::CellGrid;

pub(crate) struct RingCache {
    rings: Vec<Vec<Option<Vec<u32>>>>,
}

impl RingCache {
    pub fn new(n_cells: usize) -> Self {
        Self {
            rings: vec![Vec::new(); n_cells],
        }
    }

    /// The ring list of `center` at ring index `k`, building it if this is
    /// the first visit.
    pub fn ring(
        &mut self,
        grid: &CellGrid,
        center: (i64, i64, i64),
        center_idx: usize,
        k: usize,
    ) -> &[u32] {
        let entry = &mut self.rings[center_idx];
        if entry.len() <= k {
            entry.resize(k + 1, None);
        }
        if entry[k].is_none() {
            entry[k] = Some(cells_at_distance(grid, center, k));
        }
        entry[k].as_deref().unwrap_or_default()
    }
}

/// Enumerates the non-empty cells of the shell around `center`, walking
/// the six face slabs at displacement `d = k + 1`: the x layers span the
/// inner +/-k square, the y layers take the full +/-d range in x, and the
/// z layers the full +/-d range in both, so every shell cell is emitted
/// exactly once. Approximately orders cells by increasing distance.
fn cells_at_distance(grid: &CellGrid, center: (i64, i64, i64), k: usize) -> Vec<u32> {
    let size = grid.size();
    let (gx, gy, gz) = (size.x as i64, size.y as i64, size.z as i64);
    let stride_z = gx * gy;
    let (cx, cy, cz) = center;
    let mut cells = Vec::new();
    let mut push = |cells: &mut Vec<u32>, idx: i64| {
        if !grid.is_empty_cell(idx as usize) {
            cells.push(idx as u32);
        }
    };

    if k == 0 {
        push(&mut cells, cx + cy * gx + cz * stride_z);
    }

    let d = k as i64 + 1;
    let min_o = (cz - d + 1).max(0);
    let max_o = (cz + d - 1).min(gz - 1);
    let min_n = (cy - d + 1).max(0);
    let max_n = (cy + d - 1).min(gy - 1);

    // Left and right x layers.
    let m1 = cx - d;
    let m2 = cx + d;
    for o in min_o..=max_o {
        for n in min_n..=max_n {
            let base = n * gx + o * stride_z;
            if m1 >= 0 {
                push(&mut cells, m1 + base);
            }
            if m2 < gx {
                push(&mut cells, m2 + base);
            }
        }
    }

    // Back and front y layers.
    let min_m = (cx - d).max(0);
    let max_m = (cx + d).min(gx - 1);
    let n1 = cy - d;
    let n2 = cy + d;
    for o in min_o..=max_o {
        for m in min_m..=max_m {
            let base = m + o * stride_z;
            if n1 >= 0 {
                push(&mut cells, base + n1 * gx);
            }
            if n2 < gy {
                push(&mut cells, base + n2 * gx);
            }
        }
    }

    // Bottom and top z layers.
    let min_n = (cy - d).max(0);
    let max_n = (cy + d).min(gy - 1);
    let o1 = cz - d;
    let o2 = cz + d;
    for n in min_n..=max_n {
        for m in min_m..=max_m {
            let base = m + n * gx;
            if o1 >= 0 {
                push(&mut cells, base + o1 * stride_z);
            }
            if o2 < gz {
                push(&mut cells, base + o2 * stride_z);
            }
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::GridSize;

    fn full_grid(x: usize, y: usize, z: usize) -> CellGrid {
        let size = GridSize { x, y, z };
        let occupied: Vec<usize> = (0..size.total()).collect();
        CellGrid::synthetic(size, 1.0, &occupied)
    }

    fn unflatten(idx: u32, size: GridSize) -> (i64, i64, i64) {
        let idx = idx as usize;
        let stride_z = size.x * size.y;
        (
            (idx % size.x) as i64,
            ((idx % stride_z) / size.x) as i64,
            (idx / stride_z) as i64,
        )
    }

    #[test]
    fn test_rings_partition_the_grid() {
        let grid = full_grid(5, 5, 5);
        let center = (2i64, 2i64, 2i64);
        let center_idx = 2 + 2 * 5 + 2 * 25;
        let mut cache = RingCache::new(grid.n_cells());
        let mut seen = vec![false; grid.n_cells()];
        for k in 0..3 {
            for &c in cache.ring(&grid, center, center_idx, k) {
                assert!(!seen[c as usize], "cell {c} listed twice");
                seen[c as usize] = true;
                let (x, y, z) = unflatten(c, grid.size());
                let cheb = (x - 2).abs().max((y - 2).abs()).max((z - 2).abs());
                let expected = if k == 0 { 0..=1 } else { (k as i64 + 1)..=(k as i64 + 1) };
                assert!(expected.contains(&cheb));
            }
        }
        assert!(seen.iter().all(|&s| s), "rings did not cover the grid");
    }

    #[test]
    fn test_ring_sizes_in_the_interior() {
        // Far from the boundary a shell at distance d has (2d+1)^3 -
        // (2d-1)^3 cells; ring 0 adds the center cell.
        let grid = full_grid(9, 9, 9);
        let center = (4i64, 4i64, 4i64);
        let center_idx = 4 + 4 * 9 + 4 * 81;
        let mut cache = RingCache::new(grid.n_cells());
        assert_eq!(cache.ring(&grid, center, center_idx, 0).len(), 27);
        assert_eq!(cache.ring(&grid, center, center_idx, 1).len(), 125 - 27);
        assert_eq!(cache.ring(&grid, center, center_idx, 2).len(), 343 - 125);
    }

    #[test]
    fn test_empty_cells_are_not_listed() {
        let size = GridSize { x: 3, y: 3, z: 3 };
        // Only the two x-extreme cells of the middle row are occupied.
        let grid = CellGrid::synthetic(size, 1.0, &[12, 14]);
        let mut cache = RingCache::new(grid.n_cells());
        let ring0 = cache.ring(&grid, (1, 1, 1), 13, 0).to_vec();
        assert_eq!(ring0, vec![12, 14]);
    }

    #[test]
    fn test_clamping_at_the_boundary() {
        let grid = full_grid(3, 3, 3);
        let mut cache = RingCache::new(grid.n_cells());
        // From a corner, ring 0 must cover the center cell plus the full
        // 2x2x2 block around the corner minus the corner's 7 neighbors...
        // simply: center + the 7 other cells of the 2x2x2 corner block.
        let cells = cache.ring(&grid, (0, 0, 0), 0, 0);
        assert_eq!(cells.len(), 8);
    }
}
