//! Uniform cubic cell grid over the union bounding box.
//!
//! Each cell maps to the triangles that intersect it. The lists live in
//! one contiguous buffer addressed by a per-cell offset table, and a
//! packed bitmap flags the empty cells for the ring enumerator.

use glam::{DVec3, Vec3};
use meshdist_core::{sample_triangle, Aabb, MeshError, Result, DEGENERACY_FLOOR};

use crate::stats::GridSize;
use crate::triangles::TriangleList;

/// Maximum number of cells in the grid.
pub(crate) const GRID_CELLS_MAX: usize = 512_000;

/// Ratio between the cubic cell side and the side of an average
/// equilateral triangle of the target mesh.
const CELL_TRIAG_RATIO: f64 = 3.0;

pub(crate) struct CellGrid {
    cell_sz: f64,
    size: GridSize,
    min: DVec3,
    /// Offset of each cell's span in `tri_idx`; length `n_cells + 1`.
    offsets: Vec<usize>,
    /// Concatenated triangle lists of all cells.
    tri_idx: Vec<u32>,
    /// One bit per cell, set when the cell holds no triangle.
    empty: Vec<u64>,
}

impl CellGrid {
    /// Partitions `bounds` into cubic cells and lists the triangles of
    /// `tl` intersecting each cell.
    pub fn build(tl: &TriangleList, bounds: &Aabb) -> Result<Self> {
        let (cell_sz, size) = cell_size_for(tl, bounds)?;
        log::debug!(
            "cell grid {}x{}x{}, cell size {cell_sz:.6e}",
            size.x,
            size.y,
            size.z
        );
        let min = bounds.min.as_dvec3();
        let n_cells = size.total();

        // Pass 1: gather (cell, triangle) incidence pairs.
        let mut pairs: Vec<(u32, u32)> = Vec::new();
        let mut samples: Vec<Vec3> = Vec::new();
        let mut touched: Vec<usize> = Vec::new();
        for (t, tri) in tl.triangles.iter().enumerate() {
            let t = t as u32;
            let ca = cell_coord(tri.a(), min, cell_sz, size);
            let cb = cell_coord(tri.b(), min, cell_sz, size);
            let cc = cell_coord(tri.c(), min, cell_sz, size);
            if ca == cb && ca == cc {
                // The triangle fits entirely into one cell.
                pairs.push((linear(ca, size) as u32, t));
                continue;
            }
            // Sample the triangle with twice the samples in any direction
            // as the number of cells it spans in that direction.
            let span = chebyshev_span(ca, cb, cc);
            let n_samples = 2 * (span + 1);
            sample_triangle(
                tri.a().as_vec3(),
                tri.b().as_vec3(),
                tri.c().as_vec3(),
                n_samples,
                &mut samples,
            );
            touched.clear();
            let mut prev = usize::MAX;
            for &s in &samples {
                let cell = linear(cell_coord(s.as_dvec3(), min, cell_sz, size), size);
                if cell != prev {
                    if !touched.contains(&cell) {
                        touched.push(cell);
                    }
                    prev = cell;
                }
            }
            for &cell in &touched {
                pairs.push((cell as u32, t));
            }
        }

        // Pass 2: counting sort into the offset table, preserving triangle
        // order within each cell.
        let mut offsets = vec![0usize; n_cells + 1];
        for &(cell, _) in &pairs {
            offsets[cell as usize + 1] += 1;
        }
        for c in 1..=n_cells {
            offsets[c] += offsets[c - 1];
        }
        let mut tri_idx = vec![0u32; pairs.len()];
        let mut cursor = offsets.clone();
        for &(cell, t) in &pairs {
            tri_idx[cursor[cell as usize]] = t;
            cursor[cell as usize] += 1;
        }

        let mut empty = vec![0u64; n_cells.div_ceil(64)];
        for c in 0..n_cells {
            if offsets[c] == offsets[c + 1] {
                empty[c / 64] |= 1 << (c % 64);
            }
        }

        Ok(Self {
            cell_sz,
            size,
            min,
            offsets,
            tri_idx,
            empty,
        })
    }

    pub fn cell_sz(&self) -> f64 {
        self.cell_sz
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn n_cells(&self) -> usize {
        self.size.total()
    }

    /// Grid origin (the union bounding-box minimum).
    pub fn origin(&self) -> DVec3 {
        self.min
    }

    pub fn is_empty_cell(&self, cell: usize) -> bool {
        self.empty[cell / 64] & (1 << (cell % 64)) != 0
    }

    /// Triangle indices intersecting `cell`.
    pub fn triangles_in(&self, cell: usize) -> &[u32] {
        &self.tri_idx[self.offsets[cell]..self.offsets[cell + 1]]
    }

    /// Clamped grid coordinates of a point given relative to the origin.
    /// Points of the source mesh can fall outside the grid.
    pub fn grid_coord(&self, p_rel: DVec3) -> (i64, i64, i64) {
        let clamp = |v: f64, dim: usize| -> i64 {
            let g = (v / self.cell_sz).floor() as i64;
            g.clamp(0, dim as i64 - 1)
        };
        (
            clamp(p_rel.x, self.size.x),
            clamp(p_rel.y, self.size.y),
            clamp(p_rel.z, self.size.z),
        )
    }

    #[cfg(test)]
    pub fn synthetic(size: GridSize, cell_sz: f64, occupied: &[usize]) -> Self {
        let n_cells = size.total();
        let mut offsets = vec![0usize; n_cells + 1];
        for &c in occupied {
            offsets[c + 1] += 1;
        }
        for c in 1..=n_cells {
            offsets[c] += offsets[c - 1];
        }
        let mut empty = vec![0u64; n_cells.div_ceil(64)];
        for c in 0..n_cells {
            if offsets[c] == offsets[c + 1] {
                empty[c / 64] |= 1 << (c % 64);
            }
        }
        Self {
            cell_sz,
            size,
            min: DVec3::ZERO,
            offsets,
            tri_idx: vec![0; occupied.len()],
            empty,
        }
    }
}

/// Derives the cubic cell side from the average triangle area of the
/// target, then enlarges it until the grid fits the cell cap.
fn cell_size_for(tl: &TriangleList, bounds: &Aabb) -> Result<(f64, GridSize)> {
    let avg_area = tl.total_area / tl.triangles.len() as f64;
    let mut cell_sz = CELL_TRIAG_RATIO * (avg_area * 2.0 / 3.0f64.sqrt()).sqrt();
    if cell_sz < DEGENERACY_FLOOR {
        cell_sz = DEGENERACY_FLOOR;
    } else if cell_sz >= f64::MAX / 1e10 {
        log::error!("coordinate overflow deriving the cell size; are the models OK?");
        return Err(MeshError::NumericAbort);
    }

    let span = (bounds.max - bounds.min).as_dvec3();
    let dims = |cell: f64| -> (f64, f64, f64) {
        (
            (span.x / cell).ceil().max(1.0),
            (span.y / cell).ceil().max(1.0),
            (span.z / cell).ceil().max(1.0),
        )
    };
    let (mut gx, mut gy, mut gz) = dims(cell_sz);
    while gx * gy * gz > GRID_CELLS_MAX as f64 {
        // Grow by the cube root of the overrun; the lower bound keeps the
        // loop moving when the ceils refuse to drop.
        let ratio = gx * gy * gz / GRID_CELLS_MAX as f64;
        cell_sz *= ratio.cbrt().max(1.001);
        (gx, gy, gz) = dims(cell_sz);
    }
    Ok((
        cell_sz,
        GridSize {
            x: gx as usize,
            y: gy as usize,
            z: gz as usize,
        },
    ))
}

/// Clamped cell coordinates of a point.
fn cell_coord(p: DVec3, min: DVec3, cell_sz: f64, size: GridSize) -> (i64, i64, i64) {
    let clamp = |v: f64, dim: usize| -> i64 {
        (((v / cell_sz) as i64).max(0)).min(dim as i64 - 1)
    };
    let rel = p - min;
    (
        clamp(rel.x, size.x),
        clamp(rel.y, size.y),
        clamp(rel.z, size.z),
    )
}

fn linear((x, y, z): (i64, i64, i64), size: GridSize) -> usize {
    x as usize + y as usize * size.x + z as usize * size.x * size.y
}

fn chebyshev_span(a: (i64, i64, i64), b: (i64, i64, i64), c: (i64, i64, i64)) -> usize {
    let axis = |p: i64, q: i64, r: i64| -> i64 {
        (p - q).abs().max((p - r).abs()).max((q - r).abs())
    };
    let d = axis(a.0, b.0, c.0)
        .max(axis(a.1, b.1, c.1))
        .max(axis(a.2, b.2, c.2));
    d as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use meshdist_model::Mesh;

    fn unit_cube() -> Mesh {
        let v = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let f = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [3, 0, 4],
            [3, 4, 7],
        ];
        Mesh::new(v, f).unwrap()
    }

    #[test]
    fn test_unit_cube_fits_one_cell() {
        let m = unit_cube();
        let tl = TriangleList::from_mesh(&m);
        let grid = CellGrid::build(&tl, &m.bounds()).unwrap();
        assert_eq!(grid.size(), GridSize { x: 1, y: 1, z: 1 });
        assert_eq!(grid.triangles_in(0).len(), 12);
        assert!(!grid.is_empty_cell(0));
    }

    #[test]
    fn test_triangles_listed_in_vertex_cells_without_duplicates() {
        // Two skinny triangles spanning many cells along x.
        let m = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.01, 0.0),
                Vec3::new(10.0, 0.01, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap();
        let tl = TriangleList::from_mesh(&m);
        let grid = CellGrid::build(&tl, &m.bounds()).unwrap();
        assert!(grid.size().x > 1);
        for (t, tri) in tl.triangles.iter().enumerate() {
            for corner in [tri.a(), tri.b(), tri.c()] {
                let cell = linear(
                    cell_coord(corner, grid.origin(), grid.cell_sz(), grid.size()),
                    grid.size(),
                );
                assert!(
                    grid.triangles_in(cell).contains(&(t as u32)),
                    "triangle {t} missing from its corner cell {cell}"
                );
            }
        }
        for c in 0..grid.n_cells() {
            let list = grid.triangles_in(c);
            let mut seen = list.to_vec();
            seen.dedup();
            assert_eq!(seen.len(), list.len(), "duplicate triangle in cell {c}");
            assert_eq!(grid.is_empty_cell(c), list.is_empty());
        }
    }

    #[test]
    fn test_cell_cap_enforced() {
        // Two tiny far-apart triangles make the natural cell size explode
        // the cell count; the builder must grow it back under the cap.
        let m = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.001, 0.0, 0.0),
                Vec3::new(0.0, 0.001, 0.0),
                Vec3::new(100.0, 100.0, 100.0),
                Vec3::new(100.001, 100.0, 100.0),
                Vec3::new(100.0, 100.001, 100.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let tl = TriangleList::from_mesh(&m);
        let natural =
            CELL_TRIAG_RATIO * (tl.total_area / 2.0 * 2.0 / 3.0f64.sqrt()).sqrt();
        let grid = CellGrid::build(&tl, &m.bounds()).unwrap();
        assert!(grid.n_cells() <= GRID_CELLS_MAX);
        assert!(grid.cell_sz() > natural * 100.0);
    }
}
