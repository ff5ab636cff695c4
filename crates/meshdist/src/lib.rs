//! meshdist-rs: Hausdorff-style distance between triangular meshes.
//!
//! The engine samples every face of a source mesh and measures, for each
//! sample, the Euclidean distance to the closest point anywhere on the
//! target surface (not merely its vertices). Per-face and aggregate
//! min/max/mean/RMS statistics are derived from the samples, with means
//! weighted by face area. A uniform cubic cell grid over the union
//! bounding box, combined with a lazily built per-cell ring cache, bounds
//! the search for the closest triangle.
//!
//! # Quick start
//!
//! ```
//! use meshdist::{compare, CompareOptions, Mesh, Vec3};
//!
//! # fn main() -> meshdist::Result<()> {
//! let m1 = Mesh::new(
//!     vec![
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )?;
//! let m2 = Mesh::new(
//!     vec![
//!         Vec3::new(0.0, 0.0, 0.5),
//!         Vec3::new(1.0, 0.0, 0.5),
//!         Vec3::new(0.0, 1.0, 0.5),
//!     ],
//!     vec![[0, 1, 2]],
//! )?;
//!
//! let result = compare(&m1, &m2, &CompareOptions {
//!     sampling_step: 0.05,
//!     symmetric: true,
//!     quiet: true,
//!     ..CompareOptions::default()
//! })?;
//! assert!((result.forward.max_dist - 0.5).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! Meshes are usually loaded with [`read_model_file`], which autodetects
//! the input format (ASCII RAW, OFF, SMF, VRML 2.0 `IndexedFaceSet`,
//! Inventor 2.x).

// Distances, counts and grid indices convert freely between the integer
// widths bounded by the grid cap.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

mod driver;
mod grid;
mod kernel;
mod ring;
pub mod report;
mod stats;
mod triangles;

pub use driver::{
    compare, dist_surf_surf, vertex_errors, vertex_normals_oriented, Comparison, CompareOptions,
    SymmetricStats,
};
pub use stats::{DistSurfSurfStats, FaceError, GridSize};

// Re-export the model layer and shared types for embedders.
pub use meshdist_core::{tri_area, Aabb, MeshError, Result, TriangleInfo};
pub use meshdist_model::{read_model, read_model_file, Format, Mesh};

// Re-export glam types for convenience
pub use glam::{DVec3, Vec3};
