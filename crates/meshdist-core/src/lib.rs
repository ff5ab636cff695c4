//! Core primitives for meshdist-rs.
//!
//! This crate provides the building blocks shared by the mesh loader and the
//! distance engine:
//! - [`MeshError`] / [`Result`] — the error taxonomy used across the workspace
//! - [`Aabb`] and assorted geometric helpers
//! - [`TriangleInfo`] — per-triangle derived data and the point-to-triangle
//!   distance primitive
//! - uniform parametric triangle sampling

// Kernel code converts freely between f32 storage and f64 arithmetic, and
// between index types bounded by the grid cell cap.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
// Documentation lints: error conditions are described on the error type.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Variable naming: short names (a, b, c, u, v) are clear in geometric context.
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod error;
pub mod geom;
pub mod sample;
pub mod triangle;

pub use error::{MeshError, Result};
pub use geom::{tri_area, Aabb, DEGENERACY_FLOOR};
pub use sample::{sample_triangle, sampling_freq};
pub use triangle::TriangleInfo;

// Re-export glam types for convenience
pub use glam::{DVec3, Vec3};
