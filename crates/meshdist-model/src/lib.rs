//! Canonical mesh representation and multi-format loader for meshdist-rs.
//!
//! [`Mesh`] holds the vertex, face and optional normal arrays of a
//! triangular mesh together with its bounding box. [`read_model`] parses a
//! byte stream in any of the supported formats (ASCII RAW, OFF, SMF, a
//! VRML 2.0 `IndexedFaceSet` subset, an Inventor 2.x subset), with
//! autodetection from the first bytes.

// Index and count conversions are bounded by the loader's validation.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod mesh;
mod reader;

pub use mesh::Mesh;
pub use reader::{read_model, read_model_file, Format};

// Re-export the shared error type for loader callers.
pub use meshdist_core::{MeshError, Result};
