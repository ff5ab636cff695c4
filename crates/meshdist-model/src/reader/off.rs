//! OFF recognizer.
//!
//! Header line containing `OFF`, a `nv nf ne` count line, `nv` coordinate
//! lines (trailing fields ignored) and `nf` face lines of the form
//! `order i j k` where the order must be 3.

use std::io::Read;

use glam::Vec3;
use meshdist_core::{MeshError, Result};

use super::stream::TokenStream;
use crate::mesh::Mesh;

pub(crate) fn read<R: Read>(data: &mut TokenStream<R>) -> Result<Mesh> {
    // The header must be the first non-comment line.
    data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    let header = data.read_line().ok_or(MeshError::Corrupted)?;
    if !header.contains("OFF") {
        return Err(MeshError::Corrupted);
    }

    data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    let nv = data.read_int().ok_or(MeshError::Corrupted)?;
    let nf = data.read_int().ok_or(MeshError::Corrupted)?;
    let _ne = data.read_int().ok_or(MeshError::Corrupted)?;
    if nv < 3 || nf <= 0 {
        return Err(MeshError::Model("bad element counts"));
    }
    let nv = nv as usize;
    let nf = nf as usize;

    let mut vertices = Vec::new();
    vertices.try_reserve_exact(nv).map_err(|_| MeshError::NoMem)?;
    for _ in 0..nv {
        let x = data.read_float().ok_or(MeshError::Corrupted)?;
        let y = data.read_float().ok_or(MeshError::Corrupted)?;
        let z = data.read_float().ok_or(MeshError::Corrupted)?;
        // Color or other trailing fields on the vertex line are ignored.
        data.skip_to_eol().ok_or(MeshError::Corrupted)?;
        vertices.push(Vec3::new(x, y, z));
    }

    let mut faces = Vec::new();
    faces.try_reserve_exact(nf).map_err(|_| MeshError::NoMem)?;
    for i in 0..nf {
        let order = data.read_int().ok_or(MeshError::Corrupted)?;
        if order != 3 {
            return Err(MeshError::NotTriangular);
        }
        let f0 = data.read_int().ok_or(MeshError::Corrupted)?;
        let f1 = data.read_int().ok_or(MeshError::Corrupted)?;
        let f2 = data.read_int().ok_or(MeshError::Corrupted)?;
        if data.skip_to_eol().is_none() && i < nf - 1 {
            return Err(MeshError::Corrupted);
        }
        let limit = nv as i64;
        if f0 < 0 || f0 >= limit || f1 < 0 || f1 >= limit || f2 < 0 || f2 >= limit {
            return Err(MeshError::Model("face index out of range"));
        }
        faces.push([f0 as u32, f1 as u32, f2 as u32]);
    }

    Mesh::new(vertices, faces)
}
