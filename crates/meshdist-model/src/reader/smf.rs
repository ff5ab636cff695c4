//! SMF recognizer (the QSlim flavor).
//!
//! Line oriented: `v x y z` declares a vertex, `f i j k` a face with
//! 1-based indices. Color, binding, transform and begin/end lines are
//! skipped silently.

use std::io::Read;

use glam::Vec3;
use meshdist_core::{MeshError, Result};

use super::stream::TokenStream;
use crate::mesh::Mesh;

pub(crate) fn read<R: Read>(data: &mut TokenStream<R>) -> Result<Mesh> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();
    let mut max_vidx: i64 = -1;

    loop {
        if data.skip_ws_comm().is_none() {
            break;
        }
        let Some(c) = data.getc() else { break };
        match c {
            b'v' => {
                let x = data.read_float().ok_or(MeshError::Corrupted)?;
                let y = data.read_float().ok_or(MeshError::Corrupted)?;
                let z = data.read_float().ok_or(MeshError::Corrupted)?;
                vertices.push(Vec3::new(x, y, z));
            }
            b'f' => {
                let f0 = data.read_int().ok_or(MeshError::Corrupted)? - 1;
                let f1 = data.read_int().ok_or(MeshError::Corrupted)? - 1;
                let f2 = data.read_int().ok_or(MeshError::Corrupted)? - 1;
                if f0 < 0 || f1 < 0 || f2 < 0 {
                    return Err(MeshError::Model("face index out of range"));
                }
                max_vidx = max_vidx.max(f0).max(f1).max(f2);
                faces.push([f0 as u32, f1 as u32, f2 as u32]);
            }
            _ => {
                // Not a face or vertex line; skip it wholesale.
                if data.skip_to_eol().is_none() {
                    break;
                }
            }
        }
    }

    if max_vidx >= vertices.len() as i64 {
        return Err(MeshError::Model("face index out of range"));
    }
    Mesh::new(vertices, faces)
}
