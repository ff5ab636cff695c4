//! Inventor 2.x recognizer.
//!
//! Only the `Coordinate3`/`point` and `IndexedFaceSet`/`coordIndex`
//! fields are consumed, at most one of each per `Separator`. Everything
//! else (normals, materials, transforms) is skipped silently.

use std::io::Read;

use glam::Vec3;
use meshdist_core::{Aabb, MeshError, Result};

use super::stream::TokenStream;
use super::vrml;
use crate::mesh::Mesh;

pub(crate) fn read<R: Read>(data: &mut TokenStream<R>) -> Result<Mesh> {
    if !data.find_string("Separator") {
        return Err(MeshError::Corrupted);
    }
    vrml::expect_open_brace(data)?;

    let mut coords: Option<(Vec<Vec3>, Aabb)> = None;
    let mut coord_index: Option<(Vec<[u32; 3]>, i64)> = None;

    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b'}' {
            data.getc();
            break;
        }
        let word = data.read_word().ok_or(MeshError::Corrupted)?;
        match word.as_str() {
            "Coordinate3" => {
                if coords.is_some() {
                    return Err(MeshError::Corrupted);
                }
                coords = Some(vrml::read_coordinate(data)?);
            }
            "IndexedFaceSet" => {
                if coord_index.is_some() {
                    return Err(MeshError::Corrupted);
                }
                // A coordIndex field should not be far.
                if !data.find_string("coordIndex") {
                    return Err(MeshError::Corrupted);
                }
                coord_index = Some(vrml::read_tcoordindex(data)?);
            }
            _ => vrml::skip_field(data)?,
        }
    }

    let (mut vertices, bounds) = coords.unwrap_or((Vec::new(), Aabb::ZERO));
    let (faces, max_vidx) = coord_index.unwrap_or((Vec::new(), -1));
    if (vertices.len() as i64) <= max_vidx {
        return Err(MeshError::Model("face index out of range"));
    }
    vertices.truncate((max_vidx + 1) as usize);
    Mesh::new(vertices, faces).map(|m| m.with_bounds(bounds))
}

#[cfg(test)]
mod tests {
    use super::super::stream::TokenStream;
    use super::*;

    #[test]
    fn test_minimal_inventor() {
        let text = concat!(
            "#Inventor V2.1 ascii\n",
            "Separator {\n",
            "  Material { diffuseColor 0.5 0.5 0.5 }\n",
            "  Coordinate3 { point [ 0 0 0, 1 0 0, 0 1 0 ] }\n",
            "  IndexedFaceSet { coordIndex [ 0, 1, 2, -1 ] }\n",
            "}\n",
        );
        let m = read(&mut TokenStream::new(text.as_bytes())).unwrap();
        assert_eq!(m.num_vertices(), 3);
        assert_eq!(m.num_faces(), 1);
        assert_eq!(m.bounds().max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_duplicate_coordinate3_rejected() {
        let text = concat!(
            "Separator {\n",
            "  Coordinate3 { point [ 0 0 0 ] }\n",
            "  Coordinate3 { point [ 1 1 1 ] }\n",
            "}\n",
        );
        let r = read(&mut TokenStream::new(text.as_bytes()));
        assert!(matches!(r, Err(MeshError::Corrupted)));
    }
}
