//! ASCII RAW recognizer.
//!
//! First line: `nv nf`, optionally followed by a vertex-normal count and a
//! face-normal count. Then `nv` coordinate triples, `nf` 0-based index
//! triples, and the optional normal triples.

use std::io::Read;

use glam::Vec3;
use meshdist_core::{MeshError, Result};

use super::stream::TokenStream;
use crate::mesh::Mesh;

pub(crate) fn read<R: Read>(data: &mut TokenStream<R>) -> Result<Mesh> {
    let line = data.read_line().ok_or(MeshError::Corrupted)?;
    let mut counts = [0i64; 4];
    let mut n = 0;
    for tok in line.split_whitespace().take(4) {
        match tok.parse::<i64>() {
            Ok(v) => {
                counts[n] = v;
                n += 1;
            }
            Err(_) => break,
        }
    }
    if n < 2 {
        return Err(MeshError::Corrupted);
    }
    let [nv, nf, nvn, nfn] = counts;
    if nv < 3 || nf <= 0 {
        return Err(MeshError::Model("bad element counts"));
    }
    if n > 2 && nvn != nv {
        return Err(MeshError::Model("vertex normal count mismatch"));
    }
    if n > 3 && nfn != nf {
        return Err(MeshError::Model("face normal count mismatch"));
    }
    let nv = nv as usize;
    let nf = nf as usize;
    let n_vnorm = if n > 2 { nv } else { 0 };
    let n_fnorm = if n > 3 { nf } else { 0 };

    let vertices = read_vertices(data, nv)?;
    let faces = read_faces(data, nf, nv)?;
    let vertex_normals = if n_vnorm > 0 {
        Some(read_vertices(data, n_vnorm)?)
    } else {
        None
    };
    let face_normals = if n_fnorm > 0 {
        Some(read_vertices(data, n_fnorm)?)
    } else {
        None
    };

    Mesh::with_normals(vertices, faces, vertex_normals, face_normals)
}

/// Reads `n` whitespace-separated coordinate triples.
fn read_vertices<R: Read>(data: &mut TokenStream<R>, n: usize) -> Result<Vec<Vec3>> {
    let mut out = Vec::new();
    out.try_reserve_exact(n).map_err(|_| MeshError::NoMem)?;
    for _ in 0..n {
        let x = data.read_float().ok_or(MeshError::Corrupted)?;
        let y = data.read_float().ok_or(MeshError::Corrupted)?;
        let z = data.read_float().ok_or(MeshError::Corrupted)?;
        out.push(Vec3::new(x, y, z));
    }
    Ok(out)
}

fn read_faces<R: Read>(data: &mut TokenStream<R>, n: usize, nv: usize) -> Result<Vec<[u32; 3]>> {
    let mut out = Vec::new();
    out.try_reserve_exact(n).map_err(|_| MeshError::NoMem)?;
    let nv = nv as i64;
    for _ in 0..n {
        let f0 = data.read_int().ok_or(MeshError::Corrupted)?;
        let f1 = data.read_int().ok_or(MeshError::Corrupted)?;
        let f2 = data.read_int().ok_or(MeshError::Corrupted)?;
        if f0 < 0 || f0 >= nv || f1 < 0 || f1 >= nv || f2 < 0 || f2 >= nv {
            return Err(MeshError::Model("face index out of range"));
        }
        out.push([f0 as u32, f1 as u32, f2 as u32]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::stream::TokenStream;
    use super::*;

    fn parse(s: &str) -> Result<Mesh> {
        read(&mut TokenStream::new(s.as_bytes()))
    }

    #[test]
    fn test_minimal_raw() {
        let m = parse("3 1\n0 0 0\n1 0 0\n0 1 0\n0 1 2\n").unwrap();
        assert_eq!(m.num_vertices(), 3);
        assert_eq!(m.num_faces(), 1);
        assert_eq!(m.faces()[0], [0, 1, 2]);
        assert_eq!(m.bounds().max, Vec3::new(1.0, 1.0, 0.0));
        assert!(m.vertex_normals().is_none());
    }

    #[test]
    fn test_raw_with_normals() {
        let m = parse(concat!(
            "3 1 3\n",
            "0 0 0\n1 0 0\n0 1 0\n",
            "0 1 2\n",
            "0 0 1\n0 0 1\n0 0 1\n",
        ))
        .unwrap();
        assert_eq!(m.vertex_normals().unwrap().len(), 3);
    }

    #[test]
    fn test_raw_errors() {
        // header count mismatch with the vertex count
        assert!(matches!(
            parse("3 1 4\n0 0 0\n1 0 0\n0 1 0\n0 1 2\n"),
            Err(MeshError::Model(_))
        ));
        // bogus counts
        assert!(matches!(parse("2 1\n0 0 0\n1 0 0\n0 1 0\n"), Err(MeshError::Model(_))));
        // out-of-range face index
        assert!(matches!(
            parse("3 1\n0 0 0\n1 0 0\n0 1 0\n0 1 3\n"),
            Err(MeshError::Model(_))
        ));
        // truncated vertex data
        assert!(matches!(parse("3 1\n0 0 0\n1 0\n"), Err(MeshError::Corrupted)));
        // non-numeric header
        assert!(matches!(parse("x y\n"), Err(MeshError::Corrupted)));
    }

    #[test]
    fn test_raw_float_exactness() {
        // Values representable as f32 survive the parse bit-exactly.
        let m = parse("3 1\n0.5 -0.25 3.0\n1 0 0\n0 1 0\n0 1 2\n").unwrap();
        assert_eq!(m.vertices()[0], Vec3::new(0.5, -0.25, 3.0));
    }
}
