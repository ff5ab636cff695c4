//! VRML 2.0 recognizer, restricted to `IndexedFaceSet` nodes.
//!
//! Anything outside an `IndexedFaceSet` is skipped by depth-matched brace
//! and bracket counting; `DEF` names, comments and quoted strings are
//! skipped, never interpreted. Within a set the `coord`, `coordIndex`,
//! `normal`, `normalIndex` and `normalPerVertex` fields are consumed.

use std::io::Read;

use glam::Vec3;
use meshdist_core::{Aabb, MeshError, Result};

use super::stream::{TokenStream, VRML_WS};
use crate::mesh::Mesh;

/// Reads every `IndexedFaceSet` in the stream. With `concat` the sets are
/// merged into one mesh (vertices appended, indices offset, bounding boxes
/// unioned); otherwise one mesh per set is returned.
pub(crate) fn read<R: Read>(data: &mut TokenStream<R>, concat: bool) -> Result<Vec<Mesh>> {
    let mut meshes = Vec::new();
    while data.find_string("IndexedFaceSet") {
        meshes.push(read_ifs(data)?);
    }
    if concat && meshes.len() > 1 {
        log::debug!("concatenating {} IndexedFaceSets", meshes.len());
        return Ok(vec![Mesh::concat(&meshes)?]);
    }
    Ok(meshes)
}

/// Reads one `IndexedFaceSet` node body, including the braces.
fn read_ifs<R: Read>(data: &mut TokenStream<R>) -> Result<Mesh> {
    expect_open_brace(data)?;

    let mut coords: Option<(Vec<Vec3>, Aabb)> = None;
    let mut coord_index: Option<(Vec<[u32; 3]>, i64)> = None;
    let mut normals: Option<Vec<Vec3>> = None;
    let mut normal_indices: Option<Vec<i64>> = None;
    let mut max_nidx = -1i64;
    let mut normal_per_vertex = true;

    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b'}' {
            data.getc();
            break;
        }
        let field = data.read_word().ok_or(MeshError::Corrupted)?;
        match field.as_str() {
            "coord" => {
                if coords.is_some() {
                    return Err(MeshError::Corrupted);
                }
                if read_node_type(data)? != "Coordinate" {
                    return Err(MeshError::Corrupted);
                }
                coords = Some(read_coordinate(data)?);
            }
            "coordIndex" => {
                if coord_index.is_some() {
                    return Err(MeshError::Corrupted);
                }
                coord_index = Some(read_tcoordindex(data)?);
            }
            "normalPerVertex" => normal_per_vertex = read_sfbool(data)?,
            "normal" => {
                if normals.is_some() {
                    return Err(MeshError::Corrupted);
                }
                if read_node_type(data)? != "Normal" {
                    return Err(MeshError::Corrupted);
                }
                normals = Some(read_normal_node(data)?);
            }
            "normalIndex" => {
                if normal_indices.is_some() {
                    return Err(MeshError::Corrupted);
                }
                let (idcs, maxv) = read_mfint32(data)?;
                max_nidx = maxv;
                normal_indices = Some(idcs);
            }
            _ => skip_field(data)?,
        }
    }

    let (mut vertices, bounds) = coords.unwrap_or((Vec::new(), Aabb::ZERO));
    let (faces, max_vidx) = coord_index.unwrap_or((Vec::new(), -1));
    if (vertices.len() as i64) <= max_vidx {
        return Err(MeshError::Model("face index out of range"));
    }
    // Coordinates beyond the highest referenced index carry no geometry.
    vertices.truncate((max_vidx + 1) as usize);
    let n_vertices = vertices.len();

    let mut vertex_normals = None;
    let mut face_normals = None;
    if let Some(nrmls) = normals {
        if !nrmls.is_empty() {
            match normal_indices {
                Some(idcs) if !idcs.is_empty() => {
                    if normal_per_vertex {
                        vertex_normals = Some(vnormals_from_indexed(
                            &nrmls, &idcs, max_nidx, max_vidx, &faces,
                        )?);
                    } else {
                        face_normals =
                            Some(fnormals_from_indexed(&nrmls, &idcs, max_nidx, faces.len())?);
                    }
                }
                _ => {
                    // Direct normals, one per vertex or per face.
                    let mut nrmls = nrmls;
                    if normal_per_vertex {
                        if nrmls.len() < n_vertices {
                            return Err(MeshError::Model("vertex normal count mismatch"));
                        }
                        nrmls.truncate(n_vertices);
                        vertex_normals = Some(nrmls);
                    } else {
                        if nrmls.len() < faces.len() {
                            return Err(MeshError::Model("face normal count mismatch"));
                        }
                        nrmls.truncate(faces.len());
                        face_normals = Some(nrmls);
                    }
                }
            }
        }
    }

    Mesh::with_normals(vertices, faces, vertex_normals, face_normals)
        .map(|m| m.with_bounds(bounds))
}

/// Converts per-corner indexed normals to one normal per vertex.
fn vnormals_from_indexed(
    nrmls: &[Vec3],
    idcs: &[i64],
    max_nidx: i64,
    max_vidx: i64,
    faces: &[[u32; 3]],
) -> Result<Vec<Vec3>> {
    if (nrmls.len() as i64) <= max_nidx || (idcs.len() + 1) / 4 < faces.len() || max_vidx < -1 {
        return Err(MeshError::Model("vertex normal count mismatch"));
    }
    let n = (max_vidx + 1) as usize;
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut out = vec![Vec3::ZERO; n];
    let mut j = 0;
    for face in faces {
        if idcs[j] < 0
            || idcs[j + 1] < 0
            || idcs[j + 2] < 0
            || (j + 3 < idcs.len() && idcs[j + 3] != -1)
        {
            return Err(MeshError::Model("bad normal index"));
        }
        for &v in face {
            out[v as usize] = nrmls[idcs[j] as usize];
            j += 1;
        }
        j += 1; // face-terminating -1
    }
    Ok(out)
}

/// Converts indexed face normals to one normal per face.
fn fnormals_from_indexed(
    nrmls: &[Vec3],
    idcs: &[i64],
    max_nidx: i64,
    n_faces: usize,
) -> Result<Vec<Vec3>> {
    if (nrmls.len() as i64) <= max_nidx || idcs.len() < n_faces {
        return Err(MeshError::Model("face normal count mismatch"));
    }
    let mut out = Vec::with_capacity(n_faces);
    for &i in &idcs[..n_faces] {
        if i < 0 {
            return Err(MeshError::Corrupted);
        }
        out.push(nrmls[i as usize]);
    }
    Ok(out)
}

/// Consumes an opening `{` after optional whitespace.
pub(crate) fn expect_open_brace<R: Read>(data: &mut TokenStream<R>) -> Result<()> {
    if data.skip_ws_comm().ok_or(MeshError::Corrupted)? != b'{' {
        return Err(MeshError::Corrupted);
    }
    data.getc();
    Ok(())
}

/// Returns the type name of the node appearing next, skipping any `DEF`
/// statement and its name.
fn read_node_type<R: Read>(data: &mut TokenStream<R>) -> Result<String> {
    data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    let mut word = data.read_word().ok_or(MeshError::Corrupted)?;
    if word == "DEF" {
        data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        skip_field(data)?; // the DEF name
        data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        word = data.read_word().ok_or(MeshError::Corrupted)?;
    }
    Ok(word)
}

/// Reads a `TRUE`/`FALSE` field.
fn read_sfbool<R: Read>(data: &mut TokenStream<R>) -> Result<bool> {
    data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    match data.read_word().ok_or(MeshError::Corrupted)?.as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(MeshError::Corrupted),
    }
}

/// Skips a field value: an array in `[]`, a node in `{}` (including
/// embedded nodes) or a single value up to the next whitespace.
pub(crate) fn skip_field<R: Read>(data: &mut TokenStream<R>) -> Result<()> {
    let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    if c == b'[' {
        data.getc();
        data.find_chars(b"]").ok_or(MeshError::Corrupted)?;
        data.getc();
        Ok(())
    } else if c == b'{' {
        data.getc();
        let mut depth = 1usize;
        while depth > 0 {
            match data.find_chars(b"{}") {
                Some(b'{') => {
                    data.getc();
                    depth += 1;
                }
                Some(_) => {
                    data.getc();
                    depth -= 1;
                }
                None => return Err(MeshError::Corrupted),
            }
        }
        Ok(())
    } else {
        data.find_chars(VRML_WS).ok_or(MeshError::Corrupted)?;
        Ok(())
    }
}

/// Reads an MFFloat array. With brackets any length is accepted; without,
/// exactly `nelem` values are read.
fn read_mffloat<R: Read>(data: &mut TokenStream<R>, nelem: usize) -> Result<Vec<f32>> {
    let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    let in_brackets = c == b'[';
    if in_brackets {
        data.getc();
    }
    let mut vals = Vec::new();
    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b']' {
            if !in_brackets {
                return Err(MeshError::Corrupted);
            }
            data.getc();
            break;
        }
        vals.push(data.read_float().ok_or(MeshError::Corrupted)?);
        if !in_brackets && vals.len() >= nelem {
            break;
        }
    }
    Ok(vals)
}

/// Reads an MFInt32 array, returning the values and their maximum.
fn read_mfint32<R: Read>(data: &mut TokenStream<R>) -> Result<(Vec<i64>, i64)> {
    let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
    let in_brackets = c == b'[';
    if in_brackets {
        data.getc();
    }
    let mut vals = Vec::new();
    let mut maxv = i64::MIN;
    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b']' {
            if !in_brackets {
                return Err(MeshError::Corrupted);
            }
            data.getc();
            break;
        }
        let v = data.read_int().ok_or(MeshError::Corrupted)?;
        maxv = maxv.max(v);
        vals.push(v);
        if !in_brackets {
            break;
        }
    }
    Ok((vals, maxv))
}

/// Reads an MFVec3f array as points.
fn read_mfvec3f<R: Read>(data: &mut TokenStream<R>) -> Result<Vec<Vec3>> {
    let vals = read_mffloat(data, 3)?;
    Ok(vals
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

/// Reads an MFVec3f array, tracking the bounding box of the points.
fn read_mfvec3f_bbox<R: Read>(data: &mut TokenStream<R>) -> Result<(Vec<Vec3>, Aabb)> {
    let vtcs = read_mfvec3f(data)?;
    if vtcs.is_empty() {
        return Ok((vtcs, Aabb::ZERO));
    }
    let bounds = Aabb::of_points(&vtcs);
    Ok((vtcs, bounds))
}

/// Reads a `coordIndex` field and folds it into triangles: each face is
/// three non-negative indices and a `-1` terminator.
pub(crate) fn read_tcoordindex<R: Read>(
    data: &mut TokenStream<R>,
) -> Result<(Vec<[u32; 3]>, i64)> {
    let (idcs, max_val) = read_mfint32(data)?;
    let n_faces = (idcs.len() + 1) / 4;
    let mut faces = Vec::with_capacity(n_faces);
    let mut j = 0;
    for _ in 0..n_faces {
        let (f0, f1, f2) = (idcs[j], idcs[j + 1], idcs[j + 2]);
        j += 3;
        if f0 < 0 || f1 < 0 || f2 < 0 {
            return Err(MeshError::Corrupted);
        }
        if j < idcs.len() {
            let t = idcs[j];
            j += 1;
            if t != -1 {
                return Err(if t >= 0 {
                    MeshError::NotTriangular
                } else {
                    MeshError::Corrupted
                });
            }
        }
        faces.push([f0 as u32, f1 as u32, f2 as u32]);
    }
    Ok((faces, max_val))
}

/// Reads a `Coordinate` node, returning its points and their bounding box.
pub(crate) fn read_coordinate<R: Read>(data: &mut TokenStream<R>) -> Result<(Vec<Vec3>, Aabb)> {
    expect_open_brace(data)?;
    let mut result = (Vec::new(), Aabb::ZERO);
    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b'}' {
            data.getc();
            break;
        }
        let field = data.read_word().ok_or(MeshError::Corrupted)?;
        if field == "point" {
            result = read_mfvec3f_bbox(data)?;
        } else {
            skip_field(data)?;
        }
    }
    Ok(result)
}

/// Reads a `Normal` node, returning its vectors.
fn read_normal_node<R: Read>(data: &mut TokenStream<R>) -> Result<Vec<Vec3>> {
    expect_open_brace(data)?;
    let mut nrmls = Vec::new();
    loop {
        let c = data.skip_ws_comm().ok_or(MeshError::Corrupted)?;
        if c == b'}' {
            data.getc();
            break;
        }
        let field = data.read_word().ok_or(MeshError::Corrupted)?;
        if field == "vector" {
            nrmls = read_mfvec3f(data)?;
        } else {
            skip_field(data)?;
        }
    }
    Ok(nrmls)
}
