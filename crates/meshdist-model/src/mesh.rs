//! The canonical triangular mesh representation.

use glam::Vec3;
use meshdist_core::{Aabb, MeshError, Result};

/// A triangular mesh: vertex positions, faces as index triples, optional
/// normals, and the bounding box of the vertices.
///
/// The mesh owns all its arrays exclusively and is immutable after
/// construction. Faces keep the winding they were loaded with; nothing in
/// the workspace re-orients them. Normals may come from the input file but
/// are never consumed by the distance engine.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    vertex_normals: Option<Vec<Vec3>>,
    face_normals: Option<Vec<Vec3>>,
    bounds: Aabb,
}

impl Mesh {
    /// Creates a mesh from vertices and faces, computing the bounding box.
    ///
    /// A valid mesh has at least 3 vertices and one face, and every face
    /// index in range; anything else fails with [`MeshError::Model`].
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        Self::with_normals(vertices, faces, None, None)
    }

    /// Creates a mesh carrying per-vertex and/or per-face normals.
    ///
    /// Normal array lengths must match the vertex and face counts.
    pub fn with_normals(
        vertices: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        vertex_normals: Option<Vec<Vec3>>,
        face_normals: Option<Vec<Vec3>>,
    ) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(MeshError::Model("fewer than 3 vertices"));
        }
        if faces.is_empty() {
            return Err(MeshError::Model("no faces"));
        }
        let n_vert = vertices.len() as u32;
        for face in &faces {
            if face[0] >= n_vert || face[1] >= n_vert || face[2] >= n_vert {
                return Err(MeshError::Model("face index out of range"));
            }
        }
        if let Some(vn) = &vertex_normals {
            if vn.len() != vertices.len() {
                return Err(MeshError::Model("vertex normal count mismatch"));
            }
        }
        if let Some(fnorm) = &face_normals {
            if fnorm.len() != faces.len() {
                return Err(MeshError::Model("face normal count mismatch"));
            }
        }
        let bounds = Aabb::of_points(&vertices);
        Ok(Self {
            vertices,
            faces,
            vertex_normals,
            face_normals,
            bounds,
        })
    }

    /// Replaces the bounding box with one tracked by a loader.
    ///
    /// The VRML path computes the box over every parsed coordinate, even
    /// ones dropped when the coordinate array is truncated to the highest
    /// referenced index, so the loaded box can differ from the box of the
    /// retained vertices.
    pub(crate) fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Faces as vertex index triples.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// The three corner positions of face `f`.
    #[must_use]
    pub fn face_vertices(&self, f: usize) -> [Vec3; 3] {
        let [i, j, k] = self.faces[f];
        [
            self.vertices[i as usize],
            self.vertices[j as usize],
            self.vertices[k as usize],
        ]
    }

    /// Per-vertex normals, when the input carried them.
    #[must_use]
    pub fn vertex_normals(&self) -> Option<&[Vec3]> {
        self.vertex_normals.as_deref()
    }

    /// Per-face normals, when the input carried them.
    #[must_use]
    pub fn face_normals(&self) -> Option<&[Vec3]> {
        self.face_normals.as_deref()
    }

    /// The bounding box of the mesh.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Length of the bounding-box diagonal.
    #[must_use]
    pub fn bbox_diagonal(&self) -> f64 {
        self.bounds.diagonal()
    }

    /// Returns, for each vertex, the list of faces incident on it, in face
    /// declaration order.
    #[must_use]
    pub fn faces_of_vertex(&self) -> Vec<Vec<u32>> {
        let mut incident = vec![Vec::new(); self.vertices.len()];
        for (f, face) in self.faces.iter().enumerate() {
            for &v in face {
                incident[v as usize].push(f as u32);
            }
        }
        incident
    }

    /// Concatenates several meshes into one: vertices are appended, face
    /// indices offset, and the bounding boxes unioned. Normals are not
    /// carried over.
    pub fn concat(meshes: &[Mesh]) -> Result<Mesh> {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        let mut bounds = Aabb::EMPTY;
        let mut offset = 0u32;
        for m in meshes {
            vertices.extend_from_slice(&m.vertices);
            faces.extend(
                m.faces
                    .iter()
                    .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
            );
            bounds = bounds.union(m.bounds);
            offset += m.vertices.len() as u32;
        }
        Ok(Mesh::new(vertices, faces)?.with_bounds(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [2, 3, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_mesh_basics() {
        let m = quad();
        assert_eq!(m.num_vertices(), 4);
        assert_eq!(m.num_faces(), 2);
        assert_eq!(m.bounds().min, Vec3::ZERO);
        assert_eq!(m.bounds().max, Vec3::new(1.0, 1.0, 0.0));
        assert!((m.bbox_diagonal() - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_face_rejected() {
        let r = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 3]],
        );
        assert!(matches!(r, Err(MeshError::Model(_))));
    }

    #[test]
    fn test_too_small_meshes_rejected() {
        assert!(Mesh::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1, 0]]).is_err());
        assert!(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![]).is_err());
    }

    #[test]
    fn test_normal_count_mismatch_rejected() {
        let r = Mesh::with_normals(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
            Some(vec![Vec3::Z; 2]),
            None,
        );
        assert!(matches!(r, Err(MeshError::Model(_))));
    }

    #[test]
    fn test_faces_of_vertex() {
        let m = quad();
        let incident = m.faces_of_vertex();
        assert_eq!(incident[0], vec![0, 1]);
        assert_eq!(incident[1], vec![0]);
        assert_eq!(incident[2], vec![0, 1]);
        assert_eq!(incident[3], vec![1]);
    }

    #[test]
    fn test_concat_offsets_and_bounds() {
        let a = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let b = Mesh::new(
            vec![
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(6.0, 0.0, 0.0),
                Vec3::new(5.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let m = Mesh::concat(&[a, b]).unwrap();
        assert_eq!(m.num_vertices(), 6);
        assert_eq!(m.num_faces(), 2);
        assert_eq!(m.faces()[1], [3, 4, 5]);
        assert_eq!(m.bounds().min, Vec3::ZERO);
        assert_eq!(m.bounds().max, Vec3::new(6.0, 1.0, 0.0));
    }
}
