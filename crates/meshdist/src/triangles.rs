//! Target-mesh triangle list with derived per-triangle data.

use meshdist_core::TriangleInfo;
use meshdist_model::Mesh;

/// The triangles of a mesh, stripped of connectivity, with the derived
/// data the distance kernel needs and the accumulated surface area.
pub(crate) struct TriangleList {
    pub triangles: Vec<TriangleInfo>,
    pub total_area: f64,
}

impl TriangleList {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut triangles = Vec::with_capacity(mesh.num_faces());
        let mut total_area = 0.0;
        for f in 0..mesh.num_faces() {
            let [a, b, c] = mesh.face_vertices(f);
            let t = TriangleInfo::new(a, b, c);
            total_area += t.area();
            triangles.push(t);
        }
        Self {
            triangles,
            total_area,
        }
    }
}
