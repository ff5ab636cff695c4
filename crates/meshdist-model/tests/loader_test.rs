//! Cross-format loader tests through the public autodetecting entry
//! point.

use glam::Vec3;
use meshdist_model::{read_model, read_model_file, Format, Mesh, MeshError};

fn load(text: &str, concat: bool) -> meshdist_model::Result<Vec<Mesh>> {
    read_model(text.as_bytes(), None, concat)
}

#[test]
fn test_autodetected_raw() {
    let meshes = load("4 2\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n0 1 2\n0 2 3\n", false).unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].num_vertices(), 4);
    assert_eq!(meshes[0].num_faces(), 2);
}

#[test]
fn test_autodetected_off() {
    let meshes = load("OFF\n3 1 3\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n", false).unwrap();
    assert_eq!(meshes[0].num_faces(), 1);
}

#[test]
fn test_autodetected_smf() {
    let meshes = load("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", false).unwrap();
    assert_eq!(meshes[0].faces()[0], [0, 1, 2]);
}

#[test]
fn test_autodetected_inventor() {
    let text = concat!(
        "#Inventor V2.0 ascii\n",
        "Separator {\n",
        "  Coordinate3 { point [ 0 0 0, 2 0 0, 0 2 0 ] }\n",
        "  IndexedFaceSet { coordIndex [ 0, 1, 2, -1 ] }\n",
        "}\n",
    );
    let meshes = load(text, false).unwrap();
    assert_eq!(meshes[0].num_vertices(), 3);
    assert_eq!(meshes[0].bounds().max, Vec3::new(2.0, 2.0, 0.0));
}

/// A VRML file with two IndexedFaceSets of one triangle each.
const TWO_IFS: &str = concat!(
    "#VRML V2.0 utf8\n",
    "Transform { children [\n",
    "  Shape { geometry IndexedFaceSet {\n",
    "    coord Coordinate { point [ 0 0 0, 1 0 0, 0 1 0 ] }\n",
    "    coordIndex [ 0 1 2 -1 ]\n",
    "  } }\n",
    "  Shape { geometry IndexedFaceSet {\n",
    "    coord Coordinate { point [ 0 0 5, 1 0 5, 0 1 5 ] }\n",
    "    coordIndex [ 0 1 2 -1 ]\n",
    "  } }\n",
    "] }\n",
);

#[test]
fn test_vrml_concat_merges_sets() {
    let meshes = load(TWO_IFS, true).unwrap();
    assert_eq!(meshes.len(), 1);
    let m = &meshes[0];
    assert_eq!(m.num_vertices(), 6);
    assert_eq!(m.num_faces(), 2);
    assert_eq!(m.faces()[0], [0, 1, 2]);
    assert_eq!(m.faces()[1], [3, 4, 5]);
    // Union bounding box of both sets.
    assert_eq!(m.bounds().min, Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(m.bounds().max, Vec3::new(1.0, 1.0, 5.0));
}

#[test]
fn test_vrml_without_concat_returns_list() {
    let meshes = load(TWO_IFS, false).unwrap();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].bounds().max.z, 0.0);
    assert_eq!(meshes[1].bounds().min.z, 5.0);
}

#[test]
fn test_ply_is_detected_but_unsupported() {
    let r = load("ply\nformat ascii 1.0\nelement vertex 3\n", false);
    assert!(matches!(r, Err(MeshError::BadFormat)));
}

#[test]
fn test_garbage_is_bad_format() {
    let r = load("definitely not a mesh\n", false);
    assert!(matches!(r, Err(MeshError::BadFormat)));
}

#[test]
fn test_missing_file_is_bad_filename() {
    let r = read_model_file("/nonexistent/path/to/mesh.raw", None, false);
    assert!(matches!(r, Err(MeshError::BadFilename(_))));
}

#[test]
fn test_format_hint_skips_detection() {
    let smf = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    let meshes = read_model(smf.as_bytes(), Some(Format::Smf), false).unwrap();
    assert_eq!(meshes[0].num_faces(), 1);
}

#[test]
fn test_raw_round_trip_is_bit_exact() {
    // Values representable as f32 survive write + parse bit-exactly,
    // face indices exactly.
    let vertices = vec![
        Vec3::new(0.1, -3.25, 1e-3),
        Vec3::new(7.0, 0.5, 2.75),
        Vec3::new(-0.125, 9.0, 4.5),
        Vec3::new(1.0e-20, 3.402e38, -1.175e-38),
    ];
    let faces = vec![[0u32, 1, 2], [1, 3, 2]];
    let mesh = Mesh::new(vertices.clone(), faces.clone()).unwrap();

    let mut text = format!("{} {}\n", mesh.num_vertices(), mesh.num_faces());
    for v in mesh.vertices() {
        text.push_str(&format!("{} {} {}\n", v.x, v.y, v.z));
    }
    for f in mesh.faces() {
        text.push_str(&format!("{} {} {}\n", f[0], f[1], f[2]));
    }

    let reread = load(&text, false).unwrap().remove(0);
    assert_eq!(reread.faces(), faces.as_slice());
    for (a, b) in vertices.iter().zip(reread.vertices()) {
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.to_bits(), b.z.to_bits());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn raw_vertices_round_trip(
            coords in proptest::collection::vec(-1.0e30f32..1.0e30, 9)
        ) {
            let vertices: Vec<Vec3> = coords
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect();
            let mut text = String::from("3 1\n");
            for v in &vertices {
                text.push_str(&format!("{} {} {}\n", v.x, v.y, v.z));
            }
            text.push_str("0 1 2\n");
            let m = load(&text, false).unwrap().remove(0);
            for (a, b) in vertices.iter().zip(m.vertices()) {
                prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
                prop_assert_eq!(a.y.to_bits(), b.y.to_bits());
                prop_assert_eq!(a.z.to_bits(), b.z.to_bits());
            }
        }
    }
}

#[test]
fn test_large_raw_mesh_crosses_buffer_refills() {
    // A strip of quads big enough to span several 16 KiB refills.
    let n = 2000;
    let mut text = format!("{} {}\n", 2 * n, 2 * (n - 1));
    for i in 0..n {
        text.push_str(&format!("{i} 0 0\n{i} 1 0\n"));
    }
    for i in 0..n - 1 {
        let (a, b, c, d) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        text.push_str(&format!("{a} {b} {c}\n{b} {d} {c}\n"));
    }
    let m = load(&text, false).unwrap().remove(0);
    assert_eq!(m.num_vertices(), 2 * n);
    assert_eq!(m.num_faces(), 2 * (n - 1));
    assert_eq!(m.bounds().max.x, (n - 1) as f32);
}
