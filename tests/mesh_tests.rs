//! Mesh and PLY Loading Tests
//!
//! Tests for:
//! - Angle-weighted vertex normal computation
//! - Spherical texture coordinate projection
//! - Bounding box derivation
//! - Structural validation
//! - PLY parsing (ascii and binary little-endian) and extension dispatch

use std::io::Write;

use glam::Vec3;

use pbrview::resources::mesh::TriangleMesh;
use pbrview::resources::ply;
use pbrview::ViewerError;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn single_triangle() -> TriangleMesh {
    TriangleMesh {
        positions: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        indices: vec![0, 1, 2],
        ..Default::default()
    }
}

// ============================================================================
// Normal Computation
// ============================================================================

#[test]
fn single_face_yields_plus_z_normals() {
    let mut mesh = single_triangle();
    mesh.compute_vertex_normals();
    assert_eq!(mesh.normals.len(), mesh.positions.len());
    for n in &mesh.normals {
        assert!(vec3_approx(*n, Vec3::Z));
    }
}

#[test]
fn computed_normals_are_unit_length() {
    // an octahedron, every vertex touched by several faces
    let mut mesh = TriangleMesh {
        positions: vec![
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::Z,
            Vec3::NEG_Z,
        ],
        indices: vec![
            0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, 2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5,
        ],
        ..Default::default()
    };
    mesh.compute_vertex_normals();
    for n in &mesh.normals {
        assert!(approx(n.length(), 1.0));
    }
}

#[test]
fn degenerate_face_does_not_poison_normals() {
    let mut mesh = TriangleMesh {
        positions: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ],
        // second face is collinear, zero area
        indices: vec![0, 1, 2, 0, 1, 3],
        ..Default::default()
    };
    mesh.compute_vertex_normals();
    for n in &mesh.normals {
        assert!(n.is_finite());
    }
    assert!(vec3_approx(mesh.normals[2], Vec3::Z));
}

#[test]
fn isolated_vertex_gets_zero_normal() {
    let mut mesh = single_triangle();
    mesh.positions.push(Vec3::new(5.0, 5.0, 5.0));
    mesh.compute_vertex_normals();
    assert!(vec3_approx(mesh.normals[3], Vec3::ZERO));
}

// ============================================================================
// Texture Coordinates & Bounds
// ============================================================================

#[test]
fn spherical_texcoords_stay_in_unit_square() {
    let mut mesh = TriangleMesh {
        positions: vec![
            Vec3::new(0.3, -0.9, 0.1),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.5, 0.5, -0.5),
        ],
        indices: vec![0, 1, 2],
        ..Default::default()
    };
    mesh.compute_spherical_texcoords();
    for uv in &mesh.texcoords {
        assert!(uv.x >= 0.0 && uv.x <= 1.0);
        assert!(uv.y >= 0.0 && uv.y <= 1.0);
    }
}

#[test]
fn plus_z_direction_maps_to_uv_center() {
    let mut mesh = TriangleMesh {
        positions: vec![Vec3::new(0.0, 0.0, 2.0)],
        ..Default::default()
    };
    mesh.compute_spherical_texcoords();
    let uv = mesh.texcoords[0];
    assert!(approx(uv.x, 0.5));
    assert!(approx(uv.y, 0.5));
}

#[test]
fn bounding_box_contains_every_vertex() {
    let mesh = single_triangle();
    let bbox = mesh.bounding_box();
    assert!(vec3_approx(bbox.min, Vec3::new(0.0, 0.0, 0.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(1.0, 1.0, 0.0)));
    for p in &mesh.positions {
        assert!(p.x >= bbox.min.x && p.x <= bbox.max.x);
        assert!(p.y >= bbox.min.y && p.y <= bbox.max.y);
        assert!(p.z >= bbox.min.z && p.z <= bbox.max.z);
    }
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn validate_accepts_well_formed_mesh() {
    assert!(single_triangle().validate().is_ok());
}

#[test]
fn validate_rejects_ragged_index_list() {
    let mut mesh = single_triangle();
    mesh.indices.push(0);
    assert!(matches!(
        mesh.validate(),
        Err(ViewerError::MeshInvalid(_))
    ));
}

#[test]
fn validate_rejects_mismatched_normal_count() {
    let mut mesh = single_triangle();
    mesh.normals = vec![Vec3::Z];
    assert!(mesh.validate().is_err());
}

#[test]
fn finalize_fills_missing_attributes() {
    let mut mesh = single_triangle();
    let bbox = mesh.finalize().unwrap();
    assert_eq!(mesh.normals.len(), 3);
    assert_eq!(mesh.texcoords.len(), 3);
    assert!(vec3_approx(bbox.max, Vec3::new(1.0, 1.0, 0.0)));
    assert!(mesh.texcoords.iter().all(|uv| uv.is_finite()));
}

// ============================================================================
// PLY Parsing
// ============================================================================

const ASCII_PLY: &str = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";

#[test]
fn ascii_ply_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tri.ply");
    std::fs::write(&path, ASCII_PLY).unwrap();

    let (mesh, bbox) = ply::load_mesh(&path).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.normals.len(), 3);
    assert!(vec3_approx(mesh.normals[0], Vec3::Z));
    assert!(vec3_approx(bbox.min, Vec3::ZERO));
}

#[test]
fn binary_ply_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tri.ply");

    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        "ply\nformat binary_little_endian 1.0\nelement vertex 3\n\
         property float x\nproperty float y\nproperty float z\n\
         element face 1\nproperty list uchar int vertex_indices\nend_header\n"
    )
    .unwrap();
    for v in [[0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            file.write_all(&c.to_le_bytes()).unwrap();
        }
    }
    file.write_all(&[3u8]).unwrap();
    for i in [0i32, 1, 2] {
        file.write_all(&i.to_le_bytes()).unwrap();
    }
    drop(file);

    let (mesh, _) = ply::load_mesh(&path).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert!(vec3_approx(mesh.normals[1], Vec3::Z));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.obj");
    std::fs::write(&path, "o cube").unwrap();
    assert!(matches!(
        ply::load_mesh(&path),
        Err(ViewerError::UnsupportedFormat(_))
    ));
}

#[test]
fn truncated_binary_body_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.ply");
    std::fs::write(
        &path,
        "ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
         property float x\nproperty float y\nproperty float z\nend_header\n\x00\x00",
    )
    .unwrap();
    assert!(ply::load_mesh(&path).is_err());
}

#[test]
fn non_triangular_face_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.ply");
    let quad = ASCII_PLY.replace("3 0 1 2", "4 0 1 2 0");
    std::fs::write(&path, quad).unwrap();
    assert!(matches!(
        ply::load_mesh(&path),
        Err(ViewerError::MeshParseError(_))
    ));
}
