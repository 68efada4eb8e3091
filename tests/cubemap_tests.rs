//! Cube Map Loading Tests
//!
//! Tests for:
//! - Six-face directory loading and the fixed face name set
//! - Abort-on-any-missing-face behavior
//! - Size and squareness validation

use std::path::Path;

use pbrview::resources::cubemap::{CubeMapData, FACE_NAMES};
use pbrview::ViewerError;

fn write_face(dir: &Path, name: &str, size: u32, color: [u8; 4]) {
    let mut img = image::RgbaImage::new(size, size);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba(color);
    }
    img.save(dir.join(format!("{name}.png"))).unwrap();
}

fn write_full_set(dir: &Path, size: u32) {
    for (i, name) in FACE_NAMES.iter().enumerate() {
        write_face(dir, name, size, [i as u8 * 40, 0, 0, 255]);
    }
}

#[test]
fn loads_six_faces_in_layer_order() {
    let dir = tempfile::tempdir().unwrap();
    write_full_set(dir.path(), 4);

    let cube = CubeMapData::load_from_dir(dir.path()).unwrap();
    assert_eq!(cube.size, 4);
    assert_eq!(cube.bytes_per_face(), 4 * 4 * 4);
    for (i, face) in cube.faces.iter().enumerate() {
        assert_eq!(face.len(), cube.bytes_per_face());
        assert_eq!(face[0], i as u8 * 40, "face {} out of order", FACE_NAMES[i]);
    }
    assert_eq!(cube.source_dir, dir.path());
}

#[test]
fn missing_face_aborts_the_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    write_full_set(dir.path(), 4);
    std::fs::remove_file(dir.path().join("bottom.png")).unwrap();

    assert!(matches!(
        CubeMapData::load_from_dir(dir.path()),
        Err(ViewerError::CubeMapError(_))
    ));
}

#[test]
fn undecodable_face_aborts_the_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    write_full_set(dir.path(), 4);
    std::fs::write(dir.path().join("front.png"), b"not a png").unwrap();

    assert!(CubeMapData::load_from_dir(dir.path()).is_err());
}

#[test]
fn mismatched_face_sizes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_full_set(dir.path(), 4);
    write_face(dir.path(), "top", 8, [0, 0, 0, 255]);

    assert!(matches!(
        CubeMapData::load_from_dir(dir.path()),
        Err(ViewerError::CubeMapError(_))
    ));
}

#[test]
fn non_square_face_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_full_set(dir.path(), 4);
    let img = image::RgbaImage::new(4, 2);
    img.save(dir.path().join("left.png")).unwrap();

    assert!(CubeMapData::load_from_dir(dir.path()).is_err());
}

#[test]
fn face_names_match_the_on_disk_convention() {
    assert_eq!(
        FACE_NAMES,
        ["right", "left", "top", "bottom", "back", "front"]
    );
}
