//! Camera and Transform Tests
//!
//! Tests for:
//! - Viewport clamping and aspect ratio
//! - Orbit constraints and zoom limits
//! - Mesh framing via the model matrix
//! - Normal matrix derivation

use glam::{Mat3, Vec3};

use pbrview::camera::{OrbitCamera, Z_FAR, Z_NEAR};
use pbrview::resources::mesh::BoundingBox;

const EPSILON: f32 = 1e-4;

#[test]
fn height_zero_is_treated_as_one() {
    let mut camera = OrbitCamera::new(640, 480);
    camera.set_viewport(640, 0);
    assert!((camera.aspect() - 640.0).abs() < EPSILON);
}

#[test]
fn projection_is_finite_after_degenerate_resize() {
    let mut camera = OrbitCamera::new(640, 480);
    camera.set_viewport(0, 0);
    let t = camera.transforms();
    assert!(t.projection.is_finite());
}

#[test]
fn zoom_stays_between_near_and_far() {
    let mut camera = OrbitCamera::new(800, 600);
    for _ in 0..100 {
        camera.zoom(10.0);
    }
    assert!(camera.radius > Z_NEAR);
    for _ in 0..100 {
        camera.zoom(-10.0);
    }
    assert!(camera.radius < Z_FAR);
}

#[test]
fn orbit_never_reaches_the_poles() {
    let mut camera = OrbitCamera::new(800, 600);
    camera.rotate(0.0, 1e9);
    let t = camera.transforms();
    assert!(t.view.is_finite());
}

#[test]
fn framing_centers_and_unit_scales_the_mesh() {
    let mut camera = OrbitCamera::new(800, 600);
    let bbox = BoundingBox {
        min: Vec3::new(10.0, 20.0, 30.0),
        max: Vec3::new(14.0, 22.0, 31.0),
    };
    camera.frame_bounds(&bbox);
    let t = camera.transforms();

    let center = t.model.transform_point3(bbox.center());
    assert!(center.length() < EPSILON);

    // longest edge (4.0 along x) maps to unit length
    let a = t.model.transform_point3(Vec3::new(10.0, 20.0, 30.0));
    let b = t.model.transform_point3(Vec3::new(14.0, 20.0, 30.0));
    assert!(((b - a).length() - 1.0).abs() < EPSILON);
}

#[test]
fn normal_matrix_matches_view_model_inverse_transpose() {
    let mut camera = OrbitCamera::new(800, 600);
    camera.rotate(120.0, 45.0);
    camera.frame_bounds(&BoundingBox {
        min: Vec3::splat(-2.0),
        max: Vec3::splat(2.0),
    });
    let t = camera.transforms();

    let expected = Mat3::from_mat4(t.view * t.model).inverse().transpose();
    let actual = Mat3::from_mat4(t.normal_matrix);
    for c in 0..3 {
        assert!((expected.col(c) - actual.col(c)).length() < EPSILON);
    }
}

#[test]
fn view_inverse_is_the_inverse() {
    let mut camera = OrbitCamera::new(800, 600);
    camera.rotate(300.0, -80.0);
    let t = camera.transforms();
    let identity = t.view * t.view_inverse;
    for c in 0..4 {
        let expected = glam::Mat4::IDENTITY.col(c);
        assert!((identity.col(c) - expected).length() < 1e-3);
    }
}
