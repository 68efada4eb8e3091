//! Orbit camera and per-frame transform set.
//!
//! The camera orbits the origin on a sphere parameterized by `theta`/`phi`.
//! The loaded mesh is framed by a model matrix that centers its bounding
//! box on the origin and scales the longest edge to unit length, so a
//! fixed near/far range works for any input mesh.

use glam::{Mat3, Mat4, Vec3};

use crate::resources::mesh::BoundingBox;

pub const FOV_Y_DEGREES: f32 = 60.0;
pub const Z_NEAR: f32 = 0.3;
pub const Z_FAR: f32 = 2.0;

const PHI_EPS: f32 = 0.0001;
const MIN_RADIUS: f32 = 0.45;
const MAX_RADIUS: f32 = 1.9;

/// Matrices consumed by the render passes, rebuilt each frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub view_inverse: Mat4,
    pub model: Mat4,
    /// Upper-left 3x3 of `transpose(inverse(view * model))`, widened to a
    /// Mat4 for uniform upload.
    pub normal_matrix: Mat4,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    width: u32,
    height: u32,
    model: Mat4,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,
            radius: 0.85,
            width: 1,
            height: 1,
            model: Mat4::IDENTITY,
        }
    }
}

impl OrbitCamera {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(width, height);
        camera
    }

    /// Updates the viewport. Height is clamped to 1 so a minimized window
    /// cannot produce a degenerate aspect ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Centers the mesh bounds on the origin and scales its longest edge to
    /// unit length. Called once per mesh load.
    pub fn frame_bounds(&mut self, bbox: &BoundingBox) {
        let extent = bbox.max_extent();
        let scale = if extent > 0.0 { 1.0 / extent } else { 1.0 };
        self.model = Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-bbox.center());
    }

    /// Orbits by screen-space deltas (radians per pixel scaled by viewport
    /// height, matching the feel of a full drag spanning one revolution).
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let per_pixel = std::f32::consts::TAU / self.height as f32;
        self.theta -= dx * per_pixel;
        self.phi -= dy * per_pixel;
        self.phi = self.phi.clamp(PHI_EPS, std::f32::consts::PI - PHI_EPS);
    }

    /// Dollies toward or away from the origin, clamped inside the near/far
    /// range.
    pub fn zoom(&mut self, scroll: f32) {
        let scale = 0.95f32.powf(scroll.abs());
        if scroll > 0.0 {
            self.radius *= scale;
        } else {
            self.radius /= scale;
        }
        self.radius = self.radius.clamp(MIN_RADIUS, MAX_RADIUS);
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    #[must_use]
    pub fn transforms(&self) -> FrameTransforms {
        let projection = Mat4::perspective_rh(
            FOV_Y_DEGREES.to_radians(),
            self.aspect(),
            Z_NEAR,
            Z_FAR,
        );
        let view = Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y);
        let normal3 = Mat3::from_mat4(view * self.model).inverse().transpose();
        FrameTransforms {
            projection,
            view,
            view_inverse: view.inverse(),
            model: self.model,
            normal_matrix: Mat4::from_mat3(normal3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_viewport_is_clamped() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.set_viewport(800, 0);
        assert!(camera.aspect().is_finite());
        assert!((camera.aspect() - 800.0).abs() < f32::EPSILON);
    }

    #[test]
    fn phi_stays_off_the_poles() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.rotate(0.0, 1e6);
        assert!(camera.phi > 0.0 && camera.phi < std::f32::consts::PI);
        camera.rotate(0.0, -1e7);
        assert!(camera.phi > 0.0 && camera.phi < std::f32::consts::PI);
    }

    #[test]
    fn framed_unit_cube_fits_inside_clip_range() {
        let mut camera = OrbitCamera::new(800, 600);
        camera.frame_bounds(&BoundingBox {
            min: Vec3::splat(-4.0),
            max: Vec3::splat(4.0),
        });
        let t = camera.transforms();
        let corner = t.model.transform_point3(Vec3::splat(4.0));
        assert!(corner.length() < 1.0);
    }
}
