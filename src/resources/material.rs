//! Material and lighting state.
//!
//! Plain data mutated by the UI layer and snapshotted into the per-frame
//! render configuration. Slider-style setters take `0..=100` integers and
//! map them onto `[0, 1]`.

use glam::Vec3;

/// Which material program shades the mesh in the lighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ShaderMode {
    #[default]
    Phong = 0,
    TextureMapping = 1,
    Reflection = 2,
    Brdf = 3,
}

/// Which texture is displayed in `ShaderMode::TextureMapping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum TextureChannel {
    #[default]
    Color = 0,
    Metalness = 1,
    Roughness = 2,
}

/// All shading parameters read by the lighting pass.
#[derive(Debug, Clone)]
pub struct MaterialState {
    pub shader_mode: ShaderMode,
    pub texture_channel: TextureChannel,
    pub show_skybox: bool,

    // Phong (silver)
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,

    // BRDF
    pub fresnel: Vec3,
    pub metalness: f32,
    pub roughness: f32,

    pub light_position: Vec3,
    pub light_color: Vec3,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            shader_mode: ShaderMode::Phong,
            texture_channel: TextureChannel::Color,
            show_skybox: false,
            ambient: Vec3::splat(0.19225),
            diffuse: Vec3::splat(0.50754),
            specular: Vec3::splat(0.508273),
            shininess: 51.2,
            fresnel: Vec3::new(0.972, 0.960, 0.915),
            metalness: 1.0,
            roughness: 0.1,
            light_position: Vec3::new(-5.0, 5.0, 5.0),
            light_color: Vec3::splat(300.0),
        }
    }
}

impl MaterialState {
    /// Sets metalness from a 0..=100 slider value.
    pub fn set_metalness_percent(&mut self, value: u32) {
        self.metalness = value.min(100) as f32 / 100.0;
    }

    /// Sets roughness from a 0..=100 slider value.
    pub fn set_roughness_percent(&mut self, value: u32) {
        self.roughness = value.min(100) as f32 / 100.0;
    }

    /// Sets one channel of the Fresnel F0 color, clamped to `[0, 1]`.
    pub fn set_fresnel_r(&mut self, value: f32) {
        self.fresnel.x = value.clamp(0.0, 1.0);
    }

    pub fn set_fresnel_g(&mut self, value: f32) {
        self.fresnel.y = value.clamp(0.0, 1.0);
    }

    pub fn set_fresnel_b(&mut self, value: f32) {
        self.fresnel.z = value.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fully_metallic_and_slightly_rough() {
        let mat = MaterialState::default();
        assert!((mat.metalness - 1.0).abs() < f32::EPSILON);
        assert!((mat.roughness - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn slider_values_map_to_unit_range() {
        let mut mat = MaterialState::default();
        mat.set_metalness_percent(100);
        assert!((mat.metalness - 1.0).abs() < f32::EPSILON);
        mat.set_roughness_percent(250);
        assert!((mat.roughness - 1.0).abs() < f32::EPSILON);
        mat.set_metalness_percent(37);
        assert!((mat.metalness - 0.37).abs() < 1e-6);
    }

    #[test]
    fn fresnel_is_clamped() {
        let mut mat = MaterialState::default();
        mat.set_fresnel_r(1.5);
        mat.set_fresnel_g(-0.2);
        assert!((mat.fresnel.x - 1.0).abs() < f32::EPSILON);
        assert!(mat.fresnel.y.abs() < f32::EPSILON);
    }
}
