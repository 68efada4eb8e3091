//! Shader Uniform Layout Tests
//!
//! Parses the shipped WGSL sources and checks every uniform struct's
//! computed size against the CPU-side buffer feeding it. wgpu validates
//! bindings against the shader-side minimum size at draw time, so a WGSL
//! struct that lays out larger than its Rust counterpart (a trailing
//! `vec3` pad aligning to a new 16-byte row, for instance) fails every
//! draw that binds it.

use std::mem::size_of;

use pbrview::resources::ssao::SsaoUniforms;

const COMPOSITE_WGSL: &str = include_str!("../src/renderer/shaders/composite.wgsl");
const GEOMETRY_WGSL: &str = include_str!("../src/renderer/shaders/geometry.wgsl");
const IRRADIANCE_WGSL: &str = include_str!("../src/renderer/shaders/irradiance.wgsl");
const SHADING_WGSL: &str = include_str!("../src/renderer/shaders/shading.wgsl");
const SKY_WGSL: &str = include_str!("../src/renderer/shaders/sky.wgsl");
const SSAO_WGSL: &str = include_str!("../src/renderer/shaders/ssao.wgsl");

/// Size in bytes of the named struct as the WGSL frontend lays it out.
fn wgsl_struct_size(source: &str, name: &str) -> u32 {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{name}: shader failed to parse: {e}"));
    module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(n), naga::TypeInner::Struct { span, .. }) if n == name => Some(*span),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {name} not found in shader"))
}

// ============================================================================
// Per-pass uniform blocks
// ============================================================================

#[test]
fn composite_uniforms_match_cpu_buffer() {
    // CompositeUniforms on the Rust side: u32 mode + [u32; 3] pad
    assert_eq!(wgsl_struct_size(COMPOSITE_WGSL, "CompositeUniforms"), 16);
}

#[test]
fn bake_uniforms_match_cpu_buffer() {
    // BakeUniforms on the Rust side: 2 Mat4 + f32 roughness + [f32; 3] pad
    assert_eq!(wgsl_struct_size(IRRADIANCE_WGSL, "BakeUniforms"), 144);
}

#[test]
fn ssao_uniforms_match_cpu_buffers() {
    assert_eq!(
        wgsl_struct_size(SSAO_WGSL, "KernelUniforms") as usize,
        size_of::<SsaoUniforms>()
    );
    // PassUniforms: 2 Mat4 + screen size Vec2 + Vec2 pad
    assert_eq!(wgsl_struct_size(SSAO_WGSL, "PassUniforms"), 144);
}

#[test]
fn geometry_uniforms_match_cpu_buffer() {
    // four Mat4 transforms
    assert_eq!(wgsl_struct_size(GEOMETRY_WGSL, "Transforms"), 256);
}

#[test]
fn shading_uniforms_match_cpu_buffers() {
    // four Mat4 plus eight Vec4 parameter rows
    assert_eq!(wgsl_struct_size(SHADING_WGSL, "ShadingUniforms"), 384);
    // projection + rotation-only view
    assert_eq!(wgsl_struct_size(SKY_WGSL, "SkyUniforms"), 128);
}
