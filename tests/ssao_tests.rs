//! SSAO Kernel and Parameter Tests
//!
//! Tests for:
//! - Disk kernel containment and areal distribution
//! - Deterministic generation
//! - Parameter clamping
//! - Uniform block packing

use pbrview::resources::ssao::{
    generate_ssao_kernel, SsaoSettings, VisualizationMode, SSAO_KERNEL_SIZE,
};

const EPSILON: f32 = 1e-4;

#[test]
fn kernel_has_requested_size() {
    assert_eq!(generate_ssao_kernel(64).len(), 64);
    assert_eq!(generate_ssao_kernel(7).len(), 7);
}

#[test]
fn kernel_samples_lie_inside_unit_disk() {
    for sample in generate_ssao_kernel(64) {
        assert!(sample.length() <= 1.0 + EPSILON);
    }
}

#[test]
fn kernel_is_deterministic() {
    assert_eq!(generate_ssao_kernel(64), generate_ssao_kernel(64));
}

#[test]
fn kernel_density_is_uniform_over_area() {
    // With r = sqrt(u) the inner disk of radius 1/2 should hold about a
    // quarter of the samples, not half. Allow generous slack for the
    // small sample count.
    let kernel = generate_ssao_kernel(64);
    let inner = kernel.iter().filter(|s| s.length() < 0.5).count();
    assert!(
        inner < kernel.len() / 2,
        "{inner} of {} samples inside r=0.5, disk sampling looks center-biased",
        kernel.len()
    );
}

#[test]
fn sample_count_is_clamped_to_capacity() {
    let mut settings = SsaoSettings::default();
    settings.set_sample_count(1000);
    assert_eq!(settings.sample_count(), SSAO_KERNEL_SIZE as u32);
    settings.set_sample_count(0);
    assert_eq!(settings.sample_count(), 1);
}

#[test]
fn parameters_are_clamped_to_sane_domains() {
    let mut settings = SsaoSettings::default();
    settings.set_radius(-1.0);
    assert!(settings.radius() > 0.0);
    settings.set_sigma(-3.0);
    assert!(settings.sigma().abs() < EPSILON);
    settings.set_epsilon(0.0);
    assert!(settings.epsilon() > 0.0);
}

#[test]
fn defaults_match_expected_tuning() {
    let settings = SsaoSettings::default();
    assert_eq!(settings.sample_count(), 64);
    assert!((settings.radius() - 0.001).abs() < 1e-7);
    assert!((settings.sigma() - 1.8).abs() < EPSILON);
    assert!((settings.k() - 2.5).abs() < EPSILON);
    assert_eq!(settings.visualization, VisualizationMode::Final);
}

#[test]
fn uniform_block_packs_kernel_and_parameters() {
    let mut settings = SsaoSettings::default();
    settings.set_sample_count(16);
    settings.set_radius(0.01);
    let uniforms = settings.to_uniforms();
    assert_eq!(uniforms.sample_count, 16);
    assert!((uniforms.radius - 0.01).abs() < 1e-7);
    for (slot, sample) in uniforms.samples.iter().zip(settings.kernel()) {
        assert!((slot[0] - sample.x).abs() < EPSILON);
        assert!((slot[1] - sample.y).abs() < EPSILON);
    }
    // std140-friendly size: 64 vec4 slots plus two 16-byte tail rows
    assert_eq!(std::mem::size_of_val(&uniforms), 64 * 16 + 32);
}

#[test]
fn frame_config_is_a_snapshot() {
    use pbrview::renderer::RenderConfig;
    use pbrview::resources::material::MaterialState;

    let mut settings = SsaoSettings::default();
    let mut material = MaterialState::default();
    let camera = pbrview::camera::OrbitCamera::default();

    let config = RenderConfig {
        transforms: camera.transforms(),
        material: material.clone(),
        ssao: settings.to_uniforms(),
        visualization: settings.visualization,
    };

    settings.set_radius(0.5);
    settings.visualization = VisualizationMode::Depth;
    material.set_metalness_percent(30);

    assert!((config.ssao.radius - 0.001).abs() < 1e-7);
    assert_eq!(config.visualization, VisualizationMode::Final);
    assert!((config.material.metalness - 1.0).abs() < EPSILON);
}
