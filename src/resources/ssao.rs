//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! This module defines the SSAO sampling kernel and its tunable parameters
//! as pure data; the render passes consume them through
//! [`SsaoSettings::to_uniforms`].
//!
//! # Algorithm
//!
//! The occlusion estimator samples a disk of screen-space offsets around
//! each pixel, reconstructs the view-space position of every sample from
//! the depth buffer, and accumulates occlusion from samples that rise above
//! the center point. The accumulated obscurance is mapped through
//! `pow(max(0, 1 - (2*sigma/n) * sum), k)`, with `beta` biasing away from
//! self-occlusion and `epsilon` guarding the distance division. A
//! depth/normal-aware cross-bilateral blur then smooths the raw result
//! while preserving geometric edges.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Fixed capacity of the sample kernel.
pub const SSAO_KERNEL_SIZE: usize = 64;

/// Which intermediate buffer the composite pass displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum VisualizationMode {
    Normal = 0,
    Albedo = 1,
    Depth = 2,
    Ssao = 3,
    SsaoBlur = 4,
    #[default]
    Final = 5,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 6] = [
        VisualizationMode::Normal,
        VisualizationMode::Albedo,
        VisualizationMode::Depth,
        VisualizationMode::Ssao,
        VisualizationMode::SsaoBlur,
        VisualizationMode::Final,
    ];
}

/// GPU-side kernel and parameter block shared by the raw and blur passes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SsaoUniforms {
    /// Disk offsets in xy; zw unused (std140-friendly vec4 stride).
    pub samples: [[f32; 4]; SSAO_KERNEL_SIZE],
    pub sample_count: u32,
    pub radius: f32,
    pub sigma: f32,
    pub k: f32,
    pub beta: f32,
    pub epsilon: f32,
    pub _pad: [f32; 2],
}

/// SSAO configuration (pure data, setters clamp to sane domains).
#[derive(Debug, Clone)]
pub struct SsaoSettings {
    kernel: Vec<Vec2>,
    sample_count: u32,
    radius: f32,
    sigma: f32,
    k: f32,
    beta: f32,
    epsilon: f32,
    pub visualization: VisualizationMode,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            kernel: generate_ssao_kernel(SSAO_KERNEL_SIZE as u32),
            sample_count: 64,
            radius: 0.001,
            sigma: 1.8,
            k: 2.5,
            beta: 0.0001,
            epsilon: 0.0001,
            visualization: VisualizationMode::Final,
        }
    }
}

impl SsaoSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of kernel samples used per pixel.
    ///
    /// Clamped to `1..=64` (the kernel capacity).
    pub fn set_sample_count(&mut self, count: u32) {
        self.sample_count = count.clamp(1, SSAO_KERNEL_SIZE as u32);
    }

    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Sets the sampling radius in view-space units.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(1e-6);
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sets the obscurance scale factor.
    pub fn set_sigma(&mut self, sigma: f32) {
        self.sigma = sigma.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Sets the contrast exponent applied to the final occlusion value.
    pub fn set_k(&mut self, k: f32) {
        self.k = k.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn k(&self) -> f32 {
        self.k
    }

    /// Sets the depth bias that suppresses self-occlusion.
    pub fn set_beta(&mut self, beta: f32) {
        self.beta = beta.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Sets the division guard added to squared sample distances.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.max(1e-8);
    }

    #[inline]
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[must_use]
    pub fn kernel(&self) -> &[Vec2] {
        &self.kernel
    }

    /// Packs the kernel and parameters into the GPU uniform block.
    #[must_use]
    pub fn to_uniforms(&self) -> SsaoUniforms {
        let mut samples = [[0.0f32; 4]; SSAO_KERNEL_SIZE];
        for (slot, offset) in samples.iter_mut().zip(self.kernel.iter()) {
            slot[0] = offset.x;
            slot[1] = offset.y;
        }
        SsaoUniforms {
            samples,
            sample_count: self.sample_count,
            radius: self.radius,
            sigma: self.sigma,
            k: self.k,
            beta: self.beta,
            epsilon: self.epsilon,
            _pad: [0.0; 2],
        }
    }
}

/// Generates a disk-distributed sample kernel.
///
/// Uses a fixed seed for deterministic results across frames and sessions.
/// The angle is uniform in `[0, 2*pi)` and the radius is the square root of
/// a uniform draw, giving uniform areal density over the unit disk.
#[must_use]
pub fn generate_ssao_kernel(samples: u32) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut kernel = Vec::with_capacity(samples as usize);

    for _ in 0..samples {
        let theta = rng.random_range(0.0..std::f32::consts::TAU);
        let r = rng.random_range(0.0..1.0f32).sqrt();
        kernel.push(Vec2::new(r * theta.cos(), r * theta.sin()));
    }
    kernel
}
