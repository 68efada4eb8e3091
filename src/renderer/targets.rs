//! Off-screen render targets for the deferred pipeline.
//!
//! Every pass reads textures an earlier pass wrote, so the targets live in
//! one struct and are handed to passes as typed fields rather than looked
//! up through shared binding state. All targets are recreated together on
//! resize.

pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const OCCLUSION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
pub const LIGHTING_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// One texture view per intermediate buffer the pipeline produces.
pub struct RenderTargets {
    pub width: u32,
    pub height: u32,
    /// View-space normals written by the geometry pass.
    pub normal: wgpu::TextureView,
    /// Scene depth, written by the geometry pass and read by both SSAO
    /// passes; the lighting pass uses its own depth buffer.
    pub depth: wgpu::TextureView,
    pub lighting_depth: wgpu::TextureView,
    pub ssao_raw: wgpu::TextureView,
    pub ssao_blur: wgpu::TextureView,
    pub lighting: wgpu::TextureView,
    /// Albedo copy, the second color attachment of the lighting pass.
    pub albedo: wgpu::TextureView,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            normal: create_target(device, "Normal Target", width, height, NORMAL_FORMAT),
            depth: create_target(device, "Depth Target", width, height, DEPTH_FORMAT),
            lighting_depth: create_target(device, "Lighting Depth", width, height, DEPTH_FORMAT),
            ssao_raw: create_target(device, "SSAO Raw Target", width, height, OCCLUSION_FORMAT),
            ssao_blur: create_target(device, "SSAO Blur Target", width, height, OCCLUSION_FORMAT),
            lighting: create_target(device, "Lighting Target", width, height, LIGHTING_FORMAT),
            albedo: create_target(device, "Albedo Target", width, height, LIGHTING_FORMAT),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Self::new(device, width, height);
    }
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
