//! SSAO passes: raw obscurance estimation followed by an edge-aware blur.
//!
//! Both sub-pipelines share one shader module and the pass uniform buffer;
//! the blur additionally reads the raw occlusion target. Targets are
//! cleared to white, the "no occlusion" neutral value, so background
//! pixels stay unshadowed.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;

use crate::camera::FrameTransforms;
use crate::renderer::targets::{self, RenderTargets};
use crate::resources::ssao::SsaoUniforms;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PassUniforms {
    projection: Mat4,
    projection_inverse: Mat4,
    screen_size: Vec2,
    _pad: Vec2,
}

pub struct SsaoPass {
    raw_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    raw_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,
    pass_uniforms: wgpu::Buffer,
    kernel_uniforms: wgpu::Buffer,
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl SsaoPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SSAO Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("../shaders/ssao.wgsl"))),
        });

        let unfilterable = wgpu::TextureSampleType::Float { filterable: false };
        let raw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Raw Layout"),
            entries: &[
                uniform_entry(0),
                uniform_entry(1),
                texture_entry(2, unfilterable),
                texture_entry(3, wgpu::TextureSampleType::Depth),
            ],
        });
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Blur Layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(2, unfilterable),
                texture_entry(3, wgpu::TextureSampleType::Depth),
                texture_entry(4, unfilterable),
            ],
        });

        let pass_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("SSAO Pass Uniforms"),
            contents: bytemuck::bytes_of(&PassUniforms {
                projection: Mat4::IDENTITY,
                projection_inverse: Mat4::IDENTITY,
                screen_size: Vec2::ONE,
                _pad: Vec2::ZERO,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let kernel_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SSAO Kernel Uniforms"),
            size: std::mem::size_of::<SsaoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let raw_pipeline = Self::create_pipeline(device, &shader, &raw_layout, "fs_raw");
        let blur_pipeline = Self::create_pipeline(device, &shader, &blur_layout, "fs_blur");

        Self {
            raw_pipeline,
            blur_pipeline,
            raw_layout,
            blur_layout,
            pass_uniforms,
            kernel_uniforms,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::BindGroupLayout,
        entry_point: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("SSAO Pipeline {entry_point}")),
            layout: Some(
                &device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("SSAO Pipeline Layout"),
                    bind_group_layouts: &[Some(layout)],
                    immediate_size: 0,
                }),
            ),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(entry_point),
                targets: &[Some(wgpu::ColorTargetState {
                    format: targets::OCCLUSION_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Uploads the per-frame camera and kernel state shared by both
    /// sub-passes.
    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        targets: &RenderTargets,
        transforms: &FrameTransforms,
        kernel: &SsaoUniforms,
    ) {
        queue.write_buffer(
            &self.pass_uniforms,
            0,
            bytemuck::bytes_of(&PassUniforms {
                projection: transforms.projection,
                projection_inverse: transforms.projection.inverse(),
                screen_size: Vec2::new(targets.width as f32, targets.height as f32),
                _pad: Vec2::ZERO,
            }),
        );
        queue.write_buffer(&self.kernel_uniforms, 0, bytemuck::bytes_of(kernel));
    }

    pub fn record_raw(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Raw BG"),
            layout: &self.raw_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.pass_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.kernel_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.normal),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&targets.depth),
                },
            ],
        });
        Self::fullscreen(
            encoder,
            "SSAO Raw Pass",
            &targets.ssao_raw,
            &self.raw_pipeline,
            &bind_group,
        );
    }

    pub fn record_blur(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Blur BG"),
            layout: &self.blur_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.pass_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.normal),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&targets.depth),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&targets.ssao_raw),
                },
            ],
        });
        Self::fullscreen(
            encoder,
            "SSAO Blur Pass",
            &targets.ssao_blur,
            &self.blur_pipeline,
            &bind_group,
        );
    }

    fn fullscreen(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
