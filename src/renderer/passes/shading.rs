//! Shaded-lighting pass: draws the mesh with the selected material
//! program into the lighting and albedo targets, then optionally the
//! skybox with a LessEqual depth compare so it only fills background
//! pixels.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};

use crate::camera::FrameTransforms;
use crate::renderer::mesh_gpu::{GpuCubeMap, GpuMesh, GpuTexture2d};
use crate::renderer::targets::{self, RenderTargets};
use crate::resources::material::{MaterialState, ShaderMode};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ShadingUniforms {
    projection: Mat4,
    view: Mat4,
    model: Mat4,
    normal_matrix: Mat4,
    camera_position: Vec4,
    light_position: Vec4,
    light_color: Vec4,
    ambient: Vec4,
    diffuse: Vec4,
    specular_shininess: Vec4,
    fresnel_metalness: Vec4,
    params: Vec4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SkyUniforms {
    projection: Mat4,
    rotation_view: Mat4,
}

/// The non-mesh GPU inputs of the pass, owned by the renderer.
pub struct ShadingInputs<'a> {
    pub albedo: &'a GpuTexture2d,
    pub metalness: &'a GpuTexture2d,
    pub roughness: &'a GpuTexture2d,
    pub skybox: &'a GpuCubeMap,
    pub diffuse_irradiance: &'a GpuCubeMap,
    pub specular_irradiance: &'a GpuCubeMap,
}

pub struct ShadingPass {
    material_pipelines: [wgpu::RenderPipeline; 4],
    sky_pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sky_layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
    sky_uniforms: wgpu::Buffer,
    color_sampler: wgpu::Sampler,
    cube_sampler: wgpu::Sampler,
}

fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl ShadingPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shading Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../shaders/shading.wgsl"
            ))),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("../shaders/sky.wgsl"))),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shading Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                texture_entry(3, wgpu::TextureViewDimension::D2),
                sampler_entry(4),
                texture_entry(5, wgpu::TextureViewDimension::Cube),
                texture_entry(6, wgpu::TextureViewDimension::Cube),
                texture_entry(7, wgpu::TextureViewDimension::Cube),
                sampler_entry(8),
            ],
        });
        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
            ],
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shading Uniforms"),
            size: std::mem::size_of::<ShadingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sky_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Uniforms"),
            size: std::mem::size_of::<SkyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let color_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            ..Default::default()
        });
        let cube_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cube Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let material_pipelines = [
            Self::create_material_pipeline(device, &shader, &layout, "fs_phong"),
            Self::create_material_pipeline(device, &shader, &layout, "fs_texture"),
            Self::create_material_pipeline(device, &shader, &layout, "fs_reflection"),
            Self::create_material_pipeline(device, &shader, &layout, "fs_brdf"),
        ];
        let sky_pipeline = Self::create_sky_pipeline(device, &sky_shader, &sky_layout);

        Self {
            material_pipelines,
            sky_pipeline,
            layout,
            sky_layout,
            uniforms,
            sky_uniforms,
            color_sampler,
            cube_sampler,
        }
    }

    fn color_targets() -> [Option<wgpu::ColorTargetState>; 2] {
        [
            Some(wgpu::ColorTargetState {
                format: targets::LIGHTING_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            }),
            Some(wgpu::ColorTargetState {
                format: targets::LIGHTING_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            }),
        ]
    }

    fn create_material_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::BindGroupLayout,
        entry_point: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Shading Pipeline {entry_point}")),
            layout: Some(
                &device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Shading Pipeline Layout"),
                    bind_group_layouts: &[Some(layout)],
                    immediate_size: 0,
                }),
            ),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &GpuMesh::buffer_layouts(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(entry_point),
                targets: &Self::color_targets(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: targets::DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    // Depth compare relaxed to LessEqual and writes disabled: the sky
    // fills background pixels without ever occluding the mesh.
    fn create_sky_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Pipeline"),
            layout: Some(
                &device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Sky Pipeline Layout"),
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
                entry_point: Some("fs_main"),
                targets: &Self::color_targets(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: targets::DEPTH_FORMAT,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
        transforms: &FrameTransforms,
        material: &MaterialState,
        inputs: &ShadingInputs<'_>,
        mesh: Option<&GpuMesh>,
        show_skybox: bool,
    ) {
        let world_normal = Mat4::from_mat3(Mat3::from_mat4(transforms.model).inverse().transpose());
        let camera_position = transforms.view_inverse.col(3);
        queue.write_buffer(
            &self.uniforms,
            0,
            bytemuck::bytes_of(&ShadingUniforms {
                projection: transforms.projection,
                view: transforms.view,
                model: transforms.model,
                normal_matrix: world_normal,
                camera_position,
                light_position: material.light_position.extend(1.0),
                light_color: material.light_color.extend(1.0),
                ambient: material.ambient.extend(1.0),
                diffuse: material.diffuse.extend(1.0),
                specular_shininess: material.specular.extend(material.shininess),
                fresnel_metalness: material.fresnel.extend(material.metalness),
                params: Vec4::new(
                    material.roughness,
                    material.texture_channel as u32 as f32,
                    0.0,
                    0.0,
                ),
            }),
        );

        let mut rotation_view = transforms.view;
        rotation_view.w_axis = Vec4::new(0.0, 0.0, 0.0, 1.0);
        queue.write_buffer(
            &self.sky_uniforms,
            0,
            bytemuck::bytes_of(&SkyUniforms {
                projection: transforms.projection,
                rotation_view,
            }),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shading BG"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&inputs.albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&inputs.metalness.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&inputs.roughness.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.color_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&inputs.skybox.view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(&inputs.diffuse_irradiance.view),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(&inputs.specular_irradiance.view),
                },
                wgpu::BindGroupEntry {
                    binding: 8,
                    resource: wgpu::BindingResource::Sampler(&self.cube_sampler),
                },
            ],
        });
        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky BG"),
            layout: &self.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.sky_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&inputs.skybox.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.cube_sampler),
                },
            ],
        });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shading Pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: &targets.lighting,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &targets.albedo,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.lighting_depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some(mesh) = mesh {
            let pipeline = match material.shader_mode {
                ShaderMode::Phong => &self.material_pipelines[0],
                ShaderMode::TextureMapping => &self.material_pipelines[1],
                ShaderMode::Reflection => &self.material_pipelines[2],
                ShaderMode::Brdf => &self.material_pipelines[3],
            };
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            mesh.bind(&mut rpass);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        // Mesh first, sky after: LessEqual lets the sky fill only pixels
        // still at the clear depth.
        if show_skybox {
            rpass.set_pipeline(&self.sky_pipeline);
            rpass.set_bind_group(0, &sky_bind_group, &[]);
            rpass.draw(0..36, 0..1);
        }
    }
}
