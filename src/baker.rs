//! Offline irradiance baker.
//!
//! Convolves an environment cube map into diffuse or specular irradiance
//! by rendering each of the six 256x256 destination faces through a
//! 90-degree camera, reading the pixels back and saving one PNG per face.
//! The bake blocks the calling thread until every face is on disk; the
//! saved maps are not reloaded automatically.

use std::path::Path;
use std::sync::mpsc;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::errors::{Result, ViewerError};
use crate::renderer::mesh_gpu::GpuCubeMap;
use crate::resources::cubemap::{CubeMapData, FACE_NAMES};

pub const BAKE_FACE_SIZE: u32 = 256;
pub const DIFFUSE_OUTPUT_DIR: &str = "DiffuseIrradianceMap";
pub const SPECULAR_OUTPUT_DIR: &str = "SpecularIrradianceMap";

const BAKE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeKind {
    Diffuse,
    /// Specular prefilter for one roughness value.
    Specular,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BakeUniforms {
    projection: Mat4,
    view: Mat4,
    roughness: f32,
    _pad: [f32; 3],
}

/// The six face cameras: 90-degree frustum looking down each axis, in
/// the same order as [`FACE_NAMES`].
fn face_views() -> [Mat4; 6] {
    let eye = Vec3::ZERO;
    [
        Mat4::look_at_rh(eye, Vec3::X, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::NEG_X, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::Y, Vec3::Z),
        Mat4::look_at_rh(eye, Vec3::NEG_Y, Vec3::NEG_Z),
        Mat4::look_at_rh(eye, Vec3::Z, Vec3::NEG_Y),
        Mat4::look_at_rh(eye, Vec3::NEG_Z, Vec3::NEG_Y),
    ]
}

fn face_projection() -> Mat4 {
    Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 10.0)
}

/// Bakes one irradiance map set.
///
/// The environment is re-read from `environment_dir` (the cube-map path
/// recorded at skybox-load time); if any face is missing the bake aborts
/// before touching the GPU and no output file is written. Face PNGs land
/// in `output_root`/`DiffuseIrradianceMap` or `SpecularIrradianceMap`.
pub fn bake_irradiance(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    environment_dir: &Path,
    output_root: &Path,
    kind: BakeKind,
    roughness: f32,
) -> Result<()> {
    let environment = CubeMapData::load_from_dir(environment_dir)?;
    let environment = GpuCubeMap::new(device, queue, &environment);

    let (entry_point, subdir) = match kind {
        BakeKind::Diffuse => ("fs_diffuse", DIFFUSE_OUTPUT_DIR),
        BakeKind::Specular => ("fs_specular", SPECULAR_OUTPUT_DIR),
    };
    let output_dir = output_root.join(subdir);
    std::fs::create_dir_all(&output_dir)?;

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Irradiance Shader"),
        source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(include_str!(
            "renderer/shaders/irradiance.wgsl"
        ))),
    });

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Irradiance Layout"),
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
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Irradiance Pipeline"),
        layout: Some(
            &device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Irradiance Pipeline Layout"),
                bind_group_layouts: &[Some(&layout)],
                immediate_size: 0,
            }),
        ),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(entry_point),
            targets: &[Some(wgpu::ColorTargetState {
                format: BAKE_FORMAT,
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
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Irradiance Sampler"),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    });

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Bake Target"),
        size: wgpu::Extent3d {
            width: BAKE_FACE_SIZE,
            height: BAKE_FACE_SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: BAKE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let projection = face_projection();
    for (view_matrix, face_name) in face_views().into_iter().zip(FACE_NAMES) {
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bake Uniforms"),
            contents: bytemuck::bytes_of(&BakeUniforms {
                projection,
                view: view_matrix,
                roughness,
                _pad: [0.0; 3],
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bake BG"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&environment.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Bake Encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Bake Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            // unit cube, 36 vertices, no index buffer
            rpass.draw(0..36, 0..1);
        }

        let pixels = read_rgba8(device, queue, encoder, &target, BAKE_FACE_SIZE, BAKE_FACE_SIZE)?;
        let image =
            image::RgbaImage::from_raw(BAKE_FACE_SIZE, BAKE_FACE_SIZE, pixels).ok_or_else(
                || ViewerError::ReadbackError("readback size does not match face".into()),
            )?;
        let path = output_dir.join(format!("{face_name}.png"));
        image.save(&path)?;
        log::info!("baked {}", path.display());
    }

    Ok(())
}

/// Aligns a row length up to WebGPU's 256-byte copy requirement.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let tight = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    tight.div_ceil(align) * align
}

/// Copies the texture into a staging buffer, blocks until the GPU is done
/// and returns the tightly packed pixels.
fn read_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    mut encoder: wgpu::CommandEncoder,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let tight_bpr = (width * 4) as usize;
    let padded_bpr = padded_bytes_per_row(width) as usize;

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging"),
        size: (padded_bpr * height as usize) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr as u32),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| ViewerError::ReadbackError(format!("poll failed: {e:?}")))?;
    receiver
        .recv()
        .map_err(|_| ViewerError::ReadbackError("map_async callback dropped".into()))?
        .map_err(|e| ViewerError::ReadbackError(e.to_string()))?;

    let data = slice.get_mapped_range();
    let mut tight = vec![0u8; tight_bpr * height as usize];
    for row in 0..height as usize {
        let src = row * padded_bpr;
        let dst = row * tight_bpr;
        tight[dst..dst + tight_bpr].copy_from_slice(&data[src..src + tight_bpr]);
    }
    drop(data);
    staging.unmap();

    Ok(tight)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The WGSL struct must lay out to the same 144 bytes; scalar pads
    // there, array pad here.
    #[test]
    fn uniform_block_is_144_bytes() {
        assert_eq!(std::mem::size_of::<BakeUniforms>(), 144);
    }

    #[test]
    fn row_padding_respects_copy_alignment() {
        assert_eq!(padded_bytes_per_row(256), 1024);
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(63), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
    }

    #[test]
    fn face_views_cover_all_axes() {
        let views = face_views();
        let forwards = [
            glam::Vec3::X,
            glam::Vec3::NEG_X,
            glam::Vec3::Y,
            glam::Vec3::NEG_Y,
            glam::Vec3::Z,
            glam::Vec3::NEG_Z,
        ];
        for (view, forward) in views.iter().zip(forwards) {
            // the view matrix maps its forward axis onto -Z
            let mapped = view.transform_vector3(forward);
            assert!((mapped - glam::Vec3::NEG_Z).length() < 1e-5);
        }
    }
}
