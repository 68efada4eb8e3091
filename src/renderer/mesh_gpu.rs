//! GPU uploads for meshes, material textures and cube maps.
//!
//! These wrappers own their wgpu handles, so replacing a field drops the
//! previous generation's resources before the new ones are installed.
//! Vertex attributes use fixed slots: position = 0, normal = 1,
//! texcoord = 2.

use wgpu::util::DeviceExt;

use crate::resources::cubemap::CubeMapData;
use crate::resources::mesh::TriangleMesh;

/// Vertex/index buffers for one uploaded mesh.
pub struct GpuMesh {
    pub positions: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub texcoords: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, mesh: &TriangleMesh) -> Self {
        let positions: Vec<[f32; 3]> = mesh.positions.iter().map(|v| v.to_array()).collect();
        let normals: Vec<[f32; 3]> = mesh.normals.iter().map(|v| v.to_array()).collect();
        let texcoords: Vec<[f32; 2]> = mesh.texcoords.iter().map(|v| v.to_array()).collect();

        Self {
            positions: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Positions"),
                contents: bytemuck::cast_slice(&positions),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            normals: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Normals"),
                contents: bytemuck::cast_slice(&normals),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            texcoords: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Texcoords"),
                contents: bytemuck::cast_slice(&texcoords),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Vertex buffer layouts matching the fixed attribute slots.
    pub fn buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
        [
            wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 1,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 2,
                }],
            },
        ]
    }

    pub fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.normals.slice(..));
        pass.set_vertex_buffer(2, self.texcoords.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
    }
}

/// A six-layer cube texture uploaded from decoded face data.
pub struct GpuCubeMap {
    pub view: wgpu::TextureView,
}

impl GpuCubeMap {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, data: &CubeMapData) -> Self {
        let size = wgpu::Extent3d {
            width: data.size,
            height: data.size,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cube Map"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in data.faces.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(data.size * 4),
                    rows_per_image: Some(data.size),
                },
                wgpu::Extent3d {
                    width: data.size,
                    height: data.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cube Map View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self { view }
    }

    /// A 1x1 placeholder cube so bind groups stay valid before any
    /// environment has been loaded.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let data = CubeMapData {
            size: 1,
            faces: std::array::from_fn(|_| vec![128, 128, 128, 255]),
            source_dir: std::path::PathBuf::new(),
        };
        Self::new(device, queue, &data)
    }
}

/// A sampled 2D texture for the albedo/metalness/roughness channels.
pub struct GpuTexture2d {
    pub view: wgpu::TextureView,
}

impl GpuTexture2d {
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }

    /// A 1x1 white placeholder, the neutral element for modulation.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> Self {
        Self::from_rgba(device, queue, label, 1, 1, &[255, 255, 255, 255])
    }
}
