//! CPU-side resources: mesh data, cube maps, material state and the
//! SSAO kernel. Everything here is plain data; GPU upload lives in
//! the renderer.

pub mod cubemap;
pub mod material;
pub mod mesh;
pub mod ply;
pub mod ssao;

pub use cubemap::CubeMapData;
pub use material::{MaterialState, ShaderMode, TextureChannel};
pub use mesh::{BoundingBox, TriangleMesh};
pub use ssao::{generate_ssao_kernel, SsaoSettings, VisualizationMode, SSAO_KERNEL_SIZE};
