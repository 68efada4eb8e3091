//! The fixed five-pass frame sequence.
//!
//! Each pass owns its pipelines, bind group layouts and uniform buffers.
//! Pass inputs and outputs are the typed texture views in
//! [`RenderTargets`](crate::renderer::targets::RenderTargets); ordering is
//! enforced by the renderer calling them in sequence, never by shared
//! binding state.

pub mod composite;
pub mod geometry;
pub mod shading;
pub mod ssao;

pub use composite::CompositePass;
pub use geometry::GeometryPass;
pub use shading::ShadingPass;
pub use ssao::SsaoPass;
