//! pbrview: an interactive physically-based viewer for triangle meshes.
//!
//! The renderer runs a fixed five-pass deferred sequence each frame:
//! geometry buffer, raw SSAO, SSAO blur, shaded lighting (Phong, texture
//! channel, mirror reflection or full BRDF, plus an optional skybox) and
//! a composite pass that can visualize any intermediate buffer. An
//! offline baker convolves the environment cube map into diffuse and
//! specular irradiance maps and saves them as PNG faces for reuse.

pub mod app;
pub mod baker;
pub mod camera;
pub mod errors;
pub mod renderer;
pub mod resources;

pub use errors::{Result, ViewerError};
