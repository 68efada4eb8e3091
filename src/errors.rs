//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`ViewerError`] covers all failure modes including:
//! - GPU initialization failures
//! - Mesh and cube map loading errors
//! - Readback and image encoding errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, ViewerError>`.
//!
//! ```rust,ignore
//! use pbrview::errors::{Result, ViewerError};
//!
//! fn load_mesh() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the viewer.
///
/// This enum covers all possible error conditions that can occur
/// while loading assets, driving the GPU, or baking irradiance maps.
/// Each variant provides specific context about what went wrong.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the presentation surface.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Mesh Loading Errors
    // ========================================================================
    /// The mesh file extension is not one of the supported formats.
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// The mesh file violated the format it claims to be in.
    #[error("Mesh parse error: {0}")]
    MeshParseError(String),

    /// The parsed mesh failed structural validation.
    #[error("Invalid mesh: {0}")]
    MeshInvalid(String),

    // ========================================================================
    // Image & Texture Errors
    // ========================================================================
    /// Image decoding or encoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// Cube map validation error.
    #[error("Cube map error: {0}")]
    CubeMapError(String),

    // ========================================================================
    // Baking Errors
    // ========================================================================
    /// GPU buffer readback failed.
    #[error("Readback error: {0}")]
    ReadbackError(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
