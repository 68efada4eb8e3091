//! Cube map loading.
//!
//! A cube map directory holds exactly six images named after the face they
//! cover. Faces are decoded to RGBA8 on the CPU before any GPU state is
//! touched, so a failed load never leaves a half-populated texture behind.

use std::path::{Path, PathBuf};

use crate::errors::{Result, ViewerError};

/// Face file stems in GPU layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "back", "front"];

/// Six decoded RGBA8 faces of equal square size.
#[derive(Debug, Clone)]
pub struct CubeMapData {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
    /// Directory the faces were loaded from, recorded so the irradiance
    /// baker can re-read the environment at bake time.
    pub source_dir: PathBuf,
}

impl CubeMapData {
    /// Loads the six fixed-named PNG faces from `dir`.
    ///
    /// Any missing or undecodable face, and any size mismatch between
    /// faces, aborts the whole load.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut faces: Vec<Vec<u8>> = Vec::with_capacity(6);
        let mut size = 0u32;

        for name in FACE_NAMES {
            let path = dir.join(format!("{name}.png"));
            let img = image::open(&path).map_err(|e| {
                ViewerError::CubeMapError(format!("failed to load face {}: {e}", path.display()))
            })?;
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            if w != h {
                return Err(ViewerError::CubeMapError(format!(
                    "face {name} is {w}x{h}, cube map faces must be square"
                )));
            }
            if faces.is_empty() {
                size = w;
            } else if w != size {
                return Err(ViewerError::CubeMapError(format!(
                    "face {name} is {w}x{w} but earlier faces are {size}x{size}"
                )));
            }
            faces.push(rgba.into_raw());
        }

        let faces: [Vec<u8>; 6] = faces
            .try_into()
            .map_err(|_| ViewerError::CubeMapError("incomplete face set".into()))?;

        log::info!("loaded cube map from {} ({size}x{size})", dir.display());
        Ok(Self {
            size,
            faces,
            source_dir: dir.to_path_buf(),
        })
    }

    pub fn bytes_per_face(&self) -> usize {
        (self.size as usize) * (self.size as usize) * 4
    }
}
