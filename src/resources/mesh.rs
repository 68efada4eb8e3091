//! Triangle mesh data and derived attributes.
//!
//! A [`TriangleMesh`] holds planar position/normal/texcoord arrays plus a
//! flat `u32` index list. Normals and texture coordinates are derived here
//! when the source file does not carry them.

use glam::{Vec2, Vec3};

use crate::errors::{Result, ViewerError};

/// Axis-aligned bounding box over mesh positions.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

impl BoundingBox {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Longest edge of the box, used to frame the camera.
    pub fn max_extent(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

/// A single static triangle mesh with planar vertex attributes.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the structural invariants every downstream consumer relies on.
    ///
    /// The index list must describe whole triangles, every index must be in
    /// range, and the normal array (when present) must be parallel to the
    /// position array.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(ViewerError::MeshInvalid("mesh has no vertices".into()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(ViewerError::MeshInvalid(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.positions.len() as u32;
        if let Some(&bad) = self.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(ViewerError::MeshInvalid(format!(
                "face index {bad} out of range (vertex count {vertex_count})"
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(ViewerError::MeshInvalid(format!(
                "normal count {} does not match vertex count {}",
                self.normals.len(),
                self.positions.len()
            )));
        }
        Ok(())
    }

    /// Fills in any attribute the source file did not provide and returns
    /// the bounding box. Call once after parsing, before GPU upload.
    pub fn finalize(&mut self) -> Result<BoundingBox> {
        self.validate()?;
        if self.normals.is_empty() {
            self.compute_vertex_normals();
        }
        if self.texcoords.is_empty() {
            self.compute_spherical_texcoords();
        }
        Ok(self.bounding_box())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::default();
        for &p in &self.positions {
            bbox.expand(p);
        }
        bbox
    }

    /// Angle-weighted per-vertex normals.
    ///
    /// Each face contributes its unit normal to its three corners, weighted
    /// by the interior angle at that corner. Degenerate faces (cross product
    /// shorter than 1e-5) contribute a zero normal, and corners whose angle
    /// comes out NaN are skipped so a single bad triangle cannot poison its
    /// neighbors.
    pub fn compute_vertex_normals(&mut self) {
        let mut face_normals = Vec::with_capacity(self.indices.len() / 3);
        for tri in self.indices.chunks_exact(3) {
            let v1 = self.positions[tri[0] as usize];
            let v2 = self.positions[tri[1] as usize];
            let v3 = self.positions[tri[2] as usize];
            let normal = (v2 - v1).cross(v3 - v1);
            if normal.length() < 1e-5 {
                face_normals.push(Vec3::ZERO);
            } else {
                face_normals.push(normal.normalize());
            }
        }

        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for (face, tri) in self.indices.chunks_exact(3).enumerate() {
            for corner in 0..3 {
                let idx = tri[corner] as usize;
                let v1 = self.positions[tri[corner] as usize];
                let v2 = self.positions[tri[(corner + 1) % 3] as usize];
                let v3 = self.positions[tri[(corner + 2) % 3] as usize];
                let e1 = v2 - v1;
                let e2 = v3 - v1;
                let angle = (e1.dot(e2) / (e1.length() * e2.length())).acos();
                if !angle.is_nan() {
                    normals[idx] += face_normals[face] * angle;
                }
            }
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Spherical projection UVs from the normalized vertex direction.
    pub fn compute_spherical_texcoords(&mut self) {
        use std::f32::consts::PI;
        self.texcoords = self
            .positions
            .iter()
            .map(|p| {
                let dir = p.normalize_or_zero();
                let u = dir.x.atan2(dir.z) / (2.0 * PI) + 0.5;
                let v = (dir.y.clamp(-1.0, 1.0)).asin() / PI + 0.5;
                Vec2::new(u, v)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriangleMesh {
        TriangleMesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn single_face_normal_is_plus_z() {
        let mut mesh = triangle();
        mesh.compute_vertex_normals();
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-4);
        }
    }

    #[test]
    fn bounding_box_spans_vertices() {
        let bbox = triangle().bounding_box();
        assert_eq!(bbox.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 7];
        assert!(mesh.validate().is_err());
    }
}
