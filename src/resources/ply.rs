//! PLY mesh loading.
//!
//! Supports the subset of PLY this viewer encounters in practice: a text
//! header followed by either an ASCII body or a binary little-endian body,
//! with `float` vertex properties (optionally including normals) and
//! triangle faces stored as a `uchar` count plus three `int` indices.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use glam::Vec3;

use crate::errors::{Result, ViewerError};
use crate::resources::mesh::{BoundingBox, TriangleMesh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    face_count: usize,
    has_normals: bool,
}

/// Loads a mesh file, dispatching on the file extension.
///
/// Only `.ply` is recognized. The returned mesh is finalized: normals and
/// texture coordinates are present (computed if the file lacked them) and
/// the bounding box has been derived.
pub fn load_mesh(path: &Path) -> Result<(TriangleMesh, BoundingBox)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ply") => load_ply(path),
        Some(other) => Err(ViewerError::UnsupportedFormat(other.to_string())),
        None => Err(ViewerError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn load_ply(path: &Path) -> Result<(TriangleMesh, BoundingBox)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let header = parse_header(&mut reader)?;
    let mut mesh = match header.format {
        PlyFormat::Ascii => parse_ascii_body(&mut reader, &header)?,
        PlyFormat::BinaryLittleEndian => parse_binary_body(&mut reader, &header)?,
    };

    let bbox = mesh.finalize()?;
    log::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok((mesh, bbox))
}

fn read_header_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ViewerError::MeshParseError(
            "unexpected end of file in header".into(),
        ));
    }
    Ok(line.trim_end().to_string())
}

fn parse_count(line: &str, what: &str) -> Result<usize> {
    line.split_whitespace()
        .nth(2)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ViewerError::MeshParseError(format!("malformed {what} count: {line:?}")))
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader> {
    let magic = read_header_line(reader)?;
    if magic != "ply" {
        return Err(ViewerError::MeshParseError("missing ply magic".into()));
    }

    let mut format = None;
    let mut vertex_count = 0usize;
    let mut face_count = 0usize;
    let mut has_normals = false;

    loop {
        let line = read_header_line(reader)?;
        if line == "end_header" {
            break;
        }
        if let Some(rest) = line.strip_prefix("format ") {
            format = match rest.split_whitespace().next() {
                Some("ascii") => Some(PlyFormat::Ascii),
                Some("binary_little_endian") => Some(PlyFormat::BinaryLittleEndian),
                other => {
                    return Err(ViewerError::MeshParseError(format!(
                        "unsupported ply format {other:?}"
                    )))
                }
            };
        } else if line.starts_with("element vertex") {
            vertex_count = parse_count(&line, "vertex")?;
        } else if line.starts_with("element face") {
            face_count = parse_count(&line, "face")?;
        } else if line.starts_with("property float n") {
            // nx/ny/nz properties mean the file carries its own normals
            has_normals = true;
        }
    }

    if vertex_count == 0 {
        return Err(ViewerError::MeshParseError(
            "ply declares no vertices".into(),
        ));
    }
    let format =
        format.ok_or_else(|| ViewerError::MeshParseError("ply header missing format".into()))?;

    Ok(PlyHeader {
        format,
        vertex_count,
        face_count,
        has_normals,
    })
}

fn parse_ascii_body<R: BufRead>(reader: &mut R, header: &PlyHeader) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::default();
    mesh.positions.reserve(header.vertex_count);

    for _ in 0..header.vertex_count {
        let line = read_header_line(reader)?;
        let values: Vec<f32> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ViewerError::MeshParseError(format!("bad vertex line {line:?}: {e}")))?;
        let needed = if header.has_normals { 6 } else { 3 };
        if values.len() < needed {
            return Err(ViewerError::MeshParseError(format!(
                "vertex line has {} values, expected {needed}",
                values.len()
            )));
        }
        mesh.positions.push(Vec3::new(values[0], values[1], values[2]));
        if header.has_normals {
            mesh.normals.push(Vec3::new(values[3], values[4], values[5]));
        }
    }

    for _ in 0..header.face_count {
        let line = read_header_line(reader)?;
        let values: Vec<i64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ViewerError::MeshParseError(format!("bad face line {line:?}: {e}")))?;
        push_face(&mut mesh, &values)?;
    }

    Ok(mesh)
}

fn parse_binary_body<R: Read>(reader: &mut R, header: &PlyHeader) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::default();
    mesh.positions.reserve(header.vertex_count);

    for _ in 0..header.vertex_count {
        mesh.positions.push(read_vec3(reader)?);
        if header.has_normals {
            mesh.normals.push(read_vec3(reader)?);
        }
    }

    for _ in 0..header.face_count {
        let count = read_u8(reader)?;
        if count != 3 {
            return Err(ViewerError::MeshParseError(format!(
                "only triangular faces are supported, got {count} vertices"
            )));
        }
        let values = [
            i64::from(read_i32(reader)?),
            i64::from(read_i32(reader)?),
            i64::from(read_i32(reader)?),
        ];
        push_face(&mut mesh, &[3, values[0], values[1], values[2]])?;
    }

    Ok(mesh)
}

fn push_face(mesh: &mut TriangleMesh, values: &[i64]) -> Result<()> {
    match values {
        [3, a, b, c] => {
            for &idx in [a, b, c].iter() {
                let idx = u32::try_from(*idx).map_err(|_| {
                    ViewerError::MeshParseError(format!("negative face index {idx}"))
                })?;
                mesh.indices.push(idx);
            }
            Ok(())
        }
        [n, ..] => Err(ViewerError::MeshParseError(format!(
            "only triangular faces are supported, got {n} vertices"
        ))),
        [] => Err(ViewerError::MeshParseError("empty face line".into())),
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_vec3<R: Read>(reader: &mut R) -> Result<Vec3> {
    Ok(Vec3::new(
        read_f32(reader)?,
        read_f32(reader)?,
        read_f32(reader)?,
    ))
}
