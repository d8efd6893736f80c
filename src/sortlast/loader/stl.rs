use super::LoadError;
use crate::sortlast::mesh::{Mesh, Triangle};
use glam::{Vec3, Vec4};
use std::path::Path;

const BINARY_HEADER_LEN: usize = 80;
const BINARY_TRIANGLE_LEN: usize = 50;

const DEFAULT_COLOR: Vec4 = Vec4::new(0.9, 0.9, 0.9, 1.0);

pub fn read_stl<P: AsRef<Path>>(path: P) -> Result<Mesh, LoadError> {
    let bytes = std::fs::read(path.as_ref())?;
    let triangles = if is_binary(&bytes) {
        parse_binary(&bytes)?
    } else {
        parse_ascii(&bytes)?
    };
    Ok(Mesh::new(triangles))
}

fn is_binary(bytes: &[u8]) -> bool {
    // Binary files may also start with "solid", so trust the size check first.
    if bytes.len() >= BINARY_HEADER_LEN + 4 {
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        if bytes.len() == BINARY_HEADER_LEN + 4 + count * BINARY_TRIANGLE_LEN {
            return true;
        }
    }
    !bytes.trim_ascii_start().starts_with(b"solid")
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<Triangle>, LoadError> {
    if bytes.len() < BINARY_HEADER_LEN + 4 {
        return Err(LoadError::InvalidFormat(format!(
            "binary STL too short ({} bytes)",
            bytes.len()
        )));
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let body = &bytes[BINARY_HEADER_LEN + 4..];
    if body.len() < count * BINARY_TRIANGLE_LEN {
        return Err(LoadError::InvalidFormat(format!(
            "binary STL declares {} triangles but holds {} bytes of data",
            count,
            body.len()
        )));
    }

    let read_vec3 = |chunk: &[u8], at: usize| {
        let f = |i: usize| {
            let o = at + i * 4;
            f32::from_le_bytes([chunk[o], chunk[o + 1], chunk[o + 2], chunk[o + 3]])
        };
        Vec3::new(f(0), f(1), f(2))
    };

    Ok(body
        .chunks_exact(BINARY_TRIANGLE_LEN)
        .take(count)
        .map(|chunk| {
            // Bytes 0..12 hold the facet normal, which is recomputed when needed.
            Triangle::new(
                read_vec3(chunk, 12),
                read_vec3(chunk, 24),
                read_vec3(chunk, 36),
                DEFAULT_COLOR,
            )
        })
        .collect())
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<Triangle>, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::InvalidFormat(format!("ASCII STL is not UTF-8: {}", e)))?;

    let mut triangles = Vec::new();
    let mut facet: Vec<Vec3> = Vec::with_capacity(3);

    for (line_index, line) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.first().copied() {
            Some("vertex") => {
                if parts.len() != 4 {
                    return Err(LoadError::Parse {
                        line: line_no,
                        message: "vertex needs three coordinates".to_string(),
                    });
                }
                let mut coords = [0.0f32; 3];
                for (dst, src) in coords.iter_mut().zip(&parts[1..]) {
                    *dst = src.parse().map_err(|_| LoadError::Parse {
                        line: line_no,
                        message: format!("invalid coordinate '{}'", src),
                    })?;
                }
                facet.push(Vec3::from(coords));
            }
            Some("endfacet") => {
                if facet.len() != 3 {
                    return Err(LoadError::Parse {
                        line: line_no,
                        message: format!("facet has {} vertices, expected 3", facet.len()),
                    });
                }
                triangles.push(Triangle::new(facet[0], facet[1], facet[2], DEFAULT_COLOR));
                facet.clear();
            }
            _ => {}
        }
    }

    if !facet.is_empty() {
        return Err(LoadError::InvalidFormat("unterminated facet at end of file".to_string()));
    }

    Ok(triangles)
}
