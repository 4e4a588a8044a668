//! # Mesh Responses
//!
//! A response is the raw triangle soup: `[f32; 3]` per vertex, little-endian,
//! no header. Three consecutive vertices form a triangle, so the triangle
//! count is `bytes / 36`. An empty mesh is an empty payload.

use config::constants::VERTEX_BYTES;

use crate::error::WireError;

/// Bytes per triangle in a response.
pub const TRIANGLE_BYTES: usize = 3 * VERTEX_BYTES;

/// Encode a vertex list as a response payload.
///
/// ## Example
///
/// ```rust
/// use mc_wire::encode_response;
///
/// let bytes = encode_response(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
/// assert_eq!(bytes.len(), 36);
/// ```
pub fn encode_response(vertices: &[[f32; 3]]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vertices.len() * VERTEX_BYTES);
    for component in vertices.iter().flatten() {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    bytes
}

/// Decode a response payload back into vertices.
///
/// ## Errors
///
/// `Misaligned` when the length is not a multiple of 12 bytes.
pub fn decode_response(bytes: &[u8]) -> Result<Vec<[f32; 3]>, WireError> {
    if bytes.len() % VERTEX_BYTES != 0 {
        return Err(WireError::Misaligned {
            length: bytes.len(),
            record: VERTEX_BYTES,
        });
    }
    Ok(bytes
        .chunks_exact(VERTEX_BYTES)
        .map(|record| {
            let mut vertex = [0.0f32; 3];
            for (component, raw) in vertex.iter_mut().zip(record.chunks_exact(4)) {
                *component = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            vertex
        })
        .collect())
}

/// Number of whole triangles in a response payload.
pub fn triangle_count(bytes: &[u8]) -> usize {
    bytes.len() / TRIANGLE_BYTES
}

// =============================================================================
// TESTS
// =============================================================================
