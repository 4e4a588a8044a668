//! # Grid Requests
//!
//! ```text
//! offset 0      u32 n           (little-endian)
//! offset 4      n³ × { f32 x, f32 y, f32 z, f32 value }
//! ```
//!
//! Nothing precedes `n` and nothing follows the last record.

use config::constants::{DEFAULT_ISO_LEVEL, GRID_CORNER_BYTES, GRID_HEADER_BYTES, MAX_GRID_DIMENSION};
use mc_grid::{corner_count, Grid, GridCorner};

use crate::error::WireError;

/// A decoded extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    /// Sampled grid.
    pub grid: Grid,
    /// Level to extract.
    pub iso_level: f32,
}

/// Decode a binary grid request with the default dimension limit.
///
/// The binary format carries no iso level; `DEFAULT_ISO_LEVEL` is used.
///
/// ## Example
///
/// ```rust
/// use mc_wire::decode_request;
///
/// let mut bytes = 1u32.to_le_bytes().to_vec();
/// for value in [0.5f32, 1.0, 1.5, -2.0] {
///     bytes.extend_from_slice(&value.to_le_bytes());
/// }
/// let request = decode_request(&bytes).unwrap();
/// assert_eq!(request.grid.corners()[0].value, -2.0);
/// ```
pub fn decode_request(bytes: &[u8]) -> Result<GridRequest, WireError> {
    decode_request_with_limit(bytes, MAX_GRID_DIMENSION)
}

/// Decode a binary grid request, rejecting dimensions above `max_dimension`.
///
/// ## Errors
///
/// - `Truncated` when shorter than the header or than `n` implies
/// - `DimensionTooLarge` when `n > max_dimension`, checked before the body
///   is read
/// - `TrailingBytes` when longer than `n` implies
pub fn decode_request_with_limit(bytes: &[u8], max_dimension: u32) -> Result<GridRequest, WireError> {
    let Some((header, body)) = bytes.split_first_chunk::<GRID_HEADER_BYTES>() else {
        return Err(WireError::Truncated {
            expected: GRID_HEADER_BYTES,
            actual: bytes.len(),
        });
    };
    let dimension = u32::from_le_bytes(*header);
    let max = max_dimension.min(MAX_GRID_DIMENSION);
    if dimension > max {
        return Err(WireError::DimensionTooLarge { dimension, max });
    }

    // bounded by the check above, no overflow
    let count = corner_count(dimension).unwrap_or(usize::MAX);
    let expected = GRID_HEADER_BYTES + count * GRID_CORNER_BYTES;
    if bytes.len() < expected {
        return Err(WireError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(WireError::TrailingBytes {
            expected,
            actual: bytes.len(),
        });
    }

    let corners = body.chunks_exact(GRID_CORNER_BYTES).map(read_corner).collect();
    Ok(GridRequest {
        grid: Grid::from_corners(dimension, corners)?,
        iso_level: DEFAULT_ISO_LEVEL,
    })
}

/// Encode a grid in the request layout.
pub fn encode_request(grid: &Grid) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(GRID_HEADER_BYTES + grid.len() * GRID_CORNER_BYTES);
    bytes.extend_from_slice(&grid.dimension().to_le_bytes());
    for corner in grid.corners() {
        for component in corner.position.iter().chain([&corner.value]) {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
    }
    bytes
}

fn read_corner(record: &[u8]) -> GridCorner {
    let field = |index: usize| {
        let offset = index * 4;
        f32::from_le_bytes([
            record[offset],
            record[offset + 1],
            record[offset + 2],
            record[offset + 3],
        ])
    };
    GridCorner::new([field(0), field(1), field(2)], field(3))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header(dimension: u32) -> Vec<u8> {
        dimension.to_le_bytes().to_vec()
    }

    #[test]
    fn test_short_header() {
        let err = decode_request(&[1, 0]).unwrap_err();
        assert!(matches!(
            err,
            WireError::Truncated {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_empty_grid() {
        let request = decode_request(&header(0)).unwrap();
        assert!(request.grid.is_empty());
        assert_eq!(request.iso_level, DEFAULT_ISO_LEVEL);
    }

    #[test]
    fn test_body_shorter_than_dimension() {
        let mut bytes = header(2);
        bytes.extend_from_slice(&[0u8; 16 * 7]);
        let err = decode_request(&bytes).unwrap_err();
        assert!(matches!(
            err,
            WireError::Truncated {
                expected: 132,
                actual: 116
            }
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = header(1);
        bytes.extend_from_slice(&[0u8; 17]);
        let err = decode_request(&bytes).unwrap_err();
        assert!(matches!(err, WireError::TrailingBytes { expected: 20, actual: 21 }));
    }

    #[test]
    fn test_dimension_checked_before_body() {
        // no body at all: the dimension error wins over truncation
        let err = decode_request(&header(MAX_GRID_DIMENSION + 1)).unwrap_err();
        assert!(matches!(err, WireError::DimensionTooLarge { dimension: 257, max: 256 }));

        let err = decode_request(&header(u32::MAX)).unwrap_err();
        assert!(matches!(err, WireError::DimensionTooLarge { .. }));
    }

    #[test]
    fn test_configured_limit() {
        let err = decode_request_with_limit(&header(9), 8).unwrap_err();
        assert!(matches!(err, WireError::DimensionTooLarge { dimension: 9, max: 8 }));
    }

    #[test]
    fn test_fields_are_little_endian() {
        let mut bytes = vec![1, 0, 0, 0];
        bytes.extend_from_slice(&[0x00, 0x00, 0x80, 0x3f]); // 1.0
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x40]); // 2.0
        bytes.extend_from_slice(&[0x00, 0x00, 0x40, 0x40]); // 3.0
        bytes.extend_from_slice(&[0x00, 0x00, 0x80, 0xbf]); // -1.0
        let request = decode_request(&bytes).unwrap();
        assert_eq!(
            request.grid.corners(),
            &[GridCorner::new([1.0, 2.0, 3.0], -1.0)]
        );
        assert_eq!(encode_request(&request.grid), bytes);
    }
}
