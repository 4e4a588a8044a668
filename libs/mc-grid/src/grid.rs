//! # Grid Data Structure
//!
//! Flat array of `n³` corners. The only constructor checks the length, so a
//! `Grid` always satisfies `corners.len() == n³`.

use bytemuck::{Pod, Zeroable};
use config::constants::MAX_GRID_DIMENSION;

use crate::error::GridError;

/// One lattice corner: position followed by the sampled scalar value.
///
/// `#[repr(C)]` with four `f32`s, 16 bytes, no padding; the layout is shared
/// with the wire format and device buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GridCorner {
    /// World-space position (x, y, z).
    pub position: [f32; 3],
    /// Scalar field value at `position`.
    pub value: f32,
}

impl GridCorner {
    /// Creates a corner.
    pub fn new(position: [f32; 3], value: f32) -> Self {
        Self { position, value }
    }
}

/// Number of corners of an `n`-dimensional grid, or `None` on overflow.
///
/// # Example
///
/// ```rust
/// use mc_grid::corner_count;
/// assert_eq!(corner_count(4), Some(64));
/// assert_eq!(corner_count(0), Some(0));
/// ```
pub fn corner_count(dimension: u32) -> Option<usize> {
    let n = usize::try_from(dimension).ok()?;
    n.checked_mul(n)?.checked_mul(n)
}

/// Checks `dimension` against `MAX_GRID_DIMENSION`.
pub(crate) fn check_dimension(dimension: u32) -> Result<(), GridError> {
    if dimension > MAX_GRID_DIMENSION {
        return Err(GridError::DimensionTooLarge {
            dimension,
            max: MAX_GRID_DIMENSION,
        });
    }
    Ok(())
}

/// A regular `n × n × n` sample grid.
///
/// # Example
///
/// ```rust
/// use mc_grid::{Grid, GridCorner};
///
/// let corners = vec![GridCorner::default(); 8];
/// let grid = Grid::from_corners(2, corners).unwrap();
/// assert_eq!(grid.cell_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dimension: u32,
    corners: Vec<GridCorner>,
}

impl Grid {
    /// Wraps a corner array, validating the `n³` invariant.
    pub fn from_corners(dimension: u32, corners: Vec<GridCorner>) -> Result<Self, GridError> {
        check_dimension(dimension)?;
        // check_dimension bounds n, so n³ cannot overflow.
        let expected = corner_count(dimension).unwrap_or(usize::MAX);
        if corners.len() != expected {
            return Err(GridError::LengthMismatch {
                dimension,
                expected,
                actual: corners.len(),
            });
        }
        Ok(Self { dimension, corners })
    }

    /// Grid dimension `n`.
    #[inline]
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// All corners in flat row-major order.
    #[inline]
    pub fn corners(&self) -> &[GridCorner] {
        &self.corners
    }

    /// Consumes the grid, returning its corners.
    pub fn into_corners(self) -> Vec<GridCorner> {
        self.corners
    }

    /// Number of corners (`n³`).
    #[inline]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    /// Returns true for a zero-dimensional grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Number of cubic cells, `(n-1)³`; zero when `n < 2`.
    pub fn cell_count(&self) -> u64 {
        let cells = u64::from(self.dimension.saturating_sub(1));
        cells * cells * cells
    }

    /// Flat index of corner `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: u32, j: u32, k: u32) -> usize {
        let n = self.dimension as usize;
        (i as usize * n + j as usize) * n + k as usize
    }

    /// Corner `(i, j, k)`, or `None` outside the lattice.
    pub fn corner(&self, i: u32, j: u32, k: u32) -> Option<&GridCorner> {
        let n = self.dimension;
        if i >= n || j >= n || k >= n {
            return None;
        }
        self.corners.get(self.index(i, j, k))
    }

    /// Smallest and largest sampled value, ignoring NaN.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.corners
            .iter()
            .map(|corner| corner.value)
            .filter(|value| !value.is_nan())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================
