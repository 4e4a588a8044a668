//! # Work Ranges
//!
//! Three-dimensional launch geometry. Every global dimension is padded up to
//! a multiple of the local (work-group) size, so some work-items fall outside
//! the cell range; kernels treat those as no-ops.

use crate::error::DeviceError;

/// Round `extent` up to the next multiple of `local`.
///
/// # Example
///
/// ```rust
/// use mc_extract::range::pad_extent;
/// assert_eq!(pad_extent(3, 64), 64);
/// assert_eq!(pad_extent(128, 64), 128);
/// assert_eq!(pad_extent(0, 4), 0);
/// ```
#[inline]
pub fn pad_extent(extent: u32, local: u32) -> u32 {
    extent.div_ceil(local) * local
}

/// Global and local sizes of a kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdRange {
    /// Total work-items per dimension, a multiple of `local`.
    pub global: [u32; 3],
    /// Work-group size per dimension.
    pub local: [u32; 3],
}

impl NdRange {
    /// Build a range covering `extent` work-items, padding each dimension
    /// to a multiple of `local`.
    ///
    /// ## Errors
    ///
    /// `InvalidRange` if any local dimension is zero or padding overflows.
    pub fn padded(extent: [u32; 3], local: [u32; 3]) -> Result<Self, DeviceError> {
        let mut global = [0u32; 3];
        for axis in 0..3 {
            let (size, group) = (extent[axis], local[axis]);
            if group == 0 {
                return Err(DeviceError::InvalidRange(format!(
                    "local size {local:?} has a zero dimension"
                )));
            }
            global[axis] = size
                .div_ceil(group)
                .checked_mul(group)
                .ok_or_else(|| {
                    DeviceError::InvalidRange(format!(
                        "extent {size} cannot be padded to a multiple of {group}"
                    ))
                })?;
        }
        Ok(Self { global, local })
    }

    /// Total number of work-items.
    pub fn work_items(&self) -> u64 {
        self.global.iter().map(|&size| u64::from(size)).product()
    }

    /// Work-items per group.
    pub fn group_size(&self) -> u64 {
        self.local.iter().map(|&size| u64::from(size)).product()
    }

    /// Number of work-groups per dimension.
    pub fn groups(&self) -> [u32; 3] {
        [
            self.global[0] / self.local[0],
            self.global[1] / self.local[1],
            self.global[2] / self.local[2],
        ]
    }

    /// Splits a flat work-item index into `(gx, gy, gz)`, x fastest.
    #[inline]
    pub fn unflatten(&self, index: u64) -> [u32; 3] {
        let [sx, sy, _] = self.global.map(u64::from);
        [
            (index % sx) as u32,
            ((index / sx) % sy) as u32,
            (index / (sx * sy)) as u32,
        ]
    }
}

// =============================================================================
// TESTS
// =============================================================================
