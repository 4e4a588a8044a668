//! # CPU Reference Device
//!
//! Runs both extraction kernels on the rayon pool. Buffers live in host
//! memory; the counter is an [`AtomicU32`] and vertex slots are stored as
//! `f32` bit patterns in atomics, so work-items write their reserved slots
//! concurrently without locking.

mod polygonise;

use std::sync::atomic::{AtomicU32, Ordering};

use config::constants::{DEVICE_VERTEX_BYTES, GRID_CORNER_BYTES, LOCAL_WORK_SIZE};
use log::debug;
use mc_grid::{corner_count, GridCorner};
use rayon::prelude::*;

use crate::device::{ComputeDevice, Kernel};
use crate::error::DeviceError;
use crate::range::NdRange;

use polygonise::{count_cell, emit_cell, load_cell};

/// Largest single allocation the CPU device accepts by default (1 GiB).
pub const DEFAULT_MAX_ALLOCATION: usize = 1 << 30;

/// Largest work-group the CPU device accepts.
pub const MAX_WORK_GROUP_SIZE: u64 = 1024;

/// Host-memory buffer owned by a [`CpuDevice`].
#[derive(Debug)]
pub enum CpuBuffer {
    /// Read-only grid corners.
    Grid(Vec<GridCorner>),
    /// Single atomic counter.
    Counter(AtomicU32),
    /// Four `f32` bit patterns per vertex.
    Vertices(Box<[AtomicU32]>),
}

impl CpuBuffer {
    fn kind(&self) -> &'static str {
        match self {
            CpuBuffer::Grid(_) => "grid",
            CpuBuffer::Counter(_) => "counter",
            CpuBuffer::Vertices(_) => "vertices",
        }
    }

    fn as_grid(&self, kernel: &'static str, argument: &'static str) -> Result<&[GridCorner], DeviceError> {
        match self {
            CpuBuffer::Grid(corners) => Ok(corners),
            _ => Err(DeviceError::InvalidArgument { kernel, argument }),
        }
    }

    fn as_counter(&self, kernel: &'static str, argument: &'static str) -> Result<&AtomicU32, DeviceError> {
        match self {
            CpuBuffer::Counter(counter) => Ok(counter),
            _ => Err(DeviceError::InvalidArgument { kernel, argument }),
        }
    }

    fn as_vertices(&self, kernel: &'static str, argument: &'static str) -> Result<&[AtomicU32], DeviceError> {
        match self {
            CpuBuffer::Vertices(slots) => Ok(slots),
            _ => Err(DeviceError::InvalidArgument { kernel, argument }),
        }
    }
}

/// Compute device backed by host threads.
///
/// # Example
///
/// ```rust
/// use mc_extract::{ComputeDevice, CpuDevice};
///
/// let device = CpuDevice::new().with_local_size([8, 8, 1]);
/// assert_eq!(device.preferred_local_size(), [8, 8, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct CpuDevice {
    name: String,
    local_size: [u32; 3],
    max_allocation: usize,
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuDevice {
    /// Creates a device using the global rayon pool.
    pub fn new() -> Self {
        Self {
            name: format!("CPU reference device ({} threads)", rayon::current_num_threads()),
            local_size: LOCAL_WORK_SIZE,
            max_allocation: DEFAULT_MAX_ALLOCATION,
        }
    }

    /// Overrides the preferred work-group size.
    pub fn with_local_size(mut self, local_size: [u32; 3]) -> Self {
        self.local_size = local_size;
        self
    }

    /// Overrides the per-allocation limit.
    pub fn with_max_allocation(mut self, bytes: usize) -> Self {
        self.max_allocation = bytes;
        self
    }

    fn check_allocation(&self, requested: usize) -> Result<(), DeviceError> {
        if requested > self.max_allocation {
            return Err(DeviceError::OutOfMemory {
                requested,
                limit: self.max_allocation,
            });
        }
        Ok(())
    }

    fn check_range(&self, range: &NdRange) -> Result<(), DeviceError> {
        for axis in 0..3 {
            let (global, local) = (range.global[axis], range.local[axis]);
            if local == 0 || global % local != 0 {
                return Err(DeviceError::InvalidRange(format!(
                    "global size {:?} is not a multiple of local size {:?}",
                    range.global, range.local
                )));
            }
        }
        if range.group_size() > MAX_WORK_GROUP_SIZE {
            return Err(DeviceError::InvalidRange(format!(
                "work-group of {} items exceeds device maximum {}",
                range.group_size(),
                MAX_WORK_GROUP_SIZE
            )));
        }
        Ok(())
    }
}

fn check_grid(kernel: &'static str, corners: &[GridCorner], dimension: u32) -> Result<(), DeviceError> {
    if corner_count(dimension) != Some(corners.len()) {
        return Err(DeviceError::launch(
            kernel,
            format!(
                "grid buffer holds {} corners, dimension {} needs n³",
                corners.len(),
                dimension
            ),
        ));
    }
    Ok(())
}

impl ComputeDevice for CpuDevice {
    type Buffer = CpuBuffer;

    fn name(&self) -> &str {
        &self.name
    }

    fn preferred_local_size(&self) -> [u32; 3] {
        self.local_size
    }

    fn upload_grid(&mut self, corners: &[GridCorner]) -> Result<CpuBuffer, DeviceError> {
        self.check_allocation(corners.len().saturating_mul(GRID_CORNER_BYTES))?;
        Ok(CpuBuffer::Grid(corners.to_vec()))
    }

    fn create_counter(&mut self) -> Result<CpuBuffer, DeviceError> {
        Ok(CpuBuffer::Counter(AtomicU32::new(0)))
    }

    fn write_counter(&mut self, counter: &CpuBuffer, value: u32) -> Result<(), DeviceError> {
        match counter {
            CpuBuffer::Counter(cell) => {
                cell.store(value, Ordering::SeqCst);
                Ok(())
            }
            other => Err(DeviceError::OutOfRange(format!(
                "cannot write a counter into a {} buffer",
                other.kind()
            ))),
        }
    }

    fn read_counter(&mut self, counter: &CpuBuffer) -> Result<u32, DeviceError> {
        match counter {
            CpuBuffer::Counter(cell) => Ok(cell.load(Ordering::SeqCst)),
            other => Err(DeviceError::OutOfRange(format!(
                "cannot read a counter from a {} buffer",
                other.kind()
            ))),
        }
    }

    fn create_vertex_buffer(&mut self, capacity: u32) -> Result<CpuBuffer, DeviceError> {
        self.check_allocation((capacity as usize).saturating_mul(DEVICE_VERTEX_BYTES))?;
        let slots = (0..capacity as usize * 4).map(|_| AtomicU32::new(0)).collect();
        Ok(CpuBuffer::Vertices(slots))
    }

    fn dispatch(&mut self, kernel: Kernel<'_, CpuBuffer>, range: NdRange) -> Result<(), DeviceError> {
        self.check_range(&range)?;
        let name = kernel.name();
        debug!("Dispatching {} over {:?} (local {:?})", name, range.global, range.local);

        match kernel {
            Kernel::ComputeNumVertices {
                grid,
                counter,
                dimension,
                iso_level,
            } => {
                let corners = grid.as_grid(name, "grid")?;
                let counter = counter.as_counter(name, "counter")?;
                check_grid(name, corners, dimension)?;

                (0..range.work_items()).into_par_iter().for_each(|index| {
                    if let Some(cell) = load_cell(corners, dimension, range.unflatten(index)) {
                        let count = count_cell(&cell, iso_level);
                        if count > 0 {
                            counter.fetch_add(count, Ordering::Relaxed);
                        }
                    }
                });
            }
            Kernel::MarchingCubes {
                grid,
                vertices,
                counter,
                dimension,
                iso_level,
            } => {
                let corners = grid.as_grid(name, "grid")?;
                let slots = vertices.as_vertices(name, "vertexOut")?;
                let counter = counter.as_counter(name, "counter")?;
                check_grid(name, corners, dimension)?;

                (0..range.work_items()).into_par_iter().for_each(|index| {
                    let Some(cell) = load_cell(corners, dimension, range.unflatten(index)) else {
                        return;
                    };
                    let count = count_cell(&cell, iso_level);
                    if count == 0 {
                        return;
                    }
                    let mut slot = counter.fetch_add(count, Ordering::Relaxed) as usize;
                    emit_cell(&cell, iso_level, &mut |vertex| {
                        // Slots past the allocation are dropped; the session
                        // catches the overrun through the counter.
                        if let Some(target) = slots.get(slot * 4..slot * 4 + 4) {
                            for (bits, component) in target.iter().zip(vertex) {
                                bits.store(component.to_bits(), Ordering::Relaxed);
                            }
                        }
                        slot += 1;
                    });
                });
            }
        }
        Ok(())
    }

    fn read_vertices(&mut self, vertices: &CpuBuffer, count: u32) -> Result<Vec<[f32; 4]>, DeviceError> {
        let slots = match vertices {
            CpuBuffer::Vertices(slots) => slots,
            other => {
                return Err(DeviceError::OutOfRange(format!(
                    "cannot read vertices from a {} buffer",
                    other.kind()
                )))
            }
        };
        let wanted = count as usize * 4;
        if wanted > slots.len() {
            return Err(DeviceError::OutOfRange(format!(
                "read of {} vertices from a buffer of {}",
                count,
                slots.len() / 4
            )));
        }
        Ok(slots[..wanted]
            .par_chunks_exact(4)
            .map(|vertex| {
                [
                    f32::from_bits(vertex[0].load(Ordering::Relaxed)),
                    f32::from_bits(vertex[1].load(Ordering::Relaxed)),
                    f32::from_bits(vertex[2].load(Ordering::Relaxed)),
                    f32::from_bits(vertex[3].load(Ordering::Relaxed)),
                ]
            })
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_grid(dimension: u32, value: impl Fn(u32, u32, u32) -> f32) -> Vec<GridCorner> {
        let mut corners = Vec::new();
        for i in 0..dimension {
            for j in 0..dimension {
                for k in 0..dimension {
                    corners.push(GridCorner::new([k as f32, j as f32, i as f32], value(i, j, k)));
                }
            }
        }
        corners
    }

    #[test]
    fn test_counter_round_trip() {
        let mut device = CpuDevice::new();
        let counter = device.create_counter().unwrap();
        assert_eq!(device.read_counter(&counter).unwrap(), 0);
        device.write_counter(&counter, 42).unwrap();
        assert_eq!(device.read_counter(&counter).unwrap(), 42);
    }

    #[test]
    fn test_wrong_buffer_kind() {
        let mut device = CpuDevice::new();
        let grid = device.upload_grid(&sign_grid(2, |_, _, _| 1.0)).unwrap();
        assert!(matches!(device.read_counter(&grid), Err(DeviceError::OutOfRange(_))));

        let counter = device.create_counter().unwrap();
        let range = NdRange::padded([1; 3], [1, 1, 1]).unwrap();
        let err = device
            .dispatch(
                Kernel::ComputeNumVertices {
                    grid: &counter,
                    counter: &counter,
                    dimension: 2,
                    iso_level: 0.0,
                },
                range,
            )
            .unwrap_err();
        assert_eq!(
            err,
            DeviceError::InvalidArgument {
                kernel: "computeNumVertices",
                argument: "grid"
            }
        );
    }

    #[test]
    fn test_allocation_limit() {
        let mut device = CpuDevice::new().with_max_allocation(1024);
        let err = device.create_vertex_buffer(65).unwrap_err();
        assert_eq!(
            err,
            DeviceError::OutOfMemory {
                requested: 65 * 16,
                limit: 1024
            }
        );
        assert!(device.create_vertex_buffer(64).is_ok());
    }

    #[test]
    fn test_range_must_be_padded() {
        let mut device = CpuDevice::new();
        let grid = device.upload_grid(&sign_grid(4, |_, _, _| 1.0)).unwrap();
        let counter = device.create_counter().unwrap();
        let unpadded = NdRange {
            global: [3, 3, 3],
            local: [64, 4, 1],
        };
        let err = device
            .dispatch(
                Kernel::ComputeNumVertices {
                    grid: &grid,
                    counter: &counter,
                    dimension: 4,
                    iso_level: 0.0,
                },
                unpadded,
            )
            .unwrap_err();
        assert!(matches!(err, DeviceError::InvalidRange(_)));
    }

    #[test]
    fn test_padding_items_do_not_count() {
        let mut device = CpuDevice::new();
        // one inside corner at (0, 0, 0)
        let corners = sign_grid(2, |i, j, k| if i + j + k == 0 { -1.0 } else { 1.0 });
        let grid = device.upload_grid(&corners).unwrap();
        let counter = device.create_counter().unwrap();
        let range = NdRange::padded([1; 3], LOCAL_WORK_SIZE).unwrap();
        assert_eq!(range.work_items(), 256);
        device
            .dispatch(
                Kernel::ComputeNumVertices {
                    grid: &grid,
                    counter: &counter,
                    dimension: 2,
                    iso_level: 0.0,
                },
                range,
            )
            .unwrap();
        // corner 0 belongs to all six tetrahedra
        assert_eq!(device.read_counter(&counter).unwrap(), 18);
    }

    #[test]
    fn test_read_past_end() {
        let mut device = CpuDevice::new();
        let vertices = device.create_vertex_buffer(3).unwrap();
        assert_eq!(device.read_vertices(&vertices, 3).unwrap().len(), 3);
        assert!(matches!(
            device.read_vertices(&vertices, 4),
            Err(DeviceError::OutOfRange(_))
        ));
    }
}
