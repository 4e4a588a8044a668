//! # Compute Device Interface
//!
//! The seam between the extraction state machine and whatever executes the
//! two marching-cubes kernels. A device owns its buffers through the
//! associated [`ComputeDevice::Buffer`] type; the session only holds opaque
//! handles and never touches device memory directly.
//!
//! Kernel contracts:
//!
//! - `computeNumVertices`: each work-item `(gx, gy, gz)` inside
//!   `[0, n-1)³` classifies cell `(i = gz, j = gy, k = gx)` and atomically
//!   adds the number of vertices the cell emits to the counter.
//! - `marchingCubes`: each in-range work-item reserves a contiguous block of
//!   vertex slots through the counter and writes one `[x, y, z, 1]` per slot.
//!
//! Work-items outside the cell range (from padding) are no-ops in both.

use mc_grid::GridCorner;

use crate::error::DeviceError;
use crate::range::NdRange;

/// One of the two extraction kernels with its bound arguments.
#[derive(Debug)]
pub enum Kernel<'b, B> {
    /// Count pass.
    ComputeNumVertices {
        grid: &'b B,
        counter: &'b B,
        dimension: u32,
        iso_level: f32,
    },
    /// Generate pass.
    MarchingCubes {
        grid: &'b B,
        vertices: &'b B,
        counter: &'b B,
        dimension: u32,
        iso_level: f32,
    },
}

impl<B> Kernel<'_, B> {
    /// Kernel entry-point name.
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::ComputeNumVertices { .. } => "computeNumVertices",
            Kernel::MarchingCubes { .. } => "marchingCubes",
        }
    }

    /// Grid dimension `n` the kernel is launched for.
    pub fn dimension(&self) -> u32 {
        match self {
            Kernel::ComputeNumVertices { dimension, .. }
            | Kernel::MarchingCubes { dimension, .. } => *dimension,
        }
    }
}

/// A device that can run the count and generate kernels.
///
/// All calls are synchronous: when a method returns, the operation has
/// completed on the device. Implementations are driven by exactly one
/// [`ComputeSession`](crate::ComputeSession) at a time.
pub trait ComputeDevice: Send {
    /// Handle to a device buffer.
    type Buffer: Send;

    /// Human-readable device name, logged at startup.
    fn name(&self) -> &str;

    /// Work-group size the device prefers for the extraction kernels.
    fn preferred_local_size(&self) -> [u32; 3];

    /// Copy grid corners into a read-only device buffer.
    fn upload_grid(&mut self, corners: &[GridCorner]) -> Result<Self::Buffer, DeviceError>;

    /// Allocate a single `u32` counter initialised to zero.
    fn create_counter(&mut self) -> Result<Self::Buffer, DeviceError>;

    /// Overwrite a counter.
    fn write_counter(&mut self, counter: &Self::Buffer, value: u32) -> Result<(), DeviceError>;

    /// Read a counter back to the host.
    fn read_counter(&mut self, counter: &Self::Buffer) -> Result<u32, DeviceError>;

    /// Allocate room for `capacity` four-component vertices.
    fn create_vertex_buffer(&mut self, capacity: u32) -> Result<Self::Buffer, DeviceError>;

    /// Run `kernel` over `range` and wait for it to finish.
    fn dispatch(&mut self, kernel: Kernel<'_, Self::Buffer>, range: NdRange)
        -> Result<(), DeviceError>;

    /// Read the first `count` vertices back to the host.
    fn read_vertices(
        &mut self,
        vertices: &Self::Buffer,
        count: u32,
    ) -> Result<Vec<[f32; 4]>, DeviceError>;

    /// Free a buffer. The default drops the handle.
    fn release(&mut self, buffer: Self::Buffer) {
        drop(buffer);
    }
}
