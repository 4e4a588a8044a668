//! # Compute Session
//!
//! Drives one device through the two-pass extraction:
//!
//! ```text
//! upload grid, zeroed counter
//!   → computeNumVertices → read counter → write 0
//!   → allocate `count` vertices → marchingCubes → read counter
//!   → download `count` vertices as [x, y, z, 1], keep x, y, z
//! ```
//!
//! A session is not shared; [`SurfaceExtractor`](crate::SurfaceExtractor)
//! moves it onto a worker thread so every extraction runs to completion
//! before the next one starts.

use std::time::{Duration, Instant};

use config::constants::MAX_VERTICES;
use log::{debug, info};
use mc_grid::Grid;

use crate::device::{ComputeDevice, Kernel};
use crate::error::ExtractError;
use crate::range::NdRange;

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Triangle soup, three consecutive vertices per triangle.
    pub vertices: Vec<[f32; 3]>,
    /// Vertex count reported by the count pass.
    pub counted: u32,
    /// Wall time spent on the device passes.
    pub elapsed: Duration,
}

impl Extraction {
    fn empty(elapsed: Duration) -> Self {
        Self {
            vertices: Vec::new(),
            counted: 0,
            elapsed,
        }
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Returns true when the iso-surface does not cross the grid.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Exclusive owner of a compute device.
pub struct ComputeSession<D: ComputeDevice> {
    device: D,
    local_size: [u32; 3],
}

impl<D: ComputeDevice> ComputeSession<D> {
    /// Opens a session using the device's preferred work-group size.
    pub fn new(device: D) -> Self {
        let local_size = device.preferred_local_size();
        info!(
            "Compute device: {} (local work size {:?})",
            device.name(),
            local_size
        );
        Self { device, local_size }
    }

    /// The underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Work-group size used for both passes.
    pub fn local_size(&self) -> [u32; 3] {
        self.local_size
    }

    /// Extract the `iso_level` surface of `grid` as a triangle soup.
    ///
    /// ## Errors
    ///
    /// - `Device` for any failed upload, dispatch or readback
    /// - `TooManyVertices` when the mesh exceeds `MAX_VERTICES`
    /// - `IncompleteTriangles` / `CountMismatch` when the kernels break
    ///   their contract
    pub fn extract(&mut self, grid: &Grid, iso_level: f32) -> Result<Extraction, ExtractError> {
        let start = Instant::now();
        let n = grid.dimension();
        if n < 2 {
            debug!("Grid of dimension {} has no cells", n);
            return Ok(Extraction::empty(start.elapsed()));
        }

        let range = NdRange::padded([n - 1; 3], self.local_size)?;
        let grid_buffer = self.device.upload_grid(grid.corners())?;
        let counter = self.device.create_counter()?;

        self.device.dispatch(
            Kernel::ComputeNumVertices {
                grid: &grid_buffer,
                counter: &counter,
                dimension: n,
                iso_level,
            },
            range,
        )?;
        let counted = self.device.read_counter(&counter)?;
        self.device.write_counter(&counter, 0)?;
        debug!("Count pass: {} vertices (n = {})", counted, n);

        if counted == 0 {
            self.device.release(counter);
            self.device.release(grid_buffer);
            debug!("Mesh empty.");
            return Ok(Extraction::empty(start.elapsed()));
        }
        if counted % 3 != 0 {
            return Err(ExtractError::IncompleteTriangles(counted));
        }
        if counted as usize > MAX_VERTICES {
            return Err(ExtractError::TooManyVertices {
                count: counted as usize,
                max: MAX_VERTICES,
            });
        }

        let vertex_buffer = self.device.create_vertex_buffer(counted)?;
        self.device.dispatch(
            Kernel::MarchingCubes {
                grid: &grid_buffer,
                vertices: &vertex_buffer,
                counter: &counter,
                dimension: n,
                iso_level,
            },
            range,
        )?;
        let generated = self.device.read_counter(&counter)?;
        if generated != counted {
            return Err(ExtractError::CountMismatch { counted, generated });
        }

        let raw = self.device.read_vertices(&vertex_buffer, counted)?;
        self.device.release(vertex_buffer);
        self.device.release(counter);
        self.device.release(grid_buffer);

        let vertices: Vec<[f32; 3]> = raw.into_iter().map(|[x, y, z, _]| [x, y, z]).collect();
        let elapsed = start.elapsed();
        info!(
            "Marching cubes finished in {:.3}s: {} vertices, {} triangles",
            elapsed.as_secs_f64(),
            vertices.len(),
            vertices.len() / 3
        );

        Ok(Extraction {
            vertices,
            counted,
            elapsed,
        })
    }
}
