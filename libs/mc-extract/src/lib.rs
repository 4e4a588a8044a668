//! # Marching Cubes Extraction
//!
//! Turns a sampled [`Grid`](mc_grid::Grid) into a triangle soup on a compute
//! device using two kernel passes: one to count output vertices, one to
//! write them into an exactly-sized buffer.
//!
//! ## Architecture
//!
//! ```text
//! SurfaceExtractor ──mpsc──▶ worker thread ──▶ ComputeSession<D: ComputeDevice>
//!        ▲                                          │
//!        └───────────────── oneshot ◀───────────────┘
//! ```
//!
//! [`CpuDevice`] is the built-in device; other backends implement
//! [`ComputeDevice`].
//!
//! ## Example
//!
//! ```rust
//! use mc_extract::{ComputeSession, CpuDevice};
//! use mc_grid::{Grid, GridCorner};
//!
//! // one cell, one corner below the level
//! let mut corners = vec![GridCorner::new([0.0; 3], 1.0); 8];
//! corners[0].value = -1.0;
//! let grid = Grid::from_corners(2, corners).unwrap();
//!
//! let mut session = ComputeSession::new(CpuDevice::new());
//! let mesh = session.extract(&grid, 0.0).unwrap();
//! assert_eq!(mesh.vertices.len() % 3, 0);
//! assert_eq!(mesh.vertices.len() as u32, mesh.counted);
//! ```

pub mod cpu;
pub mod device;
pub mod error;
pub mod extractor;
pub mod range;
pub mod session;

pub use cpu::{CpuBuffer, CpuDevice};
pub use device::{ComputeDevice, Kernel};
pub use error::{DeviceError, ExtractError};
pub use extractor::SurfaceExtractor;
pub use range::NdRange;
pub use session::{ComputeSession, Extraction};
