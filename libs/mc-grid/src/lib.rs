//! # Marching Cubes Grid
//!
//! Cartesian sample grids feeding the surface extractor.
//!
//! ## Architecture
//!
//! ```text
//! GridSpec + Expression + Environment → build_grid → Grid (n³ corners) → mc-extract
//! ```
//!
//! ## Layout
//!
//! Corner `(i, j, k)` lives at flat index `i*n² + j*n + k` and sits at
//! world position `origin + spacing * (k, j, i)`: `i` walks z, `j` walks y
//! and `k` walks x.

pub mod builder;
pub mod error;
pub mod grid;

pub use builder::{build_grid, GridSpec};
pub use error::GridError;
pub use grid::{corner_count, Grid, GridCorner};
