//! # Grid Builder
//!
//! Samples a scalar-field expression at every corner of a regular lattice.
//! Z-slabs are sampled in parallel on the rayon pool; every corner evaluates
//! against its own [`LocalEnv`](mc_expr::LocalEnv), so assignments inside
//! the expression never leak between samples or threads.
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use mc_expr::{Environment, Expression};
//! use mc_grid::{build_grid, GridSpec};
//!
//! let spec = GridSpec::new(Vec3::ZERO, 0.5, 3);
//! let grid = build_grid(&spec, &Expression::variable("x"), &Environment::new()).unwrap();
//! assert_eq!(grid.len(), 27);
//! assert_eq!(grid.corners()[2].value, 1.0);
//! ```

use std::time::Instant;

use glam::Vec3;
use log::debug;
use mc_expr::{evaluate, Environment, EvalError, Expression};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::{check_dimension, corner_count, Grid, GridCorner};

/// Placement and resolution of a sample lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Position of corner `(0, 0, 0)`.
    pub origin: Vec3,
    /// Distance between neighbouring corners on every axis.
    pub spacing: f32,
    /// Corners per axis (`n`).
    pub dimension: u32,
}

impl GridSpec {
    /// Creates a grid specification.
    pub fn new(origin: Vec3, spacing: f32, dimension: u32) -> Self {
        Self {
            origin,
            spacing,
            dimension,
        }
    }

    /// World position of corner `(i, j, k)`: `origin + spacing * (k, j, i)`.
    #[inline]
    pub fn position(&self, i: u32, j: u32, k: u32) -> Vec3 {
        self.origin + self.spacing * Vec3::new(k as f32, j as f32, i as f32)
    }
}

/// Sample `expression` over the lattice described by `spec`.
///
/// ## Parameters
///
/// - `spec`: Origin, spacing and dimension of the lattice
/// - `expression`: Field body; `x`, `y`, `z` are bound per corner
/// - `globals`: Request-wide bindings, read-only
///
/// ## Errors
///
/// - `DimensionTooLarge` past `MAX_GRID_DIMENSION`
/// - `InvalidSpacing` for non-positive or non-finite spacing
/// - `Eval` for the first sample whose evaluation fails
pub fn build_grid(
    spec: &GridSpec,
    expression: &Expression,
    globals: &Environment,
) -> Result<Grid, GridError> {
    check_dimension(spec.dimension)?;
    if !(spec.spacing.is_finite() && spec.spacing > 0.0) {
        return Err(GridError::InvalidSpacing(spec.spacing));
    }

    let n = spec.dimension;
    let total = corner_count(n).unwrap_or(0);
    let mut corners = vec![GridCorner::default(); total];
    if total == 0 {
        return Grid::from_corners(n, corners);
    }

    let start = Instant::now();
    let slab = (n as usize) * (n as usize);
    corners
        .par_chunks_mut(slab)
        .enumerate()
        .try_for_each(|(i, slab)| sample_slab(spec, i as u32, slab, expression, globals))?;

    debug!(
        "Sampled {} corners (n = {}) in {:?}",
        total,
        n,
        start.elapsed()
    );
    Grid::from_corners(n, corners)
}

/// Fills the `n²` corners of z-slab `i`.
fn sample_slab(
    spec: &GridSpec,
    i: u32,
    slab: &mut [GridCorner],
    expression: &Expression,
    globals: &Environment,
) -> Result<(), EvalError> {
    let n = spec.dimension;
    for (offset, corner) in slab.iter_mut().enumerate() {
        let offset = offset as u32;
        let (j, k) = (offset / n, offset % n);
        let position = spec.position(i, j, k).to_array();
        let mut local = globals.local_at(position);
        *corner = GridCorner::new(position, evaluate(expression, &mut local)?);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
