//! # Field Requests
//!
//! JSON alternative to a pre-sampled grid: the client sends the scalar field
//! as a CindyScript function tree and the service samples it.
//!
//! ```json
//! {
//!   "origin": [-1.5, -1.5, -1.5],
//!   "spacing": 0.1,
//!   "dimension": 31,
//!   "iso_level": 0.0,
//!   "function": {"body": {"ctype": "variable", "name": "x"}},
//!   "variables": {"r": 1.0}
//! }
//! ```
//!
//! `iso_level` defaults to `DEFAULT_ISO_LEVEL` and `variables` to empty.

use config::constants::{DEFAULT_ISO_LEVEL, MAX_EXPRESSION_DEPTH, MAX_GRID_DIMENSION, MAX_JSON_DEPTH};
use glam::Vec3;
use log::debug;
use mc_expr::{decode_function, Environment, EvalError, Expression, UnsupportedPolicy};
use mc_grid::{build_grid, GridSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::WireError;
use crate::request::GridRequest;

fn default_iso_level() -> f32 {
    DEFAULT_ISO_LEVEL
}

/// A scalar field to sample and extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRequest {
    /// Position of corner `(0, 0, 0)`.
    pub origin: Vec3,
    /// Distance between neighbouring corners.
    pub spacing: f32,
    /// Corners per axis.
    pub dimension: u32,
    /// Level to extract.
    #[serde(default = "default_iso_level")]
    pub iso_level: f32,
    /// CindyScript function definition; its `body` is sampled.
    pub function: Json,
    /// Global variable bindings.
    #[serde(default)]
    pub variables: Environment,
}

impl FieldRequest {
    /// Parse a request from its JSON payload.
    ///
    /// serde_json's own nesting limit is lifted so that expression trees up
    /// to `MAX_EXPRESSION_DEPTH` get through; payloads nested deeper than
    /// `MAX_JSON_DEPTH` are refused before parsing.
    ///
    /// ## Errors
    ///
    /// - `Eval(TooDeep)` past `MAX_JSON_DEPTH`
    /// - `Json` for syntax errors, missing fields or trailing characters
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WireError> {
        if nesting_depth(bytes) > MAX_JSON_DEPTH {
            return Err(EvalError::TooDeep {
                max: MAX_EXPRESSION_DEPTH,
            }
            .into());
        }
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        deserializer.disable_recursion_limit();
        let request = Self::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(request)
    }

    /// Lattice placement described by the request.
    pub fn spec(&self) -> GridSpec {
        GridSpec::new(self.origin, self.spacing, self.dimension)
    }

    /// Decode the function body.
    pub fn expression(&self, policy: UnsupportedPolicy) -> Result<Expression, WireError> {
        Ok(decode_function(&self.function, policy)?)
    }

    /// Decode and sample the field into a grid request.
    ///
    /// ## Errors
    ///
    /// - `DimensionTooLarge` above `max_dimension`, before any sampling
    /// - `Eval` for trees that fail to decode under `policy`
    /// - `Grid` for invalid spacing or a failing sample
    pub fn build(&self, policy: UnsupportedPolicy, max_dimension: u32) -> Result<GridRequest, WireError> {
        let max = max_dimension.min(MAX_GRID_DIMENSION);
        if self.dimension > max {
            return Err(WireError::DimensionTooLarge {
                dimension: self.dimension,
                max,
            });
        }
        let expression = self.expression(policy)?;
        debug!("Sampling field {} over n = {}", expression, self.dimension);
        let grid = build_grid(&self.spec(), &expression, &self.variables)?;
        Ok(GridRequest {
            grid,
            iso_level: self.iso_level,
        })
    }
}

/// Deepest `{`/`[` nesting in a JSON text, ignoring brackets inside strings.
fn nesting_depth(bytes: &[u8]) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for &byte in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

// =============================================================================
// TESTS
// =============================================================================
