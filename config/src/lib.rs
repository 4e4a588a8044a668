//! # Config Crate
//!
//! Centralized configuration constants for the marching cubes service.
//! Wire sizes, grid limits and device defaults are defined here so the
//! codec, the grid builder and the extractor agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GRID_CORNER_BYTES, MAX_GRID_DIMENSION};
//!
//! let n = 64u32;
//! assert!(n <= MAX_GRID_DIMENSION);
//! let payload = (n as usize).pow(3) * GRID_CORNER_BYTES;
//! assert_eq!(payload, 64 * 64 * 64 * 16);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Bounded Inputs**: Every size read from the network has a ceiling here
//! - **Wire Compatible**: Defaults match the deployed client (port, iso level)

pub mod constants;
