//! # Marching Cubes Wire Formats
//!
//! Byte-level encodings shared by the server and its clients. All
//! multi-byte fields are little-endian.
//!
//! ## Messages
//!
//! | Message        | Layout                                         |
//! |----------------|------------------------------------------------|
//! | Grid request   | `u32 n` + `n³ × {x, y, z, value: f32}`         |
//! | Field request  | JSON [`FieldRequest`]                          |
//! | Mesh response  | `k × {x, y, z: f32}`, `k` a multiple of 3      |

pub mod error;
pub mod field;
pub mod request;
pub mod response;

pub use error::WireError;
pub use field::FieldRequest;
pub use request::{decode_request, decode_request_with_limit, encode_request, GridRequest};
pub use response::{decode_response, encode_response, triangle_count, TRIANGLE_BYTES};
