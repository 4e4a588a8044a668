//! Centralized configuration values shared across the marching cubes service.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// NETWORK
// =============================================================================

/// TCP port the service listens on when none is configured.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_PORT;
/// assert_eq!(DEFAULT_PORT, 17279);
/// ```
pub const DEFAULT_PORT: u16 = 17279;

/// Address the service binds to when none is configured.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_BIND_ADDRESS;
/// assert!(DEFAULT_BIND_ADDRESS.parse::<std::net::IpAddr>().is_ok());
/// ```
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Largest message payload accepted from or sent to a client (320 MB).
///
/// # Examples
/// ```
/// use config::constants::{MAX_MESSAGE_SIZE, MAX_GRID_DIMENSION, GRID_CORNER_BYTES, GRID_HEADER_BYTES};
/// let n = MAX_GRID_DIMENSION as usize;
/// assert!(GRID_HEADER_BYTES + n * n * n * GRID_CORNER_BYTES <= MAX_MESSAGE_SIZE);
/// ```
pub const MAX_MESSAGE_SIZE: usize = 320_000_000;

// =============================================================================
// WIRE LAYOUT
// =============================================================================

/// Size of the grid dimension header (`u32`) that opens a grid request.
pub const GRID_HEADER_BYTES: usize = 4;

/// Size of one grid corner record: position (3 x f32) followed by value (f32).
pub const GRID_CORNER_BYTES: usize = 16;

/// Size of one response vertex (3 x f32).
pub const VERTEX_BYTES: usize = 12;

/// Size of one vertex in device memory. Devices pad 3-component vectors to 4.
pub const DEVICE_VERTEX_BYTES: usize = 16;

// =============================================================================
// LIMITS
// =============================================================================

/// Largest accepted grid dimension `n` (the grid holds `n³` corners).
///
/// Bounds both the request payload and the host allocation made for it.
///
/// # Examples
/// ```
/// use config::constants::MAX_GRID_DIMENSION;
/// assert!((MAX_GRID_DIMENSION as u64).pow(3) < u32::MAX as u64);
/// ```
pub const MAX_GRID_DIMENSION: u32 = 256;

/// Largest vertex count an extraction may produce.
///
/// Derived from the response size limit so an accepted mesh always fits in
/// one message.
///
/// # Examples
/// ```
/// use config::constants::{MAX_VERTICES, MAX_MESSAGE_SIZE, VERTEX_BYTES};
/// assert!(MAX_VERTICES * VERTEX_BYTES <= MAX_MESSAGE_SIZE);
/// ```
pub const MAX_VERTICES: usize = MAX_MESSAGE_SIZE / VERTEX_BYTES;

/// Maximum nesting depth of a decoded scalar-field expression.
///
/// # Examples
/// ```
/// use config::constants::MAX_EXPRESSION_DEPTH;
/// assert!(MAX_EXPRESSION_DEPTH >= 64);
/// ```
pub const MAX_EXPRESSION_DEPTH: usize = 512;

/// Maximum JSON nesting accepted in a field request.
///
/// Each expression level takes two JSON levels (the node and its `args`
/// array), plus the request envelope and number `value` objects.
///
/// # Examples
/// ```
/// use config::constants::{MAX_EXPRESSION_DEPTH, MAX_JSON_DEPTH};
/// assert!(MAX_JSON_DEPTH > 2 * (MAX_EXPRESSION_DEPTH + 1) + 2);
/// ```
pub const MAX_JSON_DEPTH: usize = 2 * MAX_EXPRESSION_DEPTH + 8;

/// Bytes of stack space reserved when growing recursion limits using the
/// `stacker` crate.
///
/// # Examples
/// ```
/// use config::constants::STACKER_STACK_SIZE_BYTES;
/// assert!(STACKER_STACK_SIZE_BYTES >= 1024);
/// ```
pub const STACKER_STACK_SIZE_BYTES: usize = 8 * 1024 * 1024;

// =============================================================================
// EXTRACTION DEFAULTS
// =============================================================================

/// Iso level used for binary grid requests, which carry no level of their own.
pub const DEFAULT_ISO_LEVEL: f32 = 0.0;

/// Local work-group size for the 3D kernel dispatches (x, y, z).
///
/// # Examples
/// ```
/// use config::constants::LOCAL_WORK_SIZE;
/// assert_eq!(LOCAL_WORK_SIZE.iter().product::<u32>(), 256);
/// ```
pub const LOCAL_WORK_SIZE: [u32; 3] = [64, 4, 1];

/// Extraction requests that may wait for the device worker before senders
/// are held back.
pub const EXTRACTION_QUEUE_DEPTH: usize = 64;

// =============================================================================
// SERVICE CONFIG
// =============================================================================

/// Validated runtime configuration of the service.
///
/// # Examples
/// ```
/// use config::constants::ServiceConfig;
/// let config = ServiceConfig::default();
/// assert_eq!(config.port, 17279);
/// assert!(!config.lenient_expressions);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Address the listener binds to.
    pub bind_address: String,
    /// Listener port. `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Largest grid dimension accepted from clients.
    pub max_dimension: u32,
    /// Evaluate unsupported expression nodes as `0.0` instead of rejecting.
    pub lenient_expressions: bool,
}

impl ServiceConfig {
    /// Builds a configuration, validating the address and grid limit.
    ///
    /// # Examples
    /// ```
    /// use config::constants::{ServiceConfig, ConfigError};
    /// let cfg = ServiceConfig::new("127.0.0.1", 0, 32, false).expect("valid config");
    /// assert_eq!(cfg.max_dimension, 32);
    /// assert_eq!(
    ///     ServiceConfig::new("127.0.0.1", 0, 1, false).unwrap_err(),
    ///     ConfigError::InvalidDimension(1)
    /// );
    /// ```
    pub fn new(
        bind_address: &str,
        port: u16,
        max_dimension: u32,
        lenient_expressions: bool,
    ) -> Result<Self, ConfigError> {
        if bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::InvalidAddress(bind_address.to_string()));
        }
        if !(2..=MAX_GRID_DIMENSION).contains(&max_dimension) {
            return Err(ConfigError::InvalidDimension(max_dimension));
        }
        Ok(Self {
            bind_address: bind_address.to_string(),
            port,
            max_dimension,
            lenient_expressions,
        })
    }

    /// Socket address string suitable for `TcpListener::bind`.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_dimension: MAX_GRID_DIMENSION,
            lenient_expressions: false,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the bind address is not an IP address.
    InvalidAddress(String),
    /// Raised when the grid limit is below 2 or above `MAX_GRID_DIMENSION`.
    InvalidDimension(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddress(value) => {
                write!(f, "bind address must be an IP address: {value}")
            }
            ConfigError::InvalidDimension(value) => {
                write!(
                    f,
                    "max_dimension must be within 2..={MAX_GRID_DIMENSION}: {value}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests;
