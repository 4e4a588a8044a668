//! # Server Errors

use std::io;

use config::constants::ConfigError;
use mc_extract::ExtractError;
use mc_wire::WireError;
use thiserror::Error;

/// Errors raised by the service.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or stdin failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid startup configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request could not be decoded.
    #[error("{0}")]
    Wire(#[from] WireError),

    /// Extraction failed on the device.
    #[error("{0}")]
    Extract(#[from] ExtractError),

    /// Frame length above the message limit.
    #[error("Frame of {length} bytes exceeds maximum {max}")]
    FrameTooLarge { length: usize, max: usize },

    /// Request kind byte not recognised.
    #[error("Unknown request kind {0}")]
    UnknownKind(u8),

    /// Background task failed to complete.
    #[error("Task failed: {0}")]
    Task(String),
}
