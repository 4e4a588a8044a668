//! # Extraction Errors

use thiserror::Error;

/// Failures reported by a [`ComputeDevice`](crate::ComputeDevice).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    /// No usable device could be opened.
    #[error("No compute device available: {0}")]
    Unavailable(String),

    /// A kernel could not be enqueued or failed while running.
    #[error("Kernel '{kernel}' failed: {message}")]
    Launch {
        kernel: &'static str,
        message: String,
    },

    /// A kernel argument is bound to a buffer of the wrong kind.
    #[error("Kernel '{kernel}': argument '{argument}' has the wrong buffer kind")]
    InvalidArgument {
        kernel: &'static str,
        argument: &'static str,
    },

    /// Allocation larger than the device accepts.
    #[error("Allocation of {requested} bytes exceeds device limit of {limit} bytes")]
    OutOfMemory { requested: usize, limit: usize },

    /// Read or write past the end of a buffer, or on the wrong buffer kind.
    #[error("Buffer access out of range: {0}")]
    OutOfRange(String),

    /// Work range rejected by the device.
    #[error("Invalid work range: {0}")]
    InvalidRange(String),
}

impl DeviceError {
    /// Create a launch error.
    pub fn launch(kernel: &'static str, message: impl Into<String>) -> Self {
        Self::Launch {
            kernel,
            message: message.into(),
        }
    }
}

/// Errors returned by [`ComputeSession::extract`](crate::ComputeSession::extract)
/// and the [`SurfaceExtractor`](crate::SurfaceExtractor) queue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// The device failed during one of the passes.
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// The generate pass wrote a different number of vertices than the
    /// count pass reported.
    #[error("Count pass reported {counted} vertices but generate pass wrote {generated}")]
    CountMismatch { counted: u32, generated: u32 },

    /// The count pass reported a vertex count that is not a whole number of
    /// triangles.
    #[error("Vertex count {0} is not a multiple of 3")]
    IncompleteTriangles(u32),

    /// The mesh would not fit in a response message.
    #[error("Mesh of {count} vertices exceeds maximum {max}")]
    TooManyVertices { count: usize, max: usize },

    /// The extraction worker has exited.
    #[error("Extraction worker has stopped")]
    WorkerStopped,

    /// The extraction worker thread could not be started.
    #[error("Failed to start extraction worker: {0}")]
    Spawn(String),
}
