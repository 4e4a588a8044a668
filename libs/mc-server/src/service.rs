//! # Mesh Service
//!
//! Request pipeline shared by every connection: decode, (sample), extract,
//! encode. Decoding errors are answered before anything reaches the device.

use std::time::Instant;

use config::constants::ServiceConfig;
use log::{info, warn};
use mc_expr::UnsupportedPolicy;
use mc_extract::SurfaceExtractor;
use mc_wire::{decode_request_with_limit, encode_response, FieldRequest, GridRequest};

use crate::error::ServerError;
use crate::frame::{RequestFrame, RequestKind, ResponseFrame};

/// Stateless request handler in front of the extraction worker.
pub struct MeshService {
    extractor: SurfaceExtractor,
    policy: UnsupportedPolicy,
    max_dimension: u32,
}

impl MeshService {
    /// Wraps `extractor` with the request limits of `config`.
    pub fn new(extractor: SurfaceExtractor, config: &ServiceConfig) -> Self {
        let policy = if config.lenient_expressions {
            UnsupportedPolicy::Lenient
        } else {
            UnsupportedPolicy::Reject
        };
        Self {
            extractor,
            policy,
            max_dimension: config.max_dimension,
        }
    }

    /// Name of the compute device serving extractions.
    pub fn device_name(&self) -> &str {
        self.extractor.device_name()
    }

    /// Answer one request frame. Failures become error responses.
    pub async fn handle(&self, frame: RequestFrame) -> ResponseFrame {
        match self.process(frame).await {
            Ok(payload) => ResponseFrame::ok(payload),
            Err(err) => {
                warn!("Request rejected: {}", err);
                ResponseFrame::error(err)
            }
        }
    }

    /// Run the pipeline for one request, returning the encoded vertices.
    pub async fn process(&self, frame: RequestFrame) -> Result<Vec<u8>, ServerError> {
        let start = Instant::now();
        let kind = RequestKind::from_byte(frame.kind).ok_or(ServerError::UnknownKind(frame.kind))?;
        let (payload, policy, max_dimension) = (frame.payload, self.policy, self.max_dimension);
        let GridRequest { grid, iso_level } = blocking(move || match kind {
            RequestKind::Grid => decode_request_with_limit(&payload, max_dimension),
            RequestKind::Field => FieldRequest::from_slice(&payload)?.build(policy, max_dimension),
        })
        .await??;

        let dimension = grid.dimension();
        let mesh = self.extractor.extract(grid, iso_level).await?;
        let triangles = mesh.triangle_count();
        let payload = blocking(move || encode_response(&mesh.vertices)).await?;
        info!(
            "{:?} request n = {}: {} triangles, {} bytes in {:.3}s",
            kind,
            dimension,
            triangles,
            payload.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(payload)
    }
}

/// Runs CPU-heavy work (decoding, sampling, encoding) on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ServerError::Task(err.to_string()))
}
