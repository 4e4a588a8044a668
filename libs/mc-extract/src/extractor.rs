//! # Surface Extractor
//!
//! Single-worker front end for a [`ComputeSession`]. The session is moved
//! onto a dedicated thread; callers queue `(grid, iso_level)` jobs and wait
//! for the reply, so device work from concurrent requests never interleaves.
//!
//! ## Example
//!
//! ```rust
//! use mc_extract::{ComputeSession, CpuDevice, SurfaceExtractor};
//! use mc_grid::{Grid, GridCorner};
//!
//! let extractor = SurfaceExtractor::spawn(ComputeSession::new(CpuDevice::new())).unwrap();
//! let grid = Grid::from_corners(2, vec![GridCorner::default(); 8]).unwrap();
//! let mesh = extractor.extract_blocking(grid, 0.0).unwrap();
//! assert!(mesh.is_empty());
//! extractor.shutdown();
//! ```

use std::thread::{self, JoinHandle};

use config::constants::EXTRACTION_QUEUE_DEPTH;
use log::{debug, error, warn};
use mc_grid::Grid;
use tokio::sync::{mpsc, oneshot};

use crate::device::ComputeDevice;
use crate::error::ExtractError;
use crate::session::{ComputeSession, Extraction};

struct Job {
    grid: Grid,
    iso_level: f32,
    reply: oneshot::Sender<Result<Extraction, ExtractError>>,
}

/// Queue in front of the device worker thread.
pub struct SurfaceExtractor {
    sender: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    device_name: String,
}

impl SurfaceExtractor {
    /// Moves `session` onto a new worker thread.
    pub fn spawn<D>(session: ComputeSession<D>) -> Result<Self, ExtractError>
    where
        D: ComputeDevice + 'static,
    {
        let device_name = session.device().name().to_string();
        let (sender, receiver) = mpsc::channel(EXTRACTION_QUEUE_DEPTH);
        let worker = thread::Builder::new()
            .name("mc-extract".to_string())
            .spawn(move || run_worker(session, receiver))
            .map_err(|err| ExtractError::Spawn(err.to_string()))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            device_name,
        })
    }

    /// Name of the device behind the worker.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Queue an extraction and wait for its result.
    pub async fn extract(&self, grid: Grid, iso_level: f32) -> Result<Extraction, ExtractError> {
        let sender = self.sender.as_ref().ok_or(ExtractError::WorkerStopped)?;
        let (reply, response) = oneshot::channel();
        sender
            .send(Job {
                grid,
                iso_level,
                reply,
            })
            .await
            .map_err(|_| ExtractError::WorkerStopped)?;
        response.await.map_err(|_| ExtractError::WorkerStopped)?
    }

    /// Blocking variant of [`extract`](Self::extract) for callers outside an
    /// async runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn extract_blocking(&self, grid: Grid, iso_level: f32) -> Result<Extraction, ExtractError> {
        let sender = self.sender.as_ref().ok_or(ExtractError::WorkerStopped)?;
        let (reply, response) = oneshot::channel();
        sender
            .blocking_send(Job {
                grid,
                iso_level,
                reply,
            })
            .map_err(|_| ExtractError::WorkerStopped)?;
        response
            .blocking_recv()
            .map_err(|_| ExtractError::WorkerStopped)?
    }

    /// Close the queue and wait for the worker to finish queued jobs.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Extraction worker panicked");
            }
        }
    }
}

impl Drop for SurfaceExtractor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<D: ComputeDevice>(mut session: ComputeSession<D>, mut receiver: mpsc::Receiver<Job>) {
    debug!("Extraction worker started");
    while let Some(job) = receiver.blocking_recv() {
        let result = session.extract(&job.grid, job.iso_level);
        if let Err(err) = &result {
            warn!("Extraction failed: {}", err);
        }
        if job.reply.send(result).is_err() {
            debug!("Extraction requester went away before the result was ready");
        }
    }
    debug!("Extraction worker stopped");
}
