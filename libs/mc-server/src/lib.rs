//! # Marching Cubes Server
//!
//! Network front end: clients send a grid (binary) or a scalar field (JSON)
//! in a frame and receive the extracted triangle soup.
//!
//! ## Example
//!
//! ```rust,no_run
//! use config::constants::ServiceConfig;
//! use mc_extract::{ComputeSession, CpuDevice, SurfaceExtractor};
//! use mc_server::{wait_for_quit, MeshService, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mc_server::ServerError> {
//!     let config = ServiceConfig::default();
//!     let extractor = SurfaceExtractor::spawn(ComputeSession::new(CpuDevice::new()))?;
//!     let server = Server::bind(&config, MeshService::new(extractor, &config)).await?;
//!     server.run_until(wait_for_quit()).await
//! }
//! ```

pub mod error;
pub mod frame;
pub mod server;
pub mod service;

pub use error::ServerError;
pub use frame::{
    read_request, read_response, write_request, write_response, RequestFrame, RequestKind,
    ResponseFrame, Status,
};
pub use server::{wait_for_quit, wait_for_quit_from, Server};
pub use service::MeshService;
