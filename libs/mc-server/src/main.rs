use std::process::ExitCode;

use clap::Parser;
use config::constants::{ServiceConfig, DEFAULT_BIND_ADDRESS, DEFAULT_PORT, MAX_GRID_DIMENSION};
use log::error;
use mc_extract::{ComputeSession, CpuDevice, SurfaceExtractor};
use mc_server::{wait_for_quit, MeshService, Server, ServerError};

/// Marching cubes extraction service. Type `quit` to stop.
#[derive(Debug, Parser)]
#[command(name = "mc-server", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    bind: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Largest grid dimension accepted.
    #[arg(long, default_value_t = MAX_GRID_DIMENSION)]
    max_dimension: u32,

    /// Evaluate unsupported expression nodes as 0 instead of rejecting the request.
    #[arg(long)]
    lenient: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let config = ServiceConfig::new(&args.bind, args.port, args.max_dimension, args.lenient)?;
    let extractor = SurfaceExtractor::spawn(ComputeSession::new(CpuDevice::new()))?;
    let server = Server::bind(&config, MeshService::new(extractor, &config)).await?;
    server.run_until(wait_for_quit()).await
}
