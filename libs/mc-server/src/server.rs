//! # TCP Server
//!
//! Accept loop plus one task per connection. A connection carries any number
//! of request/response exchanges in order; an oversized frame ends it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use config::constants::{ServiceConfig, MAX_MESSAGE_SIZE};
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;
use crate::frame::{read_request, write_response, ResponseFrame};
use crate::service::MeshService;

/// Bound listener ready to serve.
pub struct Server {
    listener: TcpListener,
    service: Arc<MeshService>,
}

impl Server {
    /// Bind the listener described by `config`.
    pub async fn bind(config: &ServiceConfig, service: MeshService) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.listen_address()).await?;
        Ok(Self {
            listener,
            service: Arc::new(service),
        })
    }

    /// Address actually bound, useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Listening on {} (device: {})",
            self.local_addr()?,
            self.service.device_name()
        );
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(connection) => connection,
                        Err(err) => {
                            warn!("Accept failed: {}", err);
                            continue;
                        }
                    };
                    let service = Arc::clone(&self.service);
                    tokio::spawn(async move {
                        if let Err(err) = serve_connection(stream, peer, &service).await {
                            error!("Connection {} failed: {}", peer, err);
                        }
                    });
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: &MeshService,
) -> Result<(), ServerError> {
    debug!("Connection from {}", peer);
    let (mut reader, mut writer) = stream.into_split();
    loop {
        let frame = match read_request(&mut reader, MAX_MESSAGE_SIZE).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err @ ServerError::FrameTooLarge { .. }) => {
                warn!("Closing connection {}: {}", peer, err);
                write_response(&mut writer, &ResponseFrame::error(&err)).await?;
                break;
            }
            Err(err) => return Err(err),
        };
        let response = service.handle(frame).await;
        write_response(&mut writer, &response).await?;
    }
    debug!("Connection {} closed", peer);
    Ok(())
}

/// Completes when stdin reads a `quit` line.
///
/// A closed or unreadable stdin (detached process, `< /dev/null`) never
/// completes, so the server keeps running until it is killed.
pub async fn wait_for_quit() {
    wait_for_quit_from(BufReader::new(tokio::io::stdin())).await
}

/// [`wait_for_quit`] over any line source.
pub async fn wait_for_quit_from<R>(input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim() == "quit" => return,
            Ok(Some(line)) => debug!("Ignoring console input '{}'", line.trim()),
            Ok(None) => {
                info!("Console closed, `quit` is no longer available");
                break;
            }
            Err(err) => {
                warn!("Console read failed: {}", err);
                break;
            }
        }
    }
    std::future::pending::<()>().await
}

// =============================================================================
// TESTS
// =============================================================================
