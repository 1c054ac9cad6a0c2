//! TCP exchange server.
//!
//! Accepts connections and answers every framed request on them through a
//! [`RequestHandler`] until the peer hangs up or shutdown is signalled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::codec::{read_request, write_response};
use crate::config::NetworkConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::traits::RequestHandler;

/// Producer-side listener.
#[derive(Debug)]
pub struct TcpExchangeServer {
    listener: TcpListener,
    config: NetworkConfig,
}

impl TcpExchangeServer {
    /// Bind to `config.listen_addr`.
    pub async fn bind(config: NetworkConfig) -> NetworkResult<Self> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .map_err(|e| NetworkError::Bind(format!("{}: {}", config.listen_addr, e)))?;
        Ok(Self { listener, config })
    }

    /// The address actually bound; differs from the configured one for port 0.
    pub fn local_addr(&self) -> NetworkResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` becomes `true`.
    ///
    /// Each connection runs on its own task; in-flight connections are not
    /// awaited on shutdown.
    pub async fn serve(
        self,
        handler: Arc<dyn RequestHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> NetworkResult<()> {
        let local = self.local_addr()?;
        info!(addr = %local, "Exchange server listening");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(%peer, "Accepted exchange connection");
                            let handler = Arc::clone(&handler);
                            let max_frame_size = self.config.max_frame_size;
                            let read_timeout = self.config.request_timeout;
                            tokio::spawn(async move {
                                if let Err(e) = serve_connection(stream, handler, max_frame_size, read_timeout).await {
                                    warn!(%peer, error = %e, "Exchange connection ended with error");
                                }
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept exchange connection");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(addr = %local, "Exchange server shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Answer requests until the peer hangs up or stays silent for `read_timeout`.
async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<dyn RequestHandler>,
    max_frame_size: usize,
    read_timeout: Duration,
) -> NetworkResult<()> {
    stream.set_nodelay(true)?;

    loop {
        let request = match timeout(read_timeout, read_request(&mut stream, max_frame_size)).await {
            Ok(read) => read?,
            Err(_) => {
                debug!(timeout = ?read_timeout, "Exchange peer idle, closing connection");
                return Ok(());
            }
        };
        let Some(request) = request else {
            return Ok(());
        };

        debug!(method = %request.method, option = %request.option, "Handling exchange request");
        let response = handler.handle(request).await;
        write_response(&mut stream, &response, max_frame_size).await?;
    }
}
