//! TCP exchange client.

use async_trait::async_trait;
use sedge_wire::{ExchangeRequest, ExchangeResponse};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::codec::{read_response, write_request};
use crate::config::NetworkConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::traits::ExchangeTransport;

/// Sends each request over a fresh TCP connection.
#[derive(Debug, Clone)]
pub struct TcpExchangeClient {
    config: NetworkConfig,
}

impl TcpExchangeClient {
    /// Create a client using `config` timeouts and frame limits.
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// The client's configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn round_trip(
        &self,
        peer: SocketAddr,
        request: &ExchangeRequest,
    ) -> NetworkResult<ExchangeResponse> {
        let mut stream = timeout(self.config.connect_timeout, TcpStream::connect(peer))
            .await
            .map_err(|_| NetworkError::Timeout(format!("connect to {}", peer)))?
            .map_err(|e| NetworkError::ConnectionFailed(format!("{}: {}", peer, e)))?;
        stream.set_nodelay(true)?;

        write_request(&mut stream, request, self.config.max_frame_size).await?;
        read_response(&mut stream, self.config.max_frame_size).await
    }
}

#[async_trait]
impl ExchangeTransport for TcpExchangeClient {
    async fn request(
        &self,
        peer: SocketAddr,
        request: ExchangeRequest,
    ) -> NetworkResult<ExchangeResponse> {
        debug!(%peer, method = %request.method, option = %request.option, "Sending exchange request");

        let response = timeout(self.config.request_timeout, self.round_trip(peer, &request))
            .await
            .map_err(|_| NetworkError::Timeout(format!("{} request to {}", request.option, peer)))??;

        trace!(%peer, bytes = response.payload.len(), "Received exchange response");
        Ok(response)
    }
}
