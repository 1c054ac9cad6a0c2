//! Transport traits.
//!
//! The consumer talks to a producer through [`ExchangeTransport`]; the
//! producer answers through a [`RequestHandler`]. Both are object safe so
//! operations code can hold them as `Arc<dyn _>` and tests can swap in an
//! in-process loopback.

use async_trait::async_trait;
use sedge_wire::{ExchangeRequest, ExchangeResponse};
use std::net::SocketAddr;

use crate::error::NetworkResult;

/// Client side of the exchange: one request, one response.
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    /// Send `request` to the producer at `peer` and wait for its response.
    async fn request(
        &self,
        peer: SocketAddr,
        request: ExchangeRequest,
    ) -> NetworkResult<ExchangeResponse>;
}

/// Server side of the exchange.
///
/// Handlers never fail at the transport level: every request gets a
/// response, with errors reported as reply literals.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Produce the response for one inbound request.
    async fn handle(&self, request: ExchangeRequest) -> ExchangeResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the traits can be made into trait objects
    fn _assert_transport_object_safe(_: &dyn ExchangeTransport) {}
    fn _assert_handler_object_safe(_: &dyn RequestHandler) {}
}
