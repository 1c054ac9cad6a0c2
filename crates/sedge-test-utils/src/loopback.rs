//! In-process exchange transport.
//!
//! Hands each request straight to a `RequestHandler`, so consumer code can
//! talk to a producer coordinator without sockets.

use async_trait::async_trait;
use sedge_net::{ExchangeTransport, NetworkError, NetworkResult, RequestHandler};
use sedge_wire::{ExchangeRequest, ExchangeResponse};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

struct LoopbackInner {
    /// Every request delivered, in order.
    requests: Vec<ExchangeRequest>,
    /// When true, requests fail as if the peer hung up.
    should_fail: bool,
}

/// Loopback implementation of [`ExchangeTransport`].
#[derive(Clone)]
pub struct LoopbackExchange {
    handler: Arc<dyn RequestHandler>,
    inner: Arc<RwLock<LoopbackInner>>,
}

impl LoopbackExchange {
    /// Deliver requests to `handler`.
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self {
            handler,
            inner: Arc::new(RwLock::new(LoopbackInner {
                requests: Vec::new(),
                should_fail: false,
            })),
        }
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    /// Options of the requests delivered so far.
    pub fn options(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap()
            .requests
            .iter()
            .map(|r| r.option.clone())
            .collect()
    }

    /// Requests delivered so far.
    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.inner.read().unwrap().requests.clone()
    }
}

#[async_trait]
impl ExchangeTransport for LoopbackExchange {
    async fn request(
        &self,
        _peer: SocketAddr,
        request: ExchangeRequest,
    ) -> NetworkResult<ExchangeResponse> {
        {
            let mut inner = self.inner.write().unwrap();
            if inner.should_fail {
                return Err(NetworkError::ConnectionClosed);
            }
            inner.requests.push(request.clone());
        }
        Ok(self.handler.handle(request).await)
    }
}
