//! Network configuration.
//!
//! This module defines configuration options for the exchange transport.

use sedge_types::duration_millis;
use sedge_wire::MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Default exchange port.
pub const DEFAULT_EXCHANGE_PORT: u16 = 5683;

/// Configuration for the exchange transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the producer listens on.
    ///
    /// Default: `0.0.0.0:5683`.
    pub listen_addr: SocketAddr,

    /// Timeout for a single request-response round trip.
    ///
    /// Must exceed the producer's serve drain timeout, since a `Data`
    /// request may be held that long. Default: 30 seconds.
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,

    /// Timeout for establishing a connection.
    ///
    /// Default: 5 seconds.
    #[serde(with = "duration_millis")]
    pub connect_timeout: Duration,

    /// Maximum accepted frame size in bytes.
    ///
    /// Default: 4096.
    pub max_frame_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_EXCHANGE_PORT)),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl NetworkConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen address.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum frame size.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Configuration for tests: ephemeral localhost port, short timeouts.
    pub fn local() -> Self {
        Self::default()
            .with_listen_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.listen_addr.port(), DEFAULT_EXCHANGE_PORT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_frame_size, 4096);
    }

    #[test]
    fn test_builder() {
        let config = NetworkConfig::new()
            .with_request_timeout(Duration::from_secs(1))
            .with_max_frame_size(512);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
        assert_eq!(config.max_frame_size, 512);
    }

    #[test]
    fn test_local_config() {
        let config = NetworkConfig::local();
        assert!(config.listen_addr.ip().is_loopback());
        assert_eq!(config.listen_addr.port(), 0);
    }
}
