//! Exchange transport for sedge nodes.
//!
//! A consumer sends [`ExchangeRequest`](sedge_wire::ExchangeRequest)s to a
//! producer and receives one [`ExchangeResponse`](sedge_wire::ExchangeResponse)
//! per request. On the wire each message is a CBOR frame behind a 4-byte
//! big-endian length prefix.
//!
//! # Example
//!
//! ```no_run
//! use sedge_net::{ExchangeTransport, NetworkConfig, TcpExchangeClient};
//! use sedge_wire::ExchangeRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TcpExchangeClient::new(NetworkConfig::default());
//! let response = client
//!     .request("192.168.1.20:5683".parse()?, ExchangeRequest::post("Data", b"CAFFE".to_vec()))
//!     .await?;
//! println!("{} bytes", response.payload.len());
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod client;
mod config;
mod error;
mod server;
mod traits;

pub use client::TcpExchangeClient;
pub use config::{NetworkConfig, DEFAULT_EXCHANGE_PORT};
pub use error::{NetworkError, NetworkResult};
pub use server::TcpExchangeServer;
pub use traits::{ExchangeTransport, RequestHandler};
