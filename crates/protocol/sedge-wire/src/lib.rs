//! Wire formats for sedge nodes.
//!
//! Two formats live here:
//!
//! - **Ledger calls**: JSON-RPC 2.0 envelopes whose `data` field is contract
//!   call data (selector plus 32-byte hex words). [`LedgerCodec`] builds them
//!   and parses responses into [`LedgerCallResult`].
//! - **Exchange messages**: producer/consumer requests and the literal-tagged
//!   replies the producer sends back, CBOR-encoded for the transport.
//!
//! Neither performs I/O.

pub mod abi;
mod encoding;
mod error;
pub mod exchange;
mod rpc;

pub use encoding::{decode_frame, encode_frame, MAX_FRAME_SIZE};
pub use error::{WireError, WireResult};
pub use exchange::{
    ExchangeOption, ExchangeRequest, ExchangeResponse, ProducerReply, RequestMethod,
};
pub use rpc::{
    rpc_method, ConsumerKey, LedgerCallResult, LedgerCodec, LedgerResponse, DEFAULT_GAS,
    DEFAULT_KEY_DEPOSIT, JSONRPC_VERSION,
};
