//! Producer/consumer exchange messages.
//!
//! A request names an option path and carries an opaque payload; a response
//! is a payload whose leading literal tag tells the consumer what it got:
//!
//! ```text
//! ContractAddress     -> "ContractAddress_0x..." | "ConsumerAlreadyAuthenticated_0x..."
//! PublicKeyAvailable  -> "Prepare payload data"
//! Data                -> "Data_" + ciphertext | status literal
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use sedge_types::AccountAddress;

use crate::error::{WireError, WireResult};

/// Option paths understood by the producer.
pub mod options {
    /// Consumer announces its address and asks for the contract address.
    pub const CONTRACT_ADDRESS: &str = "ContractAddress";
    /// Consumer's public key is confirmed on the ledger.
    pub const PUBLIC_KEY_AVAILABLE: &str = "PublicKeyAvailable";
    /// Consumer asks for the prepared ciphertext.
    pub const DATA: &str = "Data";
}

/// Literal tags and status strings sent by the producer.
pub mod replies {
    /// Prefix of the contract address reply for a new consumer.
    pub const CONTRACT_ADDRESS_PREFIX: &str = "ContractAddress_";
    /// Prefix of the contract address reply for a known consumer.
    pub const ALREADY_AUTHENTICATED_PREFIX: &str = "ConsumerAlreadyAuthenticated_";
    /// Prefix of the ciphertext reply.
    pub const DATA_PREFIX: &str = "Data_";
    /// Acknowledges a key-ready request.
    pub const PREPARE_PAYLOAD: &str = "Prepare payload data";
    /// A run was requested but has not started working yet.
    pub const PROCESSING_STARTED: &str = "Data processing started";
    /// A run is working.
    pub const PROCESSING_IN_PROGRESS: &str = "Data processing in progress";
    /// The last run failed or none was requested.
    pub const PROCESSING_FAILED: &str = "Data processing failed, start new request";
    /// Unknown option path.
    pub const OPTION_NOT_SUPPORTED: &str = "Option not supported";
    /// Request method other than POST.
    pub const ONLY_POST_SUPPORTED: &str = "Error: Wrong request code, only POST supported";
}

/// Request method of an exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// Read.
    Get,
    /// Submit; the only method the producer accepts.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// An inbound or outbound exchange request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// Request method.
    pub method: RequestMethod,
    /// Option path.
    pub option: String,
    /// Opaque payload.
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

impl ExchangeRequest {
    /// Build a POST request.
    pub fn post(option: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            method: RequestMethod::Post,
            option: option.into(),
            payload: payload.into(),
        }
    }
}

/// An exchange response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    /// Opaque payload.
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

impl ExchangeResponse {
    /// A response carrying `payload`.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// A response carrying a literal string.
    pub fn text(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

/// Option paths the producer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeOption {
    /// Address announcement.
    ContractAddress,
    /// Key-ready trigger.
    PublicKeyAvailable,
    /// Ciphertext fetch.
    Data,
}

impl ExchangeOption {
    /// Match an option path exactly.
    pub fn parse(option: &str) -> Option<Self> {
        match option {
            options::CONTRACT_ADDRESS => Some(Self::ContractAddress),
            options::PUBLIC_KEY_AVAILABLE => Some(Self::PublicKeyAvailable),
            options::DATA => Some(Self::Data),
            _ => None,
        }
    }

    /// The option path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContractAddress => options::CONTRACT_ADDRESS,
            Self::PublicKeyAvailable => options::PUBLIC_KEY_AVAILABLE,
            Self::Data => options::DATA,
        }
    }
}

/// A producer response as understood by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerReply {
    /// Contract address for a consumer that must register its key.
    ContractAddress(AccountAddress),
    /// Contract address for a consumer whose key the producer already holds.
    AlreadyAuthenticated(AccountAddress),
    /// Prepared ciphertext.
    Data(Vec<u8>),
    /// Any other literal.
    Status(String),
}

impl ProducerReply {
    /// Parse a response payload.
    pub fn parse(payload: &[u8]) -> WireResult<Self> {
        if let Some(ciphertext) = payload.strip_prefix(replies::DATA_PREFIX.as_bytes()) {
            return Ok(Self::Data(ciphertext.to_vec()));
        }

        let text = std::str::from_utf8(payload)
            .map_err(|_| WireError::malformed("reply is neither data nor text"))?;
        if let Some(address) = text.strip_prefix(replies::ALREADY_AUTHENTICATED_PREFIX) {
            return Ok(Self::AlreadyAuthenticated(parse_address(address)?));
        }
        if let Some(address) = text.strip_prefix(replies::CONTRACT_ADDRESS_PREFIX) {
            return Ok(Self::ContractAddress(parse_address(address)?));
        }
        Ok(Self::Status(text.to_string()))
    }

    /// Encode as a response payload.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::ContractAddress(address) => {
                format!("{}{}", replies::CONTRACT_ADDRESS_PREFIX, address).into_bytes()
            }
            Self::AlreadyAuthenticated(address) => {
                format!("{}{}", replies::ALREADY_AUTHENTICATED_PREFIX, address).into_bytes()
            }
            Self::Data(ciphertext) => {
                let mut out = replies::DATA_PREFIX.as_bytes().to_vec();
                out.extend_from_slice(ciphertext);
                out
            }
            Self::Status(text) => text.as_bytes().to_vec(),
        }
    }
}

impl From<ProducerReply> for ExchangeResponse {
    fn from(reply: ProducerReply) -> Self {
        Self::new(reply.encode())
    }
}

fn parse_address(text: &str) -> WireResult<AccountAddress> {
    AccountAddress::parse(text).map_err(|e| WireError::malformed(e.to_string()))
}
