//! State enums for the producer pipeline and the consumer exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Producer preparation state.
///
/// A run walks `Start` through `PushPayload` in declaration order and ends in
/// `Success` or `Failed`. Both terminal states idle until an external trigger
/// sets `Start` again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerState {
    /// Run requested.
    Start,
    /// Working buffers cleared.
    Init,
    /// Fetch the consumer key from the ledger unless already known.
    ReadConsumerKey,
    /// Sample the averaged sensor value.
    ReadSensor,
    /// Encrypt the sample for the active consumer.
    Encrypt,
    /// Hash the ciphertext.
    CalcHash,
    /// Commit the hash and wait for confirmation.
    CommitHash,
    /// Hand the ciphertext to the exchange channel.
    PushPayload,
    /// Ciphertext is ready to be served.
    Success,
    /// Last run failed, or no run was requested yet.
    #[default]
    Failed,
}

impl ProducerState {
    /// The state that follows a successful step, or `None` for terminal states.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Init),
            Self::Init => Some(Self::ReadConsumerKey),
            Self::ReadConsumerKey => Some(Self::ReadSensor),
            Self::ReadSensor => Some(Self::Encrypt),
            Self::Encrypt => Some(Self::CalcHash),
            Self::CalcHash => Some(Self::CommitHash),
            Self::CommitHash => Some(Self::PushPayload),
            Self::PushPayload => Some(Self::Success),
            Self::Success | Self::Failed => None,
        }
    }

    /// Whether the pipeline idles in this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for ProducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The consumer's position in the request sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ExchangeStep {
    /// Send own address, learn the contract address.
    #[default]
    RequestAddress = 0,
    /// Announce that the public key is on the ledger.
    AnnounceKey = 1,
    /// Fetch the ciphertext.
    RequestData = 2,
}

impl ExchangeStep {
    /// Step that follows this one.
    pub fn next(self) -> Self {
        match self {
            Self::RequestAddress => Self::AnnounceKey,
            Self::AnnounceKey => Self::RequestData,
            Self::RequestData => Self::RequestAddress,
        }
    }

    /// Decode from the stored discriminant.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::RequestAddress),
            1 => Some(Self::AnnounceKey),
            2 => Some(Self::RequestData),
            _ => None,
        }
    }
}

/// Level of the consumer's output indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorLevel {
    /// Reading below threshold.
    Low,
    /// Reading at or above threshold.
    High,
}

impl IndicatorLevel {
    /// Classify a reading against a threshold.
    pub fn for_reading(reading: u8, threshold: u8) -> Self {
        if reading >= threshold {
            Self::High
        } else {
            Self::Low
        }
    }
}
