//! Ledger call kinds and confirmation status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The contract functions a node can invoke.
///
/// The discriminant doubles as the JSON-RPC `id`, so a response can be
/// matched back to the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LedgerCallKind {
    /// Commit the hash of a ciphertext.
    WriteDataHash = 1,
    /// Read the committed ciphertext hash.
    ReadDataHash = 2,
    /// Register the consumer's public key.
    WritePublicKey = 3,
    /// Read the registered consumer address and public key.
    ReadPublicKey = 4,
    /// Vote that the delivered data matched its commitment.
    RateProducerPositive = 5,
    /// Vote that the delivered data did not match its commitment.
    RateProducerNegative = 6,
    /// Poll a transaction receipt.
    GetTransactionReceipt = 7,
}

impl LedgerCallKind {
    /// All call kinds in id order.
    pub const ALL: [LedgerCallKind; 7] = [
        Self::WriteDataHash,
        Self::ReadDataHash,
        Self::WritePublicKey,
        Self::ReadPublicKey,
        Self::RateProducerPositive,
        Self::RateProducerNegative,
        Self::GetTransactionReceipt,
    ];

    /// Numeric tag used as the JSON-RPC id.
    pub fn id(self) -> u64 {
        self as u64
    }

    /// Recover a kind from its JSON-RPC id.
    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Whether the call submits a transaction.
    pub fn is_transaction(self) -> bool {
        matches!(
            self,
            Self::WriteDataHash
                | Self::WritePublicKey
                | Self::RateProducerPositive
                | Self::RateProducerNegative
        )
    }

    /// Whether the call reads contract state without a transaction.
    pub fn is_read(self) -> bool {
        matches!(self, Self::ReadDataHash | Self::ReadPublicKey)
    }

    /// The vote kind for a hash comparison outcome.
    pub fn vote(matched: bool) -> Self {
        if matched {
            Self::RateProducerPositive
        } else {
            Self::RateProducerNegative
        }
    }
}

impl fmt::Display for LedgerCallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WriteDataHash => "write_data_hash",
            Self::ReadDataHash => "read_data_hash",
            Self::WritePublicKey => "write_public_key",
            Self::ReadPublicKey => "read_public_key",
            Self::RateProducerPositive => "rate_producer_positive",
            Self::RateProducerNegative => "rate_producer_negative",
            Self::GetTransactionReceipt => "get_transaction_receipt",
        };
        f.write_str(name)
    }
}

/// Outcome of a transaction receipt poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// No receipt yet.
    Pending,
    /// Mined with status `0x1`.
    SucceededOk,
    /// Mined with any other status.
    SucceededFail,
}

impl ConfirmationStatus {
    /// Whether a receipt exists.
    pub fn is_final(self) -> bool {
        !matches!(self, Self::Pending)
    }
}
