//! Ledger account addresses and transaction hashes.
//!
//! Both are stored lowercased. The ledger itself is case-insensitive, but
//! lookups in the producer's consumer table compare strings exactly, so
//! normalization happens once at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ACCOUNT_ADDRESS_LEN, TX_HASH_LEN};
use crate::error::{TypesError, TypesResult};

/// Check `0x` prefix, total length and hex body; return the lowercased form.
fn normalize_prefixed_hex(value: &str, expected_len: usize) -> Option<String> {
    let value = value.trim();
    if value.len() != expected_len {
        return None;
    }
    let body = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", body.to_ascii_lowercase()))
}

/// A 20-byte ledger account address in `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Parse and lowercase an address.
    pub fn parse(value: &str) -> TypesResult<Self> {
        normalize_prefixed_hex(value, ACCOUNT_ADDRESS_LEN)
            .map(Self)
            .ok_or_else(|| TypesError::invalid_address(value))
    }

    /// Build an address from its 40 hex digits (no prefix).
    pub fn from_hex_digits(digits: &str) -> TypesResult<Self> {
        Self::parse(&format!("0x{}", digits))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.0
    }
}

/// A 32-byte transaction hash in `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    /// Parse and lowercase a transaction hash.
    pub fn parse(value: &str) -> TypesResult<Self> {
        normalize_prefixed_hex(value, TX_HASH_LEN)
            .map(Self)
            .ok_or_else(|| TypesError::invalid_tx_hash(value))
    }

    /// The hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TxHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TxHash {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "0xAbCdEf0123456789aBcDeF0123456789ABCDEF01";

    #[test]
    fn test_address_is_lowercased() {
        let addr = AccountAddress::parse(MIXED).unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(addr.hex_digits().len(), 40);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(AccountAddress::parse("0x1234").is_err());
        assert!(AccountAddress::parse("abcdef0123456789abcdef0123456789abcdef0123").is_err());
        assert!(AccountAddress::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_address_trims_whitespace() {
        let addr = AccountAddress::parse("  0xabcdef0123456789abcdef0123456789abcdef01\n").unwrap();
        assert_eq!(addr.as_str().len(), ACCOUNT_ADDRESS_LEN);
    }

    #[test]
    fn test_address_serde() {
        let addr = AccountAddress::parse(MIXED).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xabcdef0123456789abcdef0123456789abcdef01\"");

        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let bad: Result<AccountAddress, _> = serde_json::from_str("\"0x12\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_tx_hash() {
        let raw = format!("0x{}", "AB".repeat(32));
        let hash = TxHash::parse(&raw).unwrap();
        assert_eq!(hash.as_str(), format!("0x{}", "ab".repeat(32)));
        assert!(TxHash::parse("0xabc").is_err());
    }
}
