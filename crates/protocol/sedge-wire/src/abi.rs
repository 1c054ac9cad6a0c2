//! Contract call data and return value layouts.
//!
//! Call data is `0x` + 4-byte selector + 32-byte words in lowercase hex.
//! Dynamic `bytes` arguments are an offset word (`0x20`), a length word and
//! the data right-padded to a word boundary.
//!
//! ```text
//! writeDataHash(bytes)   0x0ef81269 | 0x20 | len | data...
//! readDataHash()         0x0546bedb | 28 zero bytes
//! writePublicKey(bytes)  0x2ea8dff5 | 0x20 | len | data...
//! readPublicKey()        0xfcc01d51 | 28 zero bytes
//! rateProducer(bool)     0xf18aeab6 | 0 or 1
//! ```
//!
//! Return values are read at fixed hex offsets of the `result` string
//! (offsets include the `0x` prefix).

use sedge_types::LedgerCallKind;

use crate::error::{WireError, WireResult};

/// Hex characters per 32-byte word.
pub const WORD_HEX: usize = 64;

/// Selector of `writeDataHash(bytes)`.
pub const WRITE_DATA_HASH_SELECTOR: &str = "0ef81269";

/// Selector of `readDataHash()`.
pub const READ_DATA_HASH_SELECTOR: &str = "0546bedb";

/// Selector of `writePublicKey(bytes)`.
pub const WRITE_PUBLIC_KEY_SELECTOR: &str = "2ea8dff5";

/// Selector of `readPublicKey()`.
pub const READ_PUBLIC_KEY_SELECTOR: &str = "fcc01d51";

/// Selector of `rateProducer(bool)`.
pub const RATE_PRODUCER_SELECTOR: &str = "f18aeab6";

/// Zero padding that follows a read selector.
const READ_PADDING: &str = "00000000000000000000000000000000000000000000000000000000";

/// Hex offset of the length word of a `bytes` return value.
pub const BYTES_RESULT_LENGTH_OFFSET: usize = 2 + WORD_HEX;

/// Hex offset of the data of a `bytes` return value.
pub const BYTES_RESULT_DATA_OFFSET: usize = 2 + 2 * WORD_HEX;

/// Hex offset of the consumer address in a `readPublicKey` result.
pub const KEY_RESULT_ADDRESS_OFFSET: usize = 2 + WORD_HEX + 24;

/// Hex offset of the key length word in a `readPublicKey` result.
pub const KEY_RESULT_LENGTH_OFFSET: usize = 2 + 2 * WORD_HEX;

/// Hex offset of the key data in a `readPublicKey` result.
pub const KEY_RESULT_DATA_OFFSET: usize = 2 + 3 * WORD_HEX;

/// Call data decoded back into its kind and argument bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    /// The invoked function.
    pub kind: LedgerCallKind,
    /// The `bytes` argument for writes; empty otherwise.
    pub payload: Vec<u8>,
}

/// Encode call data for `kind`.
///
/// Writes require `payload`; reads and votes ignore it. Receipts carry no
/// call data and are rejected here.
pub fn encode_call_data(kind: LedgerCallKind, payload: Option<&[u8]>) -> WireResult<String> {
    let data = match kind {
        LedgerCallKind::WriteDataHash => {
            let payload = payload.ok_or(WireError::MissingPayload(kind))?;
            format!(
                "0x{}{}",
                WRITE_DATA_HASH_SELECTOR,
                encode_dynamic_bytes(payload)
            )
        }
        LedgerCallKind::WritePublicKey => {
            let payload = payload.ok_or(WireError::MissingPayload(kind))?;
            format!(
                "0x{}{}",
                WRITE_PUBLIC_KEY_SELECTOR,
                encode_dynamic_bytes(payload)
            )
        }
        LedgerCallKind::ReadDataHash => format!("0x{}{}", READ_DATA_HASH_SELECTOR, READ_PADDING),
        LedgerCallKind::ReadPublicKey => format!("0x{}{}", READ_PUBLIC_KEY_SELECTOR, READ_PADDING),
        LedgerCallKind::RateProducerPositive => format!("0x{}{}", RATE_PRODUCER_SELECTOR, word(1)),
        LedgerCallKind::RateProducerNegative => format!("0x{}{}", RATE_PRODUCER_SELECTOR, word(0)),
        LedgerCallKind::GetTransactionReceipt => {
            return Err(WireError::malformed("receipts carry no call data"))
        }
    };
    Ok(data)
}

/// Decode call data produced by [`encode_call_data`].
pub fn decode_call_data(data: &str) -> WireResult<DecodedCall> {
    let body = data
        .strip_prefix("0x")
        .ok_or_else(|| WireError::malformed("call data without 0x prefix"))?;
    let selector = hex_slice(body, 0, 8)?;
    let args = &body[8..];

    let (kind, payload) = match selector {
        WRITE_DATA_HASH_SELECTOR => (LedgerCallKind::WriteDataHash, decode_dynamic_bytes(args)?),
        WRITE_PUBLIC_KEY_SELECTOR => (LedgerCallKind::WritePublicKey, decode_dynamic_bytes(args)?),
        READ_DATA_HASH_SELECTOR => (LedgerCallKind::ReadDataHash, Vec::new()),
        READ_PUBLIC_KEY_SELECTOR => (LedgerCallKind::ReadPublicKey, Vec::new()),
        RATE_PRODUCER_SELECTOR => {
            let positive = read_word(args, 0)? != 0;
            (LedgerCallKind::vote(positive), Vec::new())
        }
        other => return Err(WireError::malformed(format!("unknown selector {}", other))),
    };
    Ok(DecodedCall { kind, payload })
}

/// Encode `bytes` as a `bytes` return value (`0x` + offset + length + data).
pub fn encode_bytes_result(bytes: &[u8]) -> String {
    format!("0x{}", encode_dynamic_bytes(bytes))
}

/// Encode an `(address, bytes)` return value as read by `readPublicKey`.
pub fn encode_key_result(address_hex_digits: &str, key: &[u8]) -> String {
    format!(
        "0x{}{:0>64}{}{}",
        word(2 * 32),
        address_hex_digits,
        word(key.len()),
        padded_hex(key)
    )
}

/// Offset word, length word and padded data, without prefix.
pub fn encode_dynamic_bytes(bytes: &[u8]) -> String {
    format!("{}{}{}", word(0x20), word(bytes.len()), padded_hex(bytes))
}

fn decode_dynamic_bytes(args: &str) -> WireResult<Vec<u8>> {
    let len = read_word(args, WORD_HEX)?;
    let hex_len = len
        .checked_mul(2)
        .ok_or_else(|| WireError::malformed(format!("bytes length {} overflows", len)))?;
    let hex = hex_slice(args, 2 * WORD_HEX, hex_len)?;
    decode_hex(hex)
}

/// A 32-byte big-endian word holding `value`.
fn word(value: usize) -> String {
    format!("{:064x}", value)
}

/// Lowercase hex of `bytes`, right-padded with zeros to a word boundary.
fn padded_hex(bytes: &[u8]) -> String {
    let mut out = hex::encode(bytes);
    let rem = out.len() % WORD_HEX;
    if rem != 0 {
        out.extend(std::iter::repeat('0').take(WORD_HEX - rem));
    }
    out
}

/// Bounds-checked substring of `s`.
pub(crate) fn hex_slice(s: &str, start: usize, len: usize) -> WireResult<&str> {
    let end = start
        .checked_add(len)
        .ok_or_else(|| WireError::malformed("offset overflow"))?;
    s.get(start..end).ok_or_else(|| {
        WireError::malformed(format!(
            "need {} hex chars at offset {}, have {}",
            len,
            start,
            s.len()
        ))
    })
}

/// Read the word at `offset` as a length or flag.
pub(crate) fn read_word(s: &str, offset: usize) -> WireResult<usize> {
    let word = hex_slice(s, offset, WORD_HEX)?;
    let (high, low) = word.split_at(WORD_HEX - 16);
    if !high.bytes().all(|b| b == b'0') {
        return Err(WireError::malformed(format!("word too large: {}", word)));
    }
    let value = u64::from_str_radix(low, 16)
        .map_err(|_| WireError::malformed(format!("invalid word: {}", word)))?;
    usize::try_from(value).map_err(|_| WireError::malformed(format!("word too large: {}", word)))
}

/// Decode hex digits of either case into bytes.
pub(crate) fn decode_hex(s: &str) -> WireResult<Vec<u8>> {
    hex::decode(s).map_err(|e| WireError::malformed(format!("invalid hex: {}", e)))
}
