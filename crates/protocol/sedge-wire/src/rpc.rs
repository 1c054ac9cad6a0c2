//! JSON-RPC envelopes for ledger calls.
//!
//! Requests:
//!
//! ```text
//! {"jsonrpc":"2.0","method":"eth_sendTransaction","params":[{from,to,gas,value?,data}],"id":1}
//! {"jsonrpc":"2.0","method":"eth_call","params":[{from,to,gas,data},"latest"],"id":2}
//! {"jsonrpc":"2.0","method":"eth_getTransactionReceipt","params":["0x..."],"id":7}
//! ```
//!
//! Responses carry `result` (or `error`) and echo the `id`, which is how a
//! response is matched back to its [`LedgerCallKind`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sedge_types::{
    AccountAddress, ConfirmationStatus, LedgerCallKind, TxHash, HASH_SIZE,
    LEDGER_REQUEST_CAPACITY, MAX_PUBLIC_KEY_PEM_LEN, TX_HASH_LEN,
};

use crate::abi::{
    decode_hex, encode_call_data, hex_slice, read_word, BYTES_RESULT_DATA_OFFSET,
    BYTES_RESULT_LENGTH_OFFSET, KEY_RESULT_ADDRESS_OFFSET, KEY_RESULT_DATA_OFFSET,
    KEY_RESULT_LENGTH_OFFSET,
};
use crate::error::{WireError, WireResult};

/// JSON-RPC protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Default gas limit attached to every call.
pub const DEFAULT_GAS: &str = "0x47E7C0";

/// Default deposit attached to public key registration (2 ether in wei).
pub const DEFAULT_KEY_DEPOSIT: &str = "0x1BC16D674EC80000";

/// Block tag appended to `eth_call` parameters.
const LATEST_BLOCK: &str = "latest";

/// JSON-RPC method used for `kind`.
pub fn rpc_method(kind: LedgerCallKind) -> &'static str {
    match kind {
        LedgerCallKind::ReadDataHash | LedgerCallKind::ReadPublicKey => "eth_call",
        LedgerCallKind::GetTransactionReceipt => "eth_getTransactionReceipt",
        _ => "eth_sendTransaction",
    }
}

/// Account and key returned by `readPublicKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerKey {
    /// Consumer address, lowercased.
    pub address: AccountAddress,
    /// PEM public key with trailing NUL padding removed.
    pub public_key_pem: String,
}

/// Typed result of a ledger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCallResult {
    /// Bytes read from the contract (`readDataHash`).
    Data(Vec<u8>),
    /// Consumer registration read from the contract (`readPublicKey`).
    ConsumerKey(ConsumerKey),
    /// Hash of a submitted transaction.
    TransactionHash(TxHash),
    /// Receipt status.
    Confirmation(ConfirmationStatus),
}

/// A decoded response and the call kind its id names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerResponse {
    /// Kind recovered from the response id.
    pub kind: LedgerCallKind,
    /// Parsed result.
    pub result: LedgerCallResult,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Serialize)]
struct CallParams<'a> {
    from: &'a str,
    to: &'a str,
    gas: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    data: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Builds ledger requests and parses ledger responses. No I/O.
#[derive(Debug, Clone)]
pub struct LedgerCodec {
    gas: String,
    key_deposit: String,
    capacity: usize,
}

impl Default for LedgerCodec {
    fn default() -> Self {
        Self {
            gas: DEFAULT_GAS.to_string(),
            key_deposit: DEFAULT_KEY_DEPOSIT.to_string(),
            capacity: LEDGER_REQUEST_CAPACITY,
        }
    }
}

impl LedgerCodec {
    /// Create a codec with explicit gas limit and key deposit.
    pub fn new(gas: impl Into<String>, key_deposit: impl Into<String>) -> Self {
        Self {
            gas: gas.into(),
            key_deposit: key_deposit.into(),
            ..Self::default()
        }
    }

    /// Set the request buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Request buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Encode a ledger call as a JSON-RPC request body.
    ///
    /// For receipts `payload` is the transaction hash text and the
    /// addresses are ignored. Fails with [`WireError::EncodingOverflow`]
    /// when the body would exceed the request capacity.
    pub fn encode_call(
        &self,
        kind: LedgerCallKind,
        sender: &str,
        receiver: &str,
        payload: Option<&[u8]>,
    ) -> WireResult<Vec<u8>> {
        let params = match kind {
            LedgerCallKind::GetTransactionReceipt => {
                let tx = payload.ok_or(WireError::MissingPayload(kind))?;
                let tx = std::str::from_utf8(tx)
                    .map_err(|_| WireError::Encode("transaction hash is not text".into()))?;
                vec![Value::String(tx.to_string())]
            }
            _ => {
                let call = CallParams {
                    from: sender,
                    to: receiver,
                    gas: &self.gas,
                    value: (kind == LedgerCallKind::WritePublicKey)
                        .then_some(self.key_deposit.as_str()),
                    data: encode_call_data(kind, payload)?,
                };
                let call =
                    serde_json::to_value(call).map_err(|e| WireError::Encode(e.to_string()))?;
                if kind.is_read() {
                    vec![call, Value::String(LATEST_BLOCK.to_string())]
                } else {
                    vec![call]
                }
            }
        };

        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: rpc_method(kind),
            params,
            id: kind.id(),
        };
        let body = serde_json::to_vec(&request).map_err(|e| WireError::Encode(e.to_string()))?;
        if body.len() > self.capacity {
            return Err(WireError::EncodingOverflow {
                size: body.len(),
                max: self.capacity,
            });
        }
        Ok(body)
    }

    /// Decode a JSON-RPC response body.
    pub fn decode_response(&self, bytes: &[u8]) -> WireResult<LedgerResponse> {
        let response: RpcResponse = serde_json::from_slice(bytes)
            .map_err(|e| WireError::malformed(format!("invalid envelope: {}", e)))?;

        let id = response
            .id
            .ok_or_else(|| WireError::malformed("missing id"))?;
        let kind = LedgerCallKind::from_id(id)
            .ok_or_else(|| WireError::malformed(format!("unknown id {}", id)))?;

        if let Some(error) = response.error {
            return Err(WireError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = match kind {
            LedgerCallKind::ReadDataHash => {
                LedgerCallResult::Data(decode_data_hash(result_str(&response.result)?)?)
            }
            LedgerCallKind::ReadPublicKey => {
                LedgerCallResult::ConsumerKey(decode_consumer_key(result_str(&response.result)?)?)
            }
            LedgerCallKind::GetTransactionReceipt => {
                LedgerCallResult::Confirmation(decode_receipt(&response.result)?)
            }
            _ => LedgerCallResult::TransactionHash(decode_tx_hash(result_str(
                &response.result,
            )?)?),
        };
        Ok(LedgerResponse { kind, result })
    }
}

fn result_str(result: &Value) -> WireResult<&str> {
    result
        .as_str()
        .ok_or_else(|| WireError::malformed("result is not a string"))
}

/// A bare 32-byte word, or a `bytes` value whose length fits a digest.
fn decode_data_hash(result: &str) -> WireResult<Vec<u8>> {
    if result.len() == 2 + 2 * HASH_SIZE {
        return decode_hex(hex_slice(result, 2, 2 * HASH_SIZE)?);
    }
    let len = read_word(result, BYTES_RESULT_LENGTH_OFFSET)?;
    if len > HASH_SIZE {
        return Err(WireError::malformed(format!(
            "data hash is {} bytes, destination holds {}",
            len, HASH_SIZE
        )));
    }
    decode_hex(hex_slice(result, BYTES_RESULT_DATA_OFFSET, 2 * len)?)
}

fn decode_consumer_key(result: &str) -> WireResult<ConsumerKey> {
    let address = hex_slice(result, KEY_RESULT_ADDRESS_OFFSET, 40)?;
    let address = AccountAddress::from_hex_digits(address)
        .map_err(|e| WireError::malformed(e.to_string()))?;

    let len = read_word(result, KEY_RESULT_LENGTH_OFFSET)?;
    if len > MAX_PUBLIC_KEY_PEM_LEN {
        return Err(WireError::malformed(format!(
            "public key is {} bytes, destination holds {}",
            len, MAX_PUBLIC_KEY_PEM_LEN
        )));
    }
    let mut key = decode_hex(hex_slice(result, KEY_RESULT_DATA_OFFSET, 2 * len)?)?;
    while key.last() == Some(&0) {
        key.pop();
    }
    let public_key_pem = String::from_utf8(key)
        .map_err(|_| WireError::malformed("public key is not text"))?;

    Ok(ConsumerKey {
        address,
        public_key_pem,
    })
}

fn decode_tx_hash(result: &str) -> WireResult<TxHash> {
    if result.len() != TX_HASH_LEN {
        return Err(WireError::malformed(format!(
            "transaction hash is {} chars, expected {}",
            result.len(),
            TX_HASH_LEN
        )));
    }
    TxHash::parse(result).map_err(|e| WireError::malformed(e.to_string()))
}

/// A string or null result means the receipt is not available yet.
fn decode_receipt(result: &Value) -> WireResult<ConfirmationStatus> {
    match result {
        Value::Null | Value::String(_) => Ok(ConfirmationStatus::Pending),
        Value::Object(receipt) => match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => Ok(ConfirmationStatus::SucceededOk),
            Some(_) => Ok(ConfirmationStatus::SucceededFail),
            None => Err(WireError::malformed("receipt without status")),
        },
        other => Err(WireError::malformed(format!(
            "unexpected receipt result: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode_bytes_result, encode_key_result};
    use serde_json::json;

    const FROM: &str = "0x1111111111111111111111111111111111111111";
    const TO: &str = "0x2222222222222222222222222222222222222222";

    fn envelope(id: u64, result: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({"jsonrpc": "2.0", "id": id, "result": result})).unwrap()
    }

    fn parse(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_encode_write_data_hash() {
        let codec = LedgerCodec::default();
        let body = codec
            .encode_call(LedgerCallKind::WriteDataHash, FROM, TO, Some(&[0x11; 32]))
            .unwrap();
        let value = parse(&body);
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "eth_sendTransaction");
        assert_eq!(value["id"], 1);
        assert_eq!(value["params"][0]["from"], FROM);
        assert_eq!(value["params"][0]["to"], TO);
        assert_eq!(value["params"][0]["gas"], DEFAULT_GAS);
        assert!(value["params"][0].get("value").is_none());
        assert!(value["params"][0]["data"]
            .as_str()
            .unwrap()
            .starts_with("0x0ef81269"));
        assert_eq!(value["params"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_encode_write_public_key_carries_deposit() {
        let codec = LedgerCodec::default();
        let body = codec
            .encode_call(LedgerCallKind::WritePublicKey, FROM, TO, Some(b"-----BEGIN"))
            .unwrap();
        let value = parse(&body);
        assert_eq!(value["id"], 3);
        assert_eq!(value["params"][0]["value"], DEFAULT_KEY_DEPOSIT);
    }

    #[test]
    fn test_encode_read_appends_latest() {
        let codec = LedgerCodec::default();
        let body = codec
            .encode_call(LedgerCallKind::ReadPublicKey, FROM, TO, None)
            .unwrap();
        let value = parse(&body);
        assert_eq!(value["method"], "eth_call");
        assert_eq!(value["id"], 4);
        assert_eq!(value["params"][1], "latest");
    }

    #[test]
    fn test_encode_vote_and_receipt_methods() {
        let codec = LedgerCodec::default();
        let vote = parse(
            &codec
                .encode_call(LedgerCallKind::RateProducerNegative, FROM, TO, None)
                .unwrap(),
        );
        assert_eq!(vote["method"], "eth_sendTransaction");
        assert_eq!(vote["id"], 6);

        let tx = format!("0x{}", "ab".repeat(32));
        let receipt = parse(
            &codec
                .encode_call(
                    LedgerCallKind::GetTransactionReceipt,
                    "na",
                    "na",
                    Some(tx.as_bytes()),
                )
                .unwrap(),
        );
        assert_eq!(receipt["method"], "eth_getTransactionReceipt");
        assert_eq!(receipt["params"], json!([tx]));
        assert_eq!(receipt["id"], 7);
    }

    #[test]
    fn test_encode_overflow() {
        let codec = LedgerCodec::default().with_capacity(256);
        let err = codec
            .encode_call(LedgerCallKind::WritePublicKey, FROM, TO, Some(&[b'a'; 272]))
            .unwrap_err();
        assert!(matches!(err, WireError::EncodingOverflow { max: 256, .. }));

        let huge = vec![0u8; LEDGER_REQUEST_CAPACITY];
        assert!(matches!(
            LedgerCodec::default().encode_call(LedgerCallKind::WriteDataHash, FROM, TO, Some(&huge)),
            Err(WireError::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn test_decode_bare_data_hash() {
        let bytes = [0x5Au8; 32];
        let body = envelope(2, json!(format!("0x{}", hex::encode(bytes))));
        let response = LedgerCodec::default().decode_response(&body).unwrap();
        assert_eq!(response.kind, LedgerCallKind::ReadDataHash);
        assert_eq!(response.result, LedgerCallResult::Data(bytes.to_vec()));
    }

    #[test]
    fn test_decode_abi_data_hash_mixed_case() {
        let bytes = [0xC3u8; 32];
        let result = encode_bytes_result(&bytes).to_uppercase().replacen("0X", "0x", 1);
        let body = envelope(2, json!(result));
        let response = LedgerCodec::default().decode_response(&body).unwrap();
        assert_eq!(response.result, LedgerCallResult::Data(bytes.to_vec()));
    }

    #[test]
    fn test_decode_data_hash_oversized() {
        let body = envelope(2, json!(encode_bytes_result(&[1u8; 40])));
        assert!(matches!(
            LedgerCodec::default().decode_response(&body),
            Err(WireError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_data_hash_truncated() {
        let body = envelope(2, json!("0x0000"));
        assert!(matches!(
            LedgerCodec::default().decode_response(&body),
            Err(WireError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_consumer_key() {
        let pem = b"-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----\n";
        let mut padded = pem.to_vec();
        padded.extend_from_slice(&[0, 0, 0]);
        let result = encode_key_result(&"AB".repeat(20), &padded);
        let body = envelope(4, json!(result));

        let response = LedgerCodec::default().decode_response(&body).unwrap();
        match response.result {
            LedgerCallResult::ConsumerKey(key) => {
                assert_eq!(key.address.as_str(), format!("0x{}", "ab".repeat(20)));
                assert_eq!(key.public_key_pem.as_bytes(), pem);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_consumer_key_oversized() {
        let result = encode_key_result(&"ab".repeat(20), &[b'A'; 275]);
        let body = envelope(4, json!(result));
        assert!(matches!(
            LedgerCodec::default().decode_response(&body),
            Err(WireError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_transaction_hash() {
        let tx = format!("0x{}", "12".repeat(32));
        let body = envelope(5, json!(tx));
        let response = LedgerCodec::default().decode_response(&body).unwrap();
        assert_eq!(response.kind, LedgerCallKind::RateProducerPositive);
        assert_eq!(
            response.result,
            LedgerCallResult::TransactionHash(TxHash::parse(&tx).unwrap())
        );

        let body = envelope(1, json!("0x12"));
        assert!(LedgerCodec::default().decode_response(&body).is_err());
    }

    #[test]
    fn test_decode_receipts() {
        let codec = LedgerCodec::default();
        let status = |result: Value| match codec.decode_response(&envelope(7, result)) {
            Ok(LedgerResponse {
                result: LedgerCallResult::Confirmation(status),
                ..
            }) => status,
            other => panic!("unexpected: {:?}", other),
        };

        assert_eq!(status(json!("pending")), ConfirmationStatus::Pending);
        assert_eq!(status(Value::Null), ConfirmationStatus::Pending);
        assert_eq!(
            status(json!({"status": "0x1", "blockNumber": "0x10"})),
            ConfirmationStatus::SucceededOk
        );
        assert_eq!(
            status(json!({"status": "0x0"})),
            ConfirmationStatus::SucceededFail
        );

        let body = envelope(7, json!({"blockNumber": "0x10"}));
        assert!(matches!(
            codec.decode_response(&body),
            Err(WireError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_envelope_errors() {
        let codec = LedgerCodec::default();
        assert!(matches!(
            codec.decode_response(b"not json"),
            Err(WireError::MalformedResponse(_))
        ));
        assert!(matches!(
            codec.decode_response(br#"{"result":"0x"}"#),
            Err(WireError::MalformedResponse(_))
        ));
        assert!(matches!(
            codec.decode_response(&envelope(42, json!("0x"))),
            Err(WireError::MalformedResponse(_))
        ));

        let body = br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"out of gas"}}"#;
        assert_eq!(
            codec.decode_response(body),
            Err(WireError::Rpc {
                code: -32000,
                message: "out of gas".to_string()
            })
        );
    }
}
