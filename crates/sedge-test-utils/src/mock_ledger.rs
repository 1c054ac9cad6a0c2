//! Mock implementation of the `LedgerTransport` trait for testing.
//!
//! Plays the part of the ledger node and the exchange contract: decodes the
//! JSON-RPC bodies a `LedgerClient` posts, keeps the contract's storage in
//! memory, and answers with envelopes shaped like a real node's.

use async_trait::async_trait;
use sedge_ledger::{LedgerError, LedgerResult, LedgerTransport, ResponseHandle};
use sedge_types::{AccountAddress, LedgerCallKind};
use sedge_wire::abi::{decode_call_data, encode_bytes_result, encode_key_result};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

struct MockLedgerInner {
    /// Last committed data hash.
    data_hash: Option<Vec<u8>>,
    /// Last registered consumer key: (address, PEM).
    consumer_key: Option<(AccountAddress, String)>,
    /// Votes cast: (voter, positive).
    votes: Vec<(AccountAddress, bool)>,
    /// Every call received, in order.
    calls: Vec<LedgerCallKind>,
    /// Receipt polls per transaction hash.
    receipt_polls: HashMap<String, u32>,
    /// Receipts report pending this many times before the final status.
    pending_polls: u32,
    /// When true, receipts report a reverted transaction.
    revert: bool,
    /// Kinds answered with a JSON-RPC error.
    failing: HashSet<LedgerCallKind>,
    /// Kinds never answered.
    silent: HashSet<LedgerCallKind>,
    /// Handles of unanswered calls, kept so their waiters time out.
    held: Vec<ResponseHandle>,
    /// Responses name a different call kind.
    mismatch_ids: bool,
    /// Delay before each response.
    response_delay: Option<Duration>,
    /// When true, `post` itself fails.
    should_fail: bool,
    /// Auto-incrementing transaction counter.
    tx_counter: u64,
}

/// A mock ledger node hosting the exchange contract.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
#[derive(Clone)]
pub struct MockLedger {
    inner: Arc<RwLock<MockLedgerInner>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Create an empty ledger that confirms transactions on the first poll.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockLedgerInner {
                data_hash: None,
                consumer_key: None,
                votes: Vec::new(),
                calls: Vec::new(),
                receipt_polls: HashMap::new(),
                pending_polls: 0,
                revert: false,
                failing: HashSet::new(),
                silent: HashSet::new(),
                held: Vec::new(),
                mismatch_ids: false,
                response_delay: None,
                should_fail: false,
                tx_counter: 0,
            })),
        }
    }

    /// Pre-register a consumer key.
    pub fn with_consumer_key(self, address: AccountAddress, pem: impl Into<String>) -> Self {
        self.inner.write().unwrap().consumer_key = Some((address, pem.into()));
        self
    }

    /// Pre-commit a data hash.
    pub fn with_data_hash(self, hash: impl Into<Vec<u8>>) -> Self {
        self.inner.write().unwrap().data_hash = Some(hash.into());
        self
    }

    /// Report `polls` pending receipts per transaction before the final one.
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.inner.write().unwrap().pending_polls = polls;
        self
    }

    /// Report every transaction as reverted.
    pub fn with_reverts(self) -> Self {
        self.inner.write().unwrap().revert = true;
        self
    }

    /// Delay every response.
    pub fn with_response_delay(self, delay: Duration) -> Self {
        self.inner.write().unwrap().response_delay = Some(delay);
        self
    }

    /// Answer responses with an id naming another call.
    pub fn with_mismatched_ids(self) -> Self {
        self.inner.write().unwrap().mismatch_ids = true;
        self
    }

    /// Configure the mock so every `post` fails.
    pub fn with_failure(self) -> Self {
        self.inner.write().unwrap().should_fail = true;
        self
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    /// Answer `kind` with a JSON-RPC error.
    pub fn fail_call(&self, kind: LedgerCallKind) {
        self.inner.write().unwrap().failing.insert(kind);
    }

    /// Never answer `kind`.
    pub fn silence_call(&self, kind: LedgerCallKind) {
        self.inner.write().unwrap().silent.insert(kind);
    }

    /// Undo `fail_call` and `silence_call`.
    pub fn restore_calls(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.failing.clear();
        inner.silent.clear();
    }

    /// Overwrite the committed data hash.
    pub fn set_data_hash(&self, hash: impl Into<Vec<u8>>) {
        self.inner.write().unwrap().data_hash = Some(hash.into());
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Committed data hash.
    pub fn data_hash(&self) -> Option<Vec<u8>> {
        self.inner.read().unwrap().data_hash.clone()
    }

    /// Registered consumer key.
    pub fn consumer_key(&self) -> Option<(AccountAddress, String)> {
        self.inner.read().unwrap().consumer_key.clone()
    }

    /// Votes cast so far.
    pub fn votes(&self) -> Vec<(AccountAddress, bool)> {
        self.inner.read().unwrap().votes.clone()
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<LedgerCallKind> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Number of calls of `kind`.
    pub fn call_count(&self, kind: LedgerCallKind) -> usize {
        self.inner
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|k| **k == kind)
            .count()
    }

    /// Total receipt polls across all transactions.
    pub fn receipt_polls(&self) -> u32 {
        self.inner.read().unwrap().receipt_polls.values().sum()
    }

    /// Number of transactions issued.
    pub fn transaction_count(&self) -> u64 {
        self.inner.read().unwrap().tx_counter
    }

    // =========================================================================
    // Contract simulation
    // =========================================================================

    fn next_tx(inner: &mut MockLedgerInner) -> String {
        inner.tx_counter += 1;
        format!("0x{:064x}", inner.tx_counter)
    }

    fn execute(inner: &mut MockLedgerInner, kind: LedgerCallKind, request: &Value) -> Value {
        let call = &request["params"][0];
        let from = call["from"]
            .as_str()
            .and_then(|from| AccountAddress::parse(from).ok());
        let payload = call["data"]
            .as_str()
            .and_then(|data| decode_call_data(data).ok())
            .map(|decoded| decoded.payload)
            .unwrap_or_default();

        match kind {
            LedgerCallKind::WriteDataHash => {
                inner.data_hash = Some(payload);
                Value::String(Self::next_tx(inner))
            }
            LedgerCallKind::WritePublicKey => {
                if let Some(from) = from {
                    let pem = String::from_utf8_lossy(&payload).into_owned();
                    inner.consumer_key = Some((from, pem));
                }
                Value::String(Self::next_tx(inner))
            }
            LedgerCallKind::ReadDataHash => {
                let hash = inner.data_hash.clone().unwrap_or_default();
                Value::String(encode_bytes_result(&hash))
            }
            LedgerCallKind::ReadPublicKey => match &inner.consumer_key {
                Some((address, pem)) => {
                    Value::String(encode_key_result(address.hex_digits(), pem.as_bytes()))
                }
                None => Value::String(encode_key_result(&"0".repeat(40), &[])),
            },
            LedgerCallKind::RateProducerPositive | LedgerCallKind::RateProducerNegative => {
                if let Some(from) = from {
                    let positive = kind == LedgerCallKind::RateProducerPositive;
                    inner.votes.push((from, positive));
                }
                Value::String(Self::next_tx(inner))
            }
            LedgerCallKind::GetTransactionReceipt => {
                let tx = call.as_str().unwrap_or_default().to_string();
                let polls = {
                    let polls = inner.receipt_polls.entry(tx).or_insert(0);
                    *polls += 1;
                    *polls
                };
                if polls <= inner.pending_polls {
                    Value::Null
                } else if inner.revert {
                    json!({ "status": "0x0" })
                } else {
                    json!({ "status": "0x1" })
                }
            }
        }
    }
}

#[async_trait]
impl LedgerTransport for MockLedger {
    async fn post(&self, _path: &str, body: Vec<u8>, on_response: ResponseHandle) -> LedgerResult<()> {
        let request: Value = serde_json::from_slice(&body)
            .map_err(|e| LedgerError::network(format!("mock ledger got invalid JSON: {}", e)))?;
        let kind = request["id"]
            .as_u64()
            .and_then(LedgerCallKind::from_id)
            .ok_or_else(|| LedgerError::network("mock ledger got a request without a known id"))?;

        let (response, delay) = {
            let mut inner = self.inner.write().unwrap();
            if inner.should_fail {
                return Err(LedgerError::network("mock ledger unreachable"));
            }
            inner.calls.push(kind);

            if inner.silent.contains(&kind) {
                inner.held.push(on_response);
                return Ok(());
            }

            let id = if inner.mismatch_ids {
                LedgerCallKind::ALL
                    .iter()
                    .find(|other| **other != kind)
                    .map_or(kind.id(), |other| other.id())
            } else {
                kind.id()
            };

            let response = if inner.failing.contains(&kind) {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32000, "message": "execution reverted" }
                })
            } else {
                let result = Self::execute(&mut inner, kind, &request);
                json!({ "jsonrpc": "2.0", "id": id, "result": result })
            };
            (response, inner.response_delay)
        };

        let bytes = response.to_string().into_bytes();
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            on_response.complete(bytes);
        });
        Ok(())
    }
}
