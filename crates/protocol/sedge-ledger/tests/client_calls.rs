//! LedgerClient against the mock contract.

use std::sync::Arc;
use std::time::Duration;

use sedge_ledger::{LedgerClient, LedgerError, RetryConfig};
use sedge_test_utils::{
    consumer_address, consumer_keypair, contract_address, fast_ledger_config, ledger_client,
    producer_address, tx_hash, MockLedger,
};
use sedge_types::{ConfirmationStatus, LedgerCallKind};
use sedge_wire::WireError;

#[tokio::test]
async fn test_data_hash_round_trip() {
    let ledger = MockLedger::new();
    let client = ledger_client(&ledger);
    let hash = [0x5Au8; 32];

    let tx = client
        .write_data_hash(&producer_address(), &contract_address(), &hash)
        .await
        .unwrap();
    assert_eq!(tx, tx_hash(1));
    assert_eq!(ledger.data_hash(), Some(hash.to_vec()));

    let read = client
        .read_data_hash(&consumer_address(), &contract_address())
        .await
        .unwrap();
    assert_eq!(read, hash.to_vec());
    assert_eq!(
        ledger.calls(),
        vec![LedgerCallKind::WriteDataHash, LedgerCallKind::ReadDataHash]
    );
}

#[tokio::test]
async fn test_public_key_round_trip() {
    let ledger = MockLedger::new();
    let client = ledger_client(&ledger);
    let pem = &consumer_keypair().public_pem;

    client
        .write_public_key(&consumer_address(), &contract_address(), pem)
        .await
        .unwrap();

    let key = client
        .read_public_key(&producer_address(), &contract_address())
        .await
        .unwrap();
    assert_eq!(key.address, consumer_address());
    assert_eq!(&key.public_key_pem, pem);
}

#[tokio::test]
async fn test_votes_recorded() {
    let ledger = MockLedger::new();
    let client = ledger_client(&ledger);

    client
        .rate_producer(&consumer_address(), &contract_address(), true)
        .await
        .unwrap();
    client
        .rate_producer(&consumer_address(), &contract_address(), false)
        .await
        .unwrap();

    assert_eq!(
        ledger.votes(),
        vec![(consumer_address(), true), (consumer_address(), false)]
    );
    assert_eq!(ledger.call_count(LedgerCallKind::RateProducerPositive), 1);
    assert_eq!(ledger.call_count(LedgerCallKind::RateProducerNegative), 1);
}

#[tokio::test(start_paused = true)]
async fn test_silent_ledger_times_out() {
    let ledger = MockLedger::new();
    ledger.silence_call(LedgerCallKind::ReadDataHash);
    let client = ledger_client(&ledger);

    let err = client
        .read_data_hash(&consumer_address(), &contract_address())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Timeout(_)));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_transaction_not_resubmitted() {
    let ledger = MockLedger::new();
    ledger.silence_call(LedgerCallKind::WriteDataHash);
    ledger.silence_call(LedgerCallKind::RateProducerNegative);
    ledger.silence_call(LedgerCallKind::ReadDataHash);
    let config = fast_ledger_config()
        .with_request_retry(RetryConfig::fixed(3, Duration::from_millis(100)));
    let client = LedgerClient::new(Arc::new(ledger.clone()), &config);

    let err = client
        .write_data_hash(&producer_address(), &contract_address(), &[1u8; 32])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Timeout(_)));
    assert_eq!(ledger.call_count(LedgerCallKind::WriteDataHash), 1);

    let err = client
        .rate_producer(&consumer_address(), &contract_address(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Timeout(_)));
    assert_eq!(ledger.call_count(LedgerCallKind::RateProducerNegative), 1);

    // Reads are safe to repeat
    let err = client
        .read_data_hash(&consumer_address(), &contract_address())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Timeout(_)));
    assert_eq!(ledger.call_count(LedgerCallKind::ReadDataHash), 3);
}

#[tokio::test(start_paused = true)]
async fn test_slow_response_within_timeout() {
    let ledger = MockLedger::new().with_response_delay(std::time::Duration::from_millis(500));
    let client = ledger_client(&ledger);

    let tx = client
        .write_data_hash(&producer_address(), &contract_address(), &[1u8; 32])
        .await
        .unwrap();
    assert_eq!(tx, tx_hash(1));
}

#[tokio::test]
async fn test_rpc_error_surfaces() {
    let ledger = MockLedger::new();
    ledger.fail_call(LedgerCallKind::WriteDataHash);
    let client = ledger_client(&ledger);

    let err = client
        .write_data_hash(&producer_address(), &contract_address(), &[1u8; 32])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Wire(WireError::Rpc { code: -32000, .. })));
    assert!(ledger.data_hash().is_none());
}

#[tokio::test]
async fn test_mismatched_id_rejected() {
    let ledger = MockLedger::new().with_mismatched_ids();
    let client = ledger_client(&ledger);

    let err = client
        .read_data_hash(&consumer_address(), &contract_address())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Wire(WireError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unreachable_ledger() {
    let ledger = MockLedger::new().with_failure();
    let client = ledger_client(&ledger);

    let err = client
        .read_public_key(&producer_address(), &contract_address())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Network(_)));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn test_single_receipt_poll() {
    let ledger = MockLedger::new().with_pending_polls(1);
    let client = ledger_client(&ledger);
    let tx = client
        .write_data_hash(&producer_address(), &contract_address(), &[1u8; 32])
        .await
        .unwrap();

    assert_eq!(
        client.transaction_receipt(&tx).await.unwrap(),
        ConfirmationStatus::Pending
    );
    assert_eq!(
        client.transaction_receipt(&tx).await.unwrap(),
        ConfirmationStatus::SucceededOk
    );
}
