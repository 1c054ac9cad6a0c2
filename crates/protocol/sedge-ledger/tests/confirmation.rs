//! Receipt polling.

use sedge_ledger::LedgerError;
use sedge_test_utils::{contract_address, ledger_client, producer_address, MockLedger};
use sedge_types::LedgerCallKind;
use std::time::Duration;
use tokio::time::Instant;

async fn submit(ledger: &MockLedger) -> (std::sync::Arc<sedge_ledger::LedgerClient>, sedge_types::TxHash) {
    let client = ledger_client(ledger);
    let tx = client
        .write_data_hash(&producer_address(), &contract_address(), &[7u8; 32])
        .await
        .unwrap();
    (client, tx)
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_after_pending_polls() {
    let ledger = MockLedger::new().with_pending_polls(2);
    let (client, tx) = submit(&ledger).await;

    let start = Instant::now();
    client.await_confirmation(&tx).await.unwrap();

    assert_eq!(ledger.receipt_polls(), 3);
    // Two sleeps of the 100ms fixed interval
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_on_first_poll() {
    let ledger = MockLedger::new();
    let (client, tx) = submit(&ledger).await;

    assert!(client.wait_for_confirmation(&tx).await);
    assert_eq!(ledger.receipt_polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reverted_transaction_stops_polling() {
    let ledger = MockLedger::new().with_reverts();
    let (client, tx) = submit(&ledger).await;

    let err = client.await_confirmation(&tx).await.unwrap_err();
    assert_eq!(err, LedgerError::TransactionReverted(tx.clone()));
    assert_eq!(ledger.receipt_polls(), 1);
    assert!(!client.wait_for_confirmation(&tx).await);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_after_attempt_bound() {
    let ledger = MockLedger::new().with_pending_polls(100);
    let (client, tx) = submit(&ledger).await;

    let err = client.await_confirmation(&tx).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ConfirmationExhausted { attempts: 5, .. }
    ));
    assert_eq!(ledger.receipt_polls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_is_not_confirmed() {
    let ledger = MockLedger::new();
    let (client, tx) = submit(&ledger).await;
    ledger.silence_call(LedgerCallKind::GetTransactionReceipt);

    assert!(!client.wait_for_confirmation(&tx).await);
    assert_eq!(ledger.call_count(LedgerCallKind::GetTransactionReceipt), 1);
}
