//! Consumer verification against the mock ledger.

use sedge_crypto::CryptoError;
use sedge_ops::{ConsumerPipeline, ConsumerSession, OpsError};
use sedge_test_utils::{
    consumer_address, consumer_crypto, consumer_keypair, contract_address, fast_exchange_config,
    ledger_client, other_keypair, producer_crypto, MockLedger, RecordingIndicator,
};
use sedge_types::{ConsumerEntry, ExchangePayload, ExchangeStep, IndicatorLevel, LedgerCallKind};
use std::sync::Arc;

struct Consumer {
    pipeline: ConsumerPipeline,
    session: Arc<ConsumerSession>,
    indicator: RecordingIndicator,
}

fn consumer(ledger: &MockLedger) -> Consumer {
    let session = Arc::new(ConsumerSession::new());
    let indicator = RecordingIndicator::new();
    let pipeline = ConsumerPipeline::new(
        Arc::clone(&session),
        ledger_client(ledger),
        consumer_crypto(),
        Arc::new(indicator.clone()),
        consumer_address(),
        fast_exchange_config(),
    );
    Consumer {
        pipeline,
        session,
        indicator,
    }
}

/// Ciphertext of `reading` for `public_pem`, as a producer would prepare it.
fn ciphertext_for(public_pem: &str, reading: u8) -> ExchangePayload {
    let entry = ConsumerEntry::new(consumer_address(), public_pem)
        .unwrap()
        .activated();
    let bytes = producer_crypto().encrypt_for(Some(&entry), &[reading]).unwrap();
    ExchangePayload::from_vec(bytes).unwrap()
}

fn committed_hash(payload: &ExchangePayload) -> Vec<u8> {
    producer_crypto()
        .hash(payload.as_bytes())
        .unwrap()
        .as_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_matching_hash_votes_positive() {
    let payload = ciphertext_for(&consumer_keypair().public_pem, 7);
    let ledger = MockLedger::new().with_data_hash(committed_hash(&payload));
    let c = consumer(&ledger);
    c.session.set_contract(contract_address()).await;

    let verification = c.pipeline.process(&payload).await.unwrap();

    assert_eq!(verification.reading, 7);
    assert!(verification.matched);
    assert_eq!(verification.level, IndicatorLevel::High);
    assert_eq!(c.indicator.levels(), vec![IndicatorLevel::High]);
    assert_eq!(ledger.votes(), vec![(consumer_address(), true)]);
    assert_eq!(
        ledger.calls(),
        vec![LedgerCallKind::ReadDataHash, LedgerCallKind::RateProducerPositive]
    );
}

#[tokio::test]
async fn test_mismatched_hash_votes_negative() {
    let payload = ciphertext_for(&consumer_keypair().public_pem, 3);
    let ledger = MockLedger::new().with_data_hash(vec![0u8; 32]);
    let c = consumer(&ledger);
    c.session.set_contract(contract_address()).await;

    let verification = c.pipeline.process(&payload).await.unwrap();

    assert!(!verification.matched);
    assert_eq!(verification.reading, 3);
    assert_eq!(c.indicator.last(), Some(IndicatorLevel::Low));
    assert_eq!(ledger.votes(), vec![(consumer_address(), false)]);
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let payload = ciphertext_for(&consumer_keypair().public_pem, 5);
    let ledger = MockLedger::new().with_data_hash(committed_hash(&payload));
    let c = consumer(&ledger);
    c.session.set_contract(contract_address()).await;

    let verification = c.pipeline.process(&payload).await.unwrap();
    assert_eq!(verification.level, IndicatorLevel::High);
}

#[tokio::test]
async fn test_missing_contract_resets_sequence() {
    let payload = ciphertext_for(&consumer_keypair().public_pem, 7);
    let ledger = MockLedger::new().with_data_hash(committed_hash(&payload));
    let c = consumer(&ledger);
    c.session.set_step(ExchangeStep::RequestData);
    c.session.channel().try_push(payload).await.unwrap();

    let err = c.pipeline.next_round().await.unwrap_err();

    assert!(matches!(err, OpsError::NoContractAddress));
    assert_eq!(c.session.step(), ExchangeStep::RequestAddress);
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn test_foreign_ciphertext_resets_sequence() {
    let payload = ciphertext_for(&other_keypair().public_pem, 7);
    let ledger = MockLedger::new().with_data_hash(committed_hash(&payload));
    let c = consumer(&ledger);
    c.session.set_contract(contract_address()).await;
    c.session.set_step(ExchangeStep::RequestData);
    c.session.channel().try_push(payload).await.unwrap();

    let err = c.pipeline.next_round().await.unwrap_err();

    assert!(matches!(err, OpsError::Crypto(CryptoError::Decrypt(_))));
    assert_eq!(c.session.step(), ExchangeStep::RequestAddress);
    assert!(ledger.votes().is_empty());
    assert!(c.indicator.levels().is_empty());
}

#[tokio::test]
async fn test_ledger_failure_resets_sequence() {
    let payload = ciphertext_for(&consumer_keypair().public_pem, 7);
    let ledger = MockLedger::new();
    ledger.fail_call(LedgerCallKind::ReadDataHash);
    let c = consumer(&ledger);
    c.session.set_contract(contract_address()).await;
    c.session.set_step(ExchangeStep::AnnounceKey);
    c.session.channel().try_push(payload).await.unwrap();

    assert!(matches!(
        c.pipeline.next_round().await,
        Err(OpsError::Ledger(_))
    ));
    assert_eq!(c.session.step(), ExchangeStep::RequestAddress);
}

#[tokio::test(start_paused = true)]
async fn test_empty_round() {
    let ledger = MockLedger::new();
    let c = consumer(&ledger);
    c.session.set_step(ExchangeStep::RequestData);

    assert_eq!(c.pipeline.next_round().await.unwrap(), None);
    assert_eq!(c.session.step(), ExchangeStep::RequestData);
}
