//! Run the consumer side.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use sedge_crypto::CryptoOps;
use sedge_ledger::{HttpLedgerTransport, LedgerClient};
use sedge_net::TcpExchangeClient;
use sedge_ops::{ConsumerClient, ConsumerPipeline, ConsumerSession, Sensor};

use crate::commands::keygen::load_keypair;
use crate::config::NodeConfig;
use crate::device::{LogIndicator, SimulatedSensor};
use crate::error::NodeResult;

/// Execute the consumer command.
///
/// Drives the request sequence on every `interaction_interval` tick while
/// the verification pipeline consumes delivered readings, until `shutdown`
/// fires.
pub async fn consumer(
    config: NodeConfig,
    mut shutdown: watch::Receiver<bool>,
) -> NodeResult<String> {
    config.validate()?;
    let account = config.consumer_account()?;
    let keys = load_keypair(&config.keys)?;

    let transport = HttpLedgerTransport::new(&config.ledger)?;
    let ledger = Arc::new(LedgerClient::new(Arc::new(transport), &config.ledger));

    // Entropy only; the consumer has no readings of its own
    let sensor = SimulatedSensor::new(&config.sensor);
    let crypto = Arc::new(CryptoOps::new(Some(keys.private_pem)));
    crypto.seed(&sensor.entropy_sample().to_le_bytes())?;

    let session = Arc::new(ConsumerSession::new());
    let client = ConsumerClient::new(
        Arc::clone(&session),
        Arc::new(TcpExchangeClient::new(config.network.clone())),
        Arc::clone(&ledger),
        config.consumer.producer_addr,
        account.clone(),
        keys.public_pem,
    );
    let pipeline = Arc::new(ConsumerPipeline::new(
        session,
        ledger,
        crypto,
        Arc::new(LogIndicator::new()),
        account.clone(),
        config.exchange.clone(),
    ));

    info!(
        consumer = %account,
        producer = %config.consumer.producer_addr,
        ledger = %config.ledger.endpoint,
        "Consumer node started"
    );

    let verifier = {
        let pipeline = Arc::clone(&pipeline);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { pipeline.run(shutdown).await })
    };

    let mut ticker = tokio::time::interval(config.consumer.interaction_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut steps: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match client.advance().await {
                    Ok(step) => {
                        steps += 1;
                        debug!(step = ?step, "Exchange step completed");
                    }
                    Err(e) => warn!(error = %e, "Exchange step failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    if let Err(e) = verifier.await {
        warn!(error = %e, "Verification task failed");
    }

    info!(steps, "Consumer node stopped");
    Ok(format!("Consumer stopped after {} exchange steps", steps))
}
