//! Run the producer side.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use sedge_crypto::CryptoOps;
use sedge_ledger::{HttpLedgerTransport, LedgerClient};
use sedge_net::TcpExchangeServer;
use sedge_ops::{ExchangeCoordinator, ProducerContext, ProducerPipeline, Sensor};

use crate::config::NodeConfig;
use crate::device::SimulatedSensor;
use crate::error::NodeResult;

/// Execute the producer command.
///
/// Serves exchange requests and runs the pipeline until `shutdown` fires.
pub async fn producer(config: NodeConfig, shutdown: watch::Receiver<bool>) -> NodeResult<String> {
    config.validate()?;
    let accounts = config.producer_accounts()?;

    let transport = HttpLedgerTransport::new(&config.ledger)?;
    let ledger = Arc::new(LedgerClient::new(Arc::new(transport), &config.ledger));

    let sensor = Arc::new(SimulatedSensor::new(&config.sensor));
    let crypto = Arc::new(CryptoOps::new(None));
    crypto.seed(&sensor.entropy_sample().to_le_bytes())?;

    let (context, writer) = ProducerContext::new();
    let coordinator = Arc::new(ExchangeCoordinator::new(
        context.clone(),
        accounts.contract.clone(),
        config.exchange.clone(),
    ));
    let pipeline = ProducerPipeline::new(
        context,
        writer,
        ledger,
        crypto,
        sensor,
        accounts.clone(),
        config.exchange.clone(),
    );

    let server = TcpExchangeServer::bind(config.network.clone()).await?;
    let listen_addr = server.local_addr()?;
    info!(
        addr = %listen_addr,
        producer = %accounts.producer,
        contract = %accounts.contract,
        ledger = %config.ledger.endpoint,
        "Producer node started"
    );

    let server_task = tokio::spawn(server.serve(coordinator, shutdown.clone()));
    pipeline.run(shutdown).await;

    match server_task.await {
        Ok(result) => result?,
        Err(e) => warn!(error = %e, "Exchange server task failed"),
    }

    info!("Producer node stopped");
    Ok(format!("Producer on {} stopped", listen_addr))
}
