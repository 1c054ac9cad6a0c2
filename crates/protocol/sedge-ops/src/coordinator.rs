//! Producer-side request handling.
//!
//! | option | action | reply |
//! |---|---|---|
//! | `ContractAddress` | look up the sender's address; a known consumer is made active and a run is started | `ConsumerAlreadyAuthenticated_<contract>` or `ContractAddress_<contract>` |
//! | `PublicKeyAvailable` | clear the auth flag, start a run | `Prepare payload data` |
//! | `Data` | branch on the producer state; on `Success` drain the channel | `Data_<ciphertext>` or a status literal |
//! | other | none | `Option not supported` |

use async_trait::async_trait;
use sedge_net::RequestHandler;
use sedge_types::{AccountAddress, ProducerState};
use sedge_wire::exchange::replies;
use sedge_wire::{ExchangeOption, ExchangeRequest, ExchangeResponse, ProducerReply, RequestMethod};
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::context::ProducerContext;
use crate::error::{OpsError, OpsResult};

/// Answers consumer requests from the shared producer context.
#[derive(Debug, Clone)]
pub struct ExchangeCoordinator {
    context: ProducerContext,
    contract: AccountAddress,
    config: ExchangeConfig,
}

impl ExchangeCoordinator {
    /// Create a coordinator that advertises `contract`.
    pub fn new(context: ProducerContext, contract: AccountAddress, config: ExchangeConfig) -> Self {
        Self {
            context,
            contract,
            config,
        }
    }

    /// Map one request to its response.
    ///
    /// Fails only for non-POST requests; every other outcome, including a
    /// failed run, is a literal reply.
    pub async fn handle_request(&self, request: &ExchangeRequest) -> OpsResult<ExchangeResponse> {
        if request.method != RequestMethod::Post {
            return Err(OpsError::UnsupportedMethod(request.method));
        }

        let response = match ExchangeOption::parse(&request.option) {
            Some(ExchangeOption::ContractAddress) => self.on_address(&request.payload).await,
            Some(ExchangeOption::PublicKeyAvailable) => self.on_key_ready(),
            Some(ExchangeOption::Data) => self.on_data().await,
            None => {
                debug!(option = %request.option, "Unknown option");
                ExchangeResponse::text(replies::OPTION_NOT_SUPPORTED)
            }
        };
        Ok(response)
    }

    async fn on_address(&self, payload: &[u8]) -> ExchangeResponse {
        let address = std::str::from_utf8(payload)
            .ok()
            .and_then(|text| AccountAddress::parse(text).ok());

        let Some(address) = address else {
            warn!(len = payload.len(), "Unparseable consumer address");
            return ProducerReply::ContractAddress(self.contract.clone()).into();
        };

        let known = {
            let mut table = self.context.auth_table.write().await;
            let known = match table.lookup(&address) {
                Some(index) => table.record_authenticated(index),
                None => false,
            };
            if known {
                // Restart under the table lock so a run still reading a key
                // from the ledger sees the new state before touching the table.
                self.context.auth_flag.set();
                self.context.state.request_start();
            }
            known
        };

        if known {
            info!(consumer = %address, "Known consumer, starting run");
            ProducerReply::AlreadyAuthenticated(self.contract.clone()).into()
        } else {
            info!(consumer = %address, "New consumer, sending contract address");
            ProducerReply::ContractAddress(self.contract.clone()).into()
        }
    }

    fn on_key_ready(&self) -> ExchangeResponse {
        info!("Consumer key available, starting run");
        self.context.auth_flag.clear();
        self.context.state.request_start();
        ExchangeResponse::text(replies::PREPARE_PAYLOAD)
    }

    async fn on_data(&self) -> ExchangeResponse {
        let state = self.context.state.current();
        match state {
            ProducerState::Start => ExchangeResponse::text(replies::PROCESSING_STARTED),
            ProducerState::Failed => ExchangeResponse::text(replies::PROCESSING_FAILED),
            ProducerState::Success => {
                if !self.context.state.take_success() {
                    // Claimed by a concurrent request
                    return ExchangeResponse::text(replies::PROCESSING_FAILED);
                }
                match self
                    .context
                    .channel
                    .drain(self.config.serve_drain_timeout)
                    .await
                {
                    Ok(payload) => {
                        info!(len = payload.len(), "Serving ciphertext");
                        ProducerReply::Data(payload.into_vec()).into()
                    }
                    Err(e) => {
                        warn!(error = %e, "No ciphertext to serve");
                        ExchangeResponse::text(replies::PROCESSING_FAILED)
                    }
                }
            }
            _ => {
                debug!(state = %state, "Run in progress");
                ExchangeResponse::text(replies::PROCESSING_IN_PROGRESS)
            }
        }
    }
}

#[async_trait]
impl RequestHandler for ExchangeCoordinator {
    async fn handle(&self, request: ExchangeRequest) -> ExchangeResponse {
        match self.handle_request(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Rejected exchange request");
                ExchangeResponse::text(replies::ONLY_POST_SUPPORTED)
            }
        }
    }
}
