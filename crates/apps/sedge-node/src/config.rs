//! Node configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sedge_ledger::LedgerConfig;
use sedge_net::{NetworkConfig, DEFAULT_EXCHANGE_PORT};
use sedge_ops::{ExchangeConfig, ProducerAccounts};
use sedge_types::{duration_millis, AccountAddress};

use crate::error::{NodeError, NodeResult};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sedge.toml";

/// Node configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Ledger node connection.
    pub ledger: LedgerConfig,
    /// Exchange transport.
    pub network: NetworkConfig,
    /// Pipeline timing.
    pub exchange: ExchangeConfig,
    /// Ledger accounts.
    pub accounts: AccountsConfig,
    /// Consumer key files.
    pub keys: KeysConfig,
    /// Consumer request loop.
    pub consumer: ConsumerConfig,
    /// Simulated sensor.
    pub sensor: SensorConfig,
}

impl NodeConfig {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> NodeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> NodeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| NodeError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check the settings shared by both roles.
    pub fn validate(&self) -> NodeResult<()> {
        self.ledger.validate()?;
        self.exchange
            .validate()
            .map_err(|e| NodeError::config(e.to_string()))?;
        if self.consumer.interaction_interval.is_zero() {
            return Err(NodeError::config(
                "consumer interaction interval must be non-zero",
            ));
        }
        if self.sensor.min > self.sensor.max {
            return Err(NodeError::config(format!(
                "sensor range is empty: {}..={}",
                self.sensor.min, self.sensor.max
            )));
        }
        Ok(())
    }

    /// Accounts the producer signs with, or a config error naming the missing one.
    pub fn producer_accounts(&self) -> NodeResult<ProducerAccounts> {
        Ok(ProducerAccounts {
            producer: required(&self.accounts.producer, "accounts.producer")?,
            contract: required(&self.accounts.contract, "accounts.contract")?,
        })
    }

    /// The consumer's own account.
    pub fn consumer_account(&self) -> NodeResult<AccountAddress> {
        required(&self.accounts.consumer, "accounts.consumer")
    }
}

fn required(value: &Option<AccountAddress>, name: &str) -> NodeResult<AccountAddress> {
    value
        .clone()
        .ok_or_else(|| NodeError::config(format!("{} is not set", name)))
}

/// Ledger accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Producer account (producer role).
    pub producer: Option<AccountAddress>,
    /// Contract the producer commits to (producer role).
    pub contract: Option<AccountAddress>,
    /// Consumer account (consumer role).
    pub consumer: Option<AccountAddress>,
}

/// Consumer key files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// PKCS#1 private key.
    pub private_key: PathBuf,
    /// SPKI public key registered on the ledger.
    pub public_key: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            private_key: PathBuf::from("keys").join("consumer.pem"),
            public_key: PathBuf::from("keys").join("consumer.pub.pem"),
        }
    }
}

/// Consumer request loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Producer's exchange endpoint.
    pub producer_addr: SocketAddr,
    /// Delay between exchange requests.
    #[serde(with = "duration_millis")]
    pub interaction_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            producer_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_EXCHANGE_PORT)),
            interaction_interval: Duration::from_secs(2),
        }
    }
}

/// Simulated sensor range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Lowest reading produced.
    pub min: u8,
    /// Highest reading produced.
    pub max: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self { min: 0, max: 9 }
    }
}

/// Default configuration path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
