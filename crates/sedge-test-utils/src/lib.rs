pub mod helpers;
pub mod loopback;
pub mod mock_crypto;
pub mod mock_ledger;
pub mod mock_sensor;

pub use helpers::*;
pub use loopback::LoopbackExchange;
pub use mock_crypto::{CryptoFault, FaultyCrypto};
pub use mock_ledger::MockLedger;
pub use mock_sensor::{MockSensor, RecordingIndicator};
