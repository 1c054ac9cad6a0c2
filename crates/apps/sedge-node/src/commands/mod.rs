//! Command implementations.

mod consumer;
mod init;
mod keygen;
mod producer;

pub use consumer::consumer;
pub use init::init;
pub use keygen::keygen;
pub use producer::producer;
