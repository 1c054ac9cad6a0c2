//! CBOR encoding of exchange frames.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{WireError, WireResult};

/// Largest encoded exchange frame accepted in either direction.
pub const MAX_FRAME_SIZE: usize = 4096;

/// Encode an exchange message to CBOR.
pub fn encode_frame<T: Serialize>(message: &T) -> WireResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(message, &mut buf).map_err(|e| WireError::Encode(e.to_string()))?;

    if buf.len() > MAX_FRAME_SIZE {
        return Err(WireError::EncodingOverflow {
            size: buf.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    Ok(buf)
}

/// Decode an exchange message from CBOR.
pub fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> WireResult<T> {
    ciborium::from_reader(bytes).map_err(|e| WireError::Decode(e.to_string()))
}
