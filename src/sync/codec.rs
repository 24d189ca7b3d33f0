//! Payload encodings for the realtime channel.

use thiserror::Error;

use super::message::SyncMessage;
use crate::core::WireFormat;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Turns sync messages into channel payloads and back.
pub trait WireCodec: Send + Sync {
    fn encode(&self, message: &SyncMessage) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, payload: &[u8]) -> Result<SyncMessage, CodecError>;
}

/// Human-readable JSON, the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode(&self, message: &SyncMessage) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(message)?)
    }

    fn decode(&self, payload: &[u8]) -> Result<SyncMessage, CodecError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Compact binary encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl WireCodec for BincodeCodec {
    fn encode(&self, message: &SyncMessage) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(message)?)
    }

    fn decode(&self, payload: &[u8]) -> Result<SyncMessage, CodecError> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// Codec for a configured wire format.
#[must_use]
pub fn codec_for(format: WireFormat) -> Box<dyn WireCodec> {
    match format {
        WireFormat::Json => Box::new(JsonCodec),
        WireFormat::Bincode => Box::new(BincodeCodec),
    }
}
