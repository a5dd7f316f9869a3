//! The wire unit exchanged over the persistent connection.
//!
//! Every frame, in both directions, is a JSON text frame of the shape
//! `{"event": "<name>", "payload": <event specific value>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while turning a raw frame into a typed event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a valid envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    #[error("payload of '{event}' does not match its schema: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// An immutable `{event, payload}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    event: String,
    #[serde(default)]
    payload: JsonValue,
}

impl Envelope {
    /// Creates an envelope from an event name and payload.
    pub fn new(event: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Parses a raw text frame.
    ///
    /// Only the envelope shape is checked here; payloads are validated when
    /// the envelope is decoded into an [`InboundEvent`](super::InboundEvent).
    pub fn parse(frame: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(frame).map_err(DecodeError::InvalidEnvelope)
    }

    /// Event name carried by this envelope.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Raw payload carried by this envelope.
    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// Serializes the envelope into a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
