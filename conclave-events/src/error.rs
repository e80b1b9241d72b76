//! Decoding errors.

use thiserror::Error;

/// A malformed envelope. The panel drops these without mutating state.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Envelope is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{kind} envelope carries no payload")]
    MissingPayload { kind: &'static str },

    #[error("{kind} payload has the wrong shape: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} payload is missing field {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}
