//! Conclave Events - Host Channel Wire Types
//!
//! Inbound: raw envelopes pushed by the orchestration backend are decoded into
//! the closed [`InboundEvent`] union. Unknown `type` values decode to
//! [`InboundEvent::Unrecognized`] and never fail.
//!
//! Outbound: user actions leave the panel as [`Intent`] values serialized to
//! `{"type": ..., "payload": {...}}`.

mod envelope;
mod error;
mod inbound;
mod intent;

pub use envelope::{EnvelopeKind, RawEnvelope};
pub use error::DecodeError;
pub use inbound::{
    decode, decode_envelope, decode_value, DomainErrorReport, FlowExecution, FlowResolution,
    InboundEvent, SystemKind,
};
pub use intent::Intent;
