//! Error types for Conclave entities

use thiserror::Error;

/// A record that cannot be admitted into a materialized view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Agent record has no id")]
    MissingAgentId,
}
