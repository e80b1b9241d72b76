//! Conclave panel.
//!
//! Consumes the backend's envelope stream, keeps the panel's materialized
//! views consistent, and sends user intents back over the host channel.

pub mod actions;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod persistence;
pub mod reconcile;
pub mod runtime;
pub mod state;
pub mod telemetry;

pub use actions::{Action, MessageTarget, UiAction};
pub use config::{PanelConfig, ReconcileSettings};
pub use error::PanelError;
pub use state::{reduce, PanelState};
