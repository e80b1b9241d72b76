//! Error types for the panel.
//!
//! Send and save failures are handled inside the runtime and never reach
//! this type; only startup and shutdown can fail the process.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to initialize tracing: {0}")]
    Telemetry(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_displays_through() {
        let err = PanelError::from(ConfigError::InvalidValue {
            field: "channel.inbound_buffer",
            reason: "must be positive".to_string(),
        });
        assert!(matches!(err, PanelError::Config(_)));
        assert!(err.to_string().contains("channel.inbound_buffer"));
    }
}
