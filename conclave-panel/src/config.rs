//! Configuration loading for the Conclave panel.
//!
//! All fields are required. No defaults in the file format; `ReconcileSettings`
//! alone has a `Default` for embedders and tests.

use conclave_core::{Normalizer, TeamId, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "CONCLAVE_PANEL_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    pub reconcile: ReconcileSettings,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
    pub channel: ChannelConfig,
}

/// Knobs the reducer consults while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileSettings {
    /// Role promoted to the `vp_agent` singleton.
    pub coordinator_role: String,
    /// Team bucket that receives coordinator responses.
    pub coordinator_team_id: TeamId,
    /// Bound for each autonomy history log.
    pub history_limit: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            coordinator_role: "VP of Engineering".to_string(),
            coordinator_team_id: TeamId::from("root"),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ReconcileSettings {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.history_limit)
    }

    pub fn is_coordinator_role(&self, role: &str) -> bool {
        role.trim().eq_ignore_ascii_case(self.coordinator_role.trim())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfig {
    pub state_dir: PathBuf,
    pub snapshot_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub inbound_buffer: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CONCLAVE_PANEL_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl PanelConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconcile.coordinator_role.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "reconcile.coordinator_role",
                reason: "must not be empty".to_string(),
            });
        }
        if self.reconcile.coordinator_team_id.to_string().trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "reconcile.coordinator_team_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.reconcile.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconcile.history_limit",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence.state_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence.state_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if !is_valid_key(&self.persistence.snapshot_key) {
            return Err(ConfigError::InvalidValue {
                field: "persistence.snapshot_key",
                reason: "must be non-empty and contain only [A-Za-z0-9._-]".to_string(),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter",
                reason: "must not be empty".to_string(),
            });
        }
        if self.channel.inbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel.inbound_buffer",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Keys double as file names in the file-backed store.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
