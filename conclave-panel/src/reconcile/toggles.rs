//! System toggles with explicit optimistic sync state.

use conclave_events::SystemKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ToggleSync {
    /// Value last set by the backend.
    #[default]
    Confirmed,
    /// Value set locally and not yet acknowledged; `previous` is the value to
    /// fall back to if the request never leaves the panel.
    Pending { previous: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toggle {
    pub enabled: bool,
    pub sync: ToggleSync,
}

impl Toggle {
    pub fn is_pending(&self) -> bool {
        matches!(self.sync, ToggleSync::Pending { .. })
    }
}

/// What an authoritative status did to the optimistic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Nothing was pending.
    Settled,
    /// The pending request was acknowledged.
    Accepted,
    /// The backend reported a different value than requested.
    Overridden,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemToggles {
    pub project_management: Toggle,
    pub tools_system: Toggle,
    pub learning_system: Toggle,
}

impl SystemToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, system: SystemKind) -> Toggle {
        match system {
            SystemKind::ProjectManagement => self.project_management,
            SystemKind::ToolsSystem => self.tools_system,
            SystemKind::LearningSystem => self.learning_system,
        }
    }

    fn get_mut(&mut self, system: SystemKind) -> &mut Toggle {
        match system {
            SystemKind::ProjectManagement => &mut self.project_management,
            SystemKind::ToolsSystem => &mut self.tools_system,
            SystemKind::LearningSystem => &mut self.learning_system,
        }
    }

    /// Optimistically set a toggle from the UI.
    ///
    /// A second request while one is pending keeps the original fallback.
    pub fn request(&mut self, system: SystemKind, enabled: bool) {
        let toggle = self.get_mut(system);
        let previous = match toggle.sync {
            ToggleSync::Pending { previous } => previous,
            ToggleSync::Confirmed => toggle.enabled,
        };
        *toggle = Toggle {
            enabled,
            sync: ToggleSync::Pending { previous },
        };
    }

    /// Authoritative value from a status event. Always wins.
    pub fn confirm(&mut self, system: SystemKind, enabled: bool) -> Confirmation {
        let toggle = self.get_mut(system);
        let outcome = match toggle.sync {
            ToggleSync::Confirmed => Confirmation::Settled,
            ToggleSync::Pending { .. } if toggle.enabled == enabled => Confirmation::Accepted,
            ToggleSync::Pending { .. } => Confirmation::Overridden,
        };
        *toggle = Toggle {
            enabled,
            sync: ToggleSync::Confirmed,
        };
        outcome
    }

    /// Roll back a pending request whose intent could not be sent.
    ///
    /// Returns `false` when nothing was pending; a confirmed value is never
    /// touched.
    pub fn revert(&mut self, system: SystemKind) -> bool {
        let toggle = self.get_mut(system);
        match toggle.sync {
            ToggleSync::Pending { previous } => {
                *toggle = Toggle {
                    enabled: previous,
                    sync: ToggleSync::Confirmed,
                };
                true
            }
            ToggleSync::Confirmed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_pending() {
        let mut toggles = SystemToggles::new();
        toggles.request(SystemKind::ToolsSystem, true);
        let toggle = toggles.get(SystemKind::ToolsSystem);
        assert!(toggle.enabled);
        assert_eq!(toggle.sync, ToggleSync::Pending { previous: false });
        assert!(!toggles.get(SystemKind::LearningSystem).is_pending());
    }

    #[test]
    fn test_confirm_accepts_matching_request() {
        let mut toggles = SystemToggles::new();
        toggles.request(SystemKind::LearningSystem, true);
        assert_eq!(
            toggles.confirm(SystemKind::LearningSystem, true),
            Confirmation::Accepted
        );
        assert!(!toggles.get(SystemKind::LearningSystem).is_pending());
    }

    #[test]
    fn test_confirm_overrides_rejected_request() {
        let mut toggles = SystemToggles::new();
        toggles.request(SystemKind::ProjectManagement, true);
        assert_eq!(
            toggles.confirm(SystemKind::ProjectManagement, false),
            Confirmation::Overridden
        );
        assert!(!toggles.get(SystemKind::ProjectManagement).enabled);
    }

    #[test]
    fn test_confirm_is_idempotent() {
        let mut toggles = SystemToggles::new();
        toggles.confirm(SystemKind::ToolsSystem, true);
        let once = toggles;
        assert_eq!(toggles.confirm(SystemKind::ToolsSystem, true), Confirmation::Settled);
        assert_eq!(toggles, once);
    }

    #[test]
    fn test_revert_restores_value_before_first_request() {
        let mut toggles = SystemToggles::new();
        toggles.request(SystemKind::ToolsSystem, true);
        toggles.request(SystemKind::ToolsSystem, false);
        toggles.request(SystemKind::ToolsSystem, true);
        assert!(toggles.revert(SystemKind::ToolsSystem));
        assert_eq!(toggles.get(SystemKind::ToolsSystem), Toggle::default());
    }

    #[test]
    fn test_revert_after_confirm_is_noop() {
        let mut toggles = SystemToggles::new();
        toggles.request(SystemKind::ToolsSystem, true);
        toggles.confirm(SystemKind::ToolsSystem, true);
        assert!(!toggles.revert(SystemKind::ToolsSystem));
        assert!(toggles.get(SystemKind::ToolsSystem).enabled);
    }
}
