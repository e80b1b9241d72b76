//! Domain error routing into fixed UI slots.

use conclave_events::DomainErrorReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSlot {
    Agent,
    Task,
    Message,
    Team,
}

impl ErrorSlot {
    /// Substring fallback order.
    pub const ALL: [ErrorSlot; 4] = [
        ErrorSlot::Agent,
        ErrorSlot::Task,
        ErrorSlot::Message,
        ErrorSlot::Team,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            ErrorSlot::Agent => "agent",
            ErrorSlot::Task => "task",
            ErrorSlot::Message => "message",
            ErrorSlot::Team => "team",
        }
    }

    fn from_kind(kind: &str) -> Option<Self> {
        let kind = kind.trim();
        Self::ALL
            .into_iter()
            .find(|slot| kind.eq_ignore_ascii_case(slot.keyword()))
    }
}

/// Pick the slot for a report: explicit kind first, then the first keyword
/// found in the message, case-insensitively.
pub fn classify(report: &DomainErrorReport) -> Option<ErrorSlot> {
    if let Some(slot) = report.kind.as_deref().and_then(ErrorSlot::from_kind) {
        return Some(slot);
    }
    let message = report.message.to_lowercase();
    ErrorSlot::ALL
        .into_iter()
        .find(|slot| message.contains(slot.keyword()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSlots {
    pub agent: Option<String>,
    pub task: Option<String>,
    pub message: Option<String>,
    pub team: Option<String>,
}

impl ErrorSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: ErrorSlot) -> Option<&str> {
        match slot {
            ErrorSlot::Agent => self.agent.as_deref(),
            ErrorSlot::Task => self.task.as_deref(),
            ErrorSlot::Message => self.message.as_deref(),
            ErrorSlot::Team => self.team.as_deref(),
        }
    }

    fn get_mut(&mut self, slot: ErrorSlot) -> &mut Option<String> {
        match slot {
            ErrorSlot::Agent => &mut self.agent,
            ErrorSlot::Task => &mut self.task,
            ErrorSlot::Message => &mut self.message,
            ErrorSlot::Team => &mut self.team,
        }
    }

    /// Surface a report. Unclassified reports are dropped and `None` returned.
    pub fn record(&mut self, report: DomainErrorReport) -> Option<ErrorSlot> {
        let slot = classify(&report)?;
        *self.get_mut(slot) = Some(report.message);
        Some(slot)
    }

    pub fn dismiss(&mut self, slot: ErrorSlot) {
        *self.get_mut(slot) = None;
    }

    pub fn is_empty(&self) -> bool {
        ErrorSlot::ALL.into_iter().all(|slot| self.get(slot).is_none())
    }
}
