//! Raw inbound envelopes and their recognized kinds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An inbound envelope exactly as the host channel delivers it.
///
/// Legacy producers put the same logical payload under different keys, so
/// every slot is kept until the decoder picks the canonical one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl RawEnvelope {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// First non-null slot among the given candidates.
    pub(crate) fn first<'a>(&'a self, slots: &[Slot]) -> Option<&'a Value> {
        slots
            .iter()
            .filter_map(|slot| self.slot(*slot))
            .find(|value| !value.is_null())
    }

    fn slot(&self, slot: Slot) -> Option<&Value> {
        match slot {
            Slot::Payload => self.payload.as_ref(),
            Slot::Content => self.content.as_ref(),
            Slot::Agents => self.agents.as_ref(),
            Slot::Flow => self.flow.as_ref(),
            Slot::Flows => self.flows.as_ref(),
            Slot::Error => self.error.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Payload,
    Content,
    Agents,
    Flow,
    Flows,
    Error,
}

/// The closed set of envelope kinds the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    FlowUpdate,
    AgentsLoaded,
    Message,
    MessageUpdate,
    AnalysisComplete,
    TeamCreated,
    ProjectInitialized,
    AgentCreated,
    TaskCreated,
    Error,
    AutonomyUpdated,
    LoadingIndicator,
    HideLoadingIndicator,
    FlowExecuted,
    ChangesApplied,
    ChangesRejected,
    UpdateState,
    ProjectManagementStatus,
    ToolsSystemStatus,
    LearningSystemStatus,
}

impl EnvelopeKind {
    pub const ALL: [EnvelopeKind; 20] = [
        EnvelopeKind::FlowUpdate,
        EnvelopeKind::AgentsLoaded,
        EnvelopeKind::Message,
        EnvelopeKind::MessageUpdate,
        EnvelopeKind::AnalysisComplete,
        EnvelopeKind::TeamCreated,
        EnvelopeKind::ProjectInitialized,
        EnvelopeKind::AgentCreated,
        EnvelopeKind::TaskCreated,
        EnvelopeKind::Error,
        EnvelopeKind::AutonomyUpdated,
        EnvelopeKind::LoadingIndicator,
        EnvelopeKind::HideLoadingIndicator,
        EnvelopeKind::FlowExecuted,
        EnvelopeKind::ChangesApplied,
        EnvelopeKind::ChangesRejected,
        EnvelopeKind::UpdateState,
        EnvelopeKind::ProjectManagementStatus,
        EnvelopeKind::ToolsSystemStatus,
        EnvelopeKind::LearningSystemStatus,
    ];

    /// Classify a wire `type`. Aliases map to the same kind.
    pub fn from_wire(s: &str) -> Option<Self> {
        let kind = match s {
            "flow-update" => EnvelopeKind::FlowUpdate,
            "agents-update" | "AGENTS_LOADED" => EnvelopeKind::AgentsLoaded,
            "message" | "MESSAGE_RESPONSE" => EnvelopeKind::Message,
            "MESSAGE_UPDATE" => EnvelopeKind::MessageUpdate,
            "analysis-complete" => EnvelopeKind::AnalysisComplete,
            "teamCreated" => EnvelopeKind::TeamCreated,
            "PROJECT_INITIALIZED" => EnvelopeKind::ProjectInitialized,
            "AGENT_CREATED" => EnvelopeKind::AgentCreated,
            "TASK_CREATED" => EnvelopeKind::TaskCreated,
            "error" => EnvelopeKind::Error,
            "AUTONOMY_UPDATED" => EnvelopeKind::AutonomyUpdated,
            "LOADING_INDICATOR" => EnvelopeKind::LoadingIndicator,
            "HIDE_LOADING_INDICATOR" => EnvelopeKind::HideLoadingIndicator,
            "FLOW_EXECUTED" => EnvelopeKind::FlowExecuted,
            "CHANGES_APPLIED" => EnvelopeKind::ChangesApplied,
            "CHANGES_REJECTED" => EnvelopeKind::ChangesRejected,
            "updateState" => EnvelopeKind::UpdateState,
            "PROJECT_MANAGEMENT_STATUS" => EnvelopeKind::ProjectManagementStatus,
            "TOOLS_SYSTEM_STATUS" => EnvelopeKind::ToolsSystemStatus,
            "LEARNING_SYSTEM_STATUS" => EnvelopeKind::LearningSystemStatus,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical wire name.
    pub fn as_wire(&self) -> &'static str {
        match self {
            EnvelopeKind::FlowUpdate => "flow-update",
            EnvelopeKind::AgentsLoaded => "AGENTS_LOADED",
            EnvelopeKind::Message => "MESSAGE_RESPONSE",
            EnvelopeKind::MessageUpdate => "MESSAGE_UPDATE",
            EnvelopeKind::AnalysisComplete => "analysis-complete",
            EnvelopeKind::TeamCreated => "teamCreated",
            EnvelopeKind::ProjectInitialized => "PROJECT_INITIALIZED",
            EnvelopeKind::AgentCreated => "AGENT_CREATED",
            EnvelopeKind::TaskCreated => "TASK_CREATED",
            EnvelopeKind::Error => "error",
            EnvelopeKind::AutonomyUpdated => "AUTONOMY_UPDATED",
            EnvelopeKind::LoadingIndicator => "LOADING_INDICATOR",
            EnvelopeKind::HideLoadingIndicator => "HIDE_LOADING_INDICATOR",
            EnvelopeKind::FlowExecuted => "FLOW_EXECUTED",
            EnvelopeKind::ChangesApplied => "CHANGES_APPLIED",
            EnvelopeKind::ChangesRejected => "CHANGES_REJECTED",
            EnvelopeKind::UpdateState => "updateState",
            EnvelopeKind::ProjectManagementStatus => "PROJECT_MANAGEMENT_STATUS",
            EnvelopeKind::ToolsSystemStatus => "TOOLS_SYSTEM_STATUS",
            EnvelopeKind::LearningSystemStatus => "LEARNING_SYSTEM_STATUS",
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
