//! The closed set of things that can change panel state.

use crate::reconcile::ErrorSlot;
use conclave_core::{AgentId, ChangeGroupId, TeamId};
use conclave_events::{InboundEvent, Intent, SystemKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An envelope pushed by the backend, already decoded.
    Inbound(InboundEvent),
    /// Something the user did.
    Ui(UiAction),
    /// An intent returned by an earlier reduce could not be sent.
    DispatchFailed(Box<Intent>),
}

impl From<InboundEvent> for Action {
    fn from(event: InboundEvent) -> Self {
        Action::Inbound(event)
    }
}

impl From<UiAction> for Action {
    fn from(action: UiAction) -> Self {
        Action::Ui(action)
    }
}

/// Conversation a locally composed message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum MessageTarget {
    General,
    Agent(AgentId),
    Team(TeamId),
    /// The coordinator agent, answered in the coordinator team bucket.
    Coordinator,
}

/// User actions, as the host forwards them: `{"action": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UiAction {
    /// Compose a message; the panel assigns its id.
    SendMessage {
        content: String,
        #[serde(default = "default_target")]
        target: MessageTarget,
    },
    /// Accept every change of the active flow.
    ApplyChanges,
    /// Reject every change of the active flow.
    RejectChanges,
    SetSystem { system: SystemKind, enabled: bool },
    #[serde(rename_all = "camelCase")]
    ModifyFileContent {
        group_id: ChangeGroupId,
        path: String,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    RequestExplanation {
        group_id: ChangeGroupId,
        path: String,
        explanation: String,
    },
    DismissError { slot: ErrorSlot },
    /// Any other outbound intent, with its local side effects.
    Submit { intent: Intent },
}

fn default_target() -> MessageTarget {
    MessageTarget::General
}
