//! Derived state built from a flow execution.
//!
//! A `FLOW_EXECUTED` result produces two things at once: the change group the
//! user reviews and the active flow it belongs to. Both are built here from
//! the execution plus a roster lookup so they can never disagree.

use super::agents::AgentRoster;
use conclave_core::{AgentId, ChangeGroup, ChangeGroupId, EntityIdType, ProposedChanges, Timestamp};
use conclave_events::FlowExecution;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display name used when the acting agent is not in the roster.
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

/// The single flow execution awaiting a user decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFlow {
    pub flow_id: ChangeGroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub proposed_changes: ProposedChanges,
    pub result: Value,
    pub state: Value,
}

/// Build the change group and active flow for one execution.
///
/// The flow id comes from the execution when present, otherwise a fresh
/// time-derived id is synthesized. The group reuses it as its own id.
pub fn build(exec: FlowExecution, roster: &AgentRoster, now: Timestamp) -> (ChangeGroup, ActiveFlow) {
    let FlowExecution {
        flow_id,
        agent_id,
        proposed_changes,
        result,
        state,
    } = exec;

    let flow_id = flow_id.unwrap_or_else(ChangeGroupId::generate);
    let proposed_changes = proposed_changes.deduplicated();
    let agent_name = agent_id
        .as_ref()
        .and_then(|id| roster.get(id))
        .map(|agent| agent.name.clone())
        .unwrap_or_else(|| UNKNOWN_AGENT_NAME.to_string());

    let group = ChangeGroup {
        id: flow_id.clone(),
        agent_id: agent_id.clone(),
        agent_name,
        timestamp: now,
        changes: proposed_changes.clone(),
    };
    let active = ActiveFlow {
        flow_id,
        agent_id,
        proposed_changes,
        result,
        state,
    };
    (group, active)
}
