//! Project and team records.

use crate::loose::deserialize_each;
use crate::{AgentId, AgentRecord, TeamId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Project metadata persisted alongside the roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectState {
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub agent_ids: Vec<AgentId>,
}

/// Team as announced by a `teamCreated` envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamRecord {
    #[serde(alias = "teamId")]
    pub id: Option<TeamId>,
    pub name: Option<String>,
    /// Unreadable member records are skipped.
    #[serde(deserialize_with = "deserialize_each")]
    pub agents: Vec<AgentRecord>,
}
