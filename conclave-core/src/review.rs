//! Backend-authoritative review entities.
//!
//! The panel never merges these incrementally; it only holds the last full
//! snapshot pushed by the backend.

use crate::identity::deserialize_loose_timestamp;
use crate::{
    AgentId, AnnotationId, ChangeGroup, CheckpointId, ImplementationId, ProposedChanges,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Checkpoint {
    pub id: CheckpointId,
    #[serde(deserialize_with = "deserialize_loose_timestamp")]
    pub timestamp: Option<Timestamp>,
    pub description: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationReply {
    pub author: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_loose_timestamp")]
    pub timestamp: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Annotation {
    pub id: AnnotationId,
    pub file_path: String,
    pub line: Option<u32>,
    pub content: String,
    pub author: String,
    #[serde(deserialize_with = "deserialize_loose_timestamp")]
    pub timestamp: Option<Timestamp>,
    pub replies: Vec<AnnotationReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternativeImplementation {
    pub id: ImplementationId,
    pub agent_id: Option<AgentId>,
    pub description: String,
    pub changes: ProposedChanges,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conflict {
    pub id: String,
    pub file_path: String,
    pub description: String,
    pub agents: Vec<AgentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingInstruction {
    pub id: String,
    pub content: String,
    pub agent_id: Option<AgentId>,
    #[serde(deserialize_with = "deserialize_loose_timestamp")]
    pub timestamp: Option<Timestamp>,
}

/// Minimal agent reference carried in review snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentRef {
    pub id: AgentId,
    pub name: String,
}

/// The composite state carried by an `updateState` envelope.
///
/// Absent collections mean empty: the snapshot replaces everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewSnapshot {
    pub change_groups: Vec<ChangeGroup>,
    pub alternative_implementations: Vec<AlternativeImplementation>,
    pub conflicts: Vec<Conflict>,
    pub annotations: Vec<Annotation>,
    pub checkpoints: Vec<Checkpoint>,
    pub is_resolving: bool,
    pub current_user: Option<String>,
    #[serde(alias = "knownAgents")]
    pub agents: Vec<AgentRef>,
    pub pending_instructions: Vec<PendingInstruction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_tolerates_missing_collections() {
        let snapshot: ReviewSnapshot = serde_json::from_value(json!({
            "checkpoints": [{"id": "c1", "description": "before refactor", "branch": "main"}],
            "isResolving": true
        }))
        .unwrap();
        assert_eq!(snapshot.checkpoints.len(), 1);
        assert_eq!(snapshot.checkpoints[0].details["branch"], json!("main"));
        assert!(snapshot.is_resolving);
        assert!(snapshot.change_groups.is_empty());
        assert!(snapshot.annotations.is_empty());
    }

    #[test]
    fn test_annotation_replies_parse() {
        let annotation: Annotation = serde_json::from_value(json!({
            "id": "n1",
            "filePath": "src/lib.rs",
            "line": 12,
            "content": "why?",
            "replies": [{"author": "a1", "content": "because"}]
        }))
        .unwrap();
        assert_eq!(annotation.line, Some(12));
        assert_eq!(annotation.replies[0].author, "a1");
    }
}
