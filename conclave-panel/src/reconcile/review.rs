//! Backend-owned review state: checkpoints, annotations and friends.
//!
//! Nothing here is merged incrementally. The panel only keeps the last full
//! snapshot the backend pushed.

use super::changes::ChangeSet;
use conclave_core::{
    AgentRef, AlternativeImplementation, Annotation, Checkpoint, Conflict, PendingInstruction,
    ReviewSnapshot,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewState {
    pub alternative_implementations: Vec<AlternativeImplementation>,
    pub conflicts: Vec<Conflict>,
    pub annotations: Vec<Annotation>,
    pub checkpoints: Vec<Checkpoint>,
    pub is_resolving: bool,
    pub current_user: Option<String>,
    pub known_agents: Vec<AgentRef>,
    pub pending_instructions: Vec<PendingInstruction>,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Overwrite the composite review state, change groups included.
///
/// The active flow is left alone; it is only cleared by a flow verdict.
pub fn apply_snapshot(snapshot: ReviewSnapshot, review: &mut ReviewState, changes: &mut ChangeSet) {
    let ReviewSnapshot {
        change_groups,
        alternative_implementations,
        conflicts,
        annotations,
        checkpoints,
        is_resolving,
        current_user,
        agents,
        pending_instructions,
    } = snapshot;

    changes.replace_groups(change_groups);
    *review = ReviewState {
        alternative_implementations,
        conflicts,
        annotations,
        checkpoints,
        is_resolving,
        current_user,
        known_agents: agents,
        pending_instructions,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{ChangeGroup, ChangeGroupId, CheckpointId};
    use serde_json::json;

    #[test]
    fn test_snapshot_replaces_everything() {
        let mut review = ReviewState::new();
        review.checkpoints.push(Checkpoint {
            id: CheckpointId::from("old"),
            ..Checkpoint::default()
        });
        let mut changes = ChangeSet::new();

        let snapshot: ReviewSnapshot = serde_json::from_value(json!({
            "changeGroups": [{"id": "g1", "agentName": "Ada", "changes": {"delete": ["x.rs"]}}],
            "checkpoints": [{"id": "c1", "description": "before refactor"}],
            "isResolving": true,
            "currentUser": "sam"
        }))
        .unwrap();
        apply_snapshot(snapshot, &mut review, &mut changes);

        assert_eq!(review.checkpoints.len(), 1);
        assert_eq!(review.checkpoints[0].id, CheckpointId::from("c1"));
        assert!(review.is_resolving);
        assert_eq!(review.current_user.as_deref(), Some("sam"));
        assert_eq!(changes.groups.len(), 1);
        assert_eq!(changes.groups[0].id, ChangeGroupId::from("g1"));
    }

    #[test]
    fn test_empty_snapshot_clears_lists() {
        let mut review = ReviewState::new();
        review.is_resolving = true;
        let mut changes = ChangeSet::new();
        changes.groups.push(ChangeGroup {
            id: ChangeGroupId::from("g1"),
            agent_id: None,
            agent_name: String::new(),
            timestamp: conclave_core::now(),
            changes: Default::default(),
        });
        apply_snapshot(ReviewSnapshot::default(), &mut review, &mut changes);
        assert_eq!(review, ReviewState::default());
        assert!(changes.groups.is_empty());
    }
}
