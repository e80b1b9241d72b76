//! Change group and active flow reconciliation.

use super::agents::AgentRoster;
use super::flow::{self, ActiveFlow};
use conclave_core::{ChangeGroup, ChangeGroupId, FileChange, FileKind, Timestamp};
use conclave_events::{FlowExecution, FlowResolution};

/// In-place edit of a modify or create entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEdit {
    Content(String),
    Explanation(String),
}

impl FileEdit {
    fn apply(&self, file: &mut FileChange) {
        match self {
            FileEdit::Content(content) => file.content = Some(content.clone()),
            FileEdit::Explanation(explanation) => file.explanation = Some(explanation.clone()),
        }
    }
}

/// Proposed change groups plus the singleton active flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub groups: Vec<ChangeGroup>,
    pub active_flow: Option<ActiveFlow>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, id: &ChangeGroupId) -> Option<&ChangeGroup> {
        self.groups.iter().find(|g| &g.id == id)
    }

    fn group_mut(&mut self, id: &ChangeGroupId) -> Option<&mut ChangeGroup> {
        self.groups.iter_mut().find(|g| &g.id == id)
    }

    /// Record a flow execution: one change group and the new active flow.
    ///
    /// A redelivered execution for a known flow id replaces its group in place.
    pub fn record_execution(
        &mut self,
        exec: FlowExecution,
        roster: &AgentRoster,
        now: Timestamp,
    ) -> ChangeGroupId {
        let (group, active) = flow::build(exec, roster, now);
        let id = group.id.clone();
        match self.group_mut(&id) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        self.active_flow = Some(active);
        id
    }

    /// Apply the backend's verdict on a whole flow.
    ///
    /// The group is correlated by flow id: the one carried by the verdict, or
    /// the active flow's when the verdict carries none. The active flow is
    /// cleared only when the verdict is about it.
    pub fn resolve(&mut self, resolution: FlowResolution) -> Option<ChangeGroupId> {
        let active_id = self.active_flow.as_ref().map(|f| f.flow_id.clone());
        let target = resolution.flow_id.or_else(|| active_id.clone())?;
        self.remove_group(&target);
        if active_id.as_ref() == Some(&target) {
            self.active_flow = None;
        }
        Some(target)
    }

    /// Remove a group by id. Returns `false` if no group matched.
    pub fn remove_group(&mut self, id: &ChangeGroupId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| &g.id != id);
        self.groups.len() != before
    }

    /// Remove one path from the list `kind` selects. The group itself stays,
    /// even when this empties it.
    pub fn remove_file(&mut self, group_id: &ChangeGroupId, kind: FileKind, path: &str) -> bool {
        self.group_mut(group_id)
            .map(|group| group.changes.remove(kind, path))
            .unwrap_or(false)
    }

    /// Edit a modify or create entry in place. No-op when absent.
    ///
    /// When the group belongs to the active flow, the flow's copy is edited
    /// too, so a later verdict carries the edit.
    pub fn edit_file(&mut self, group_id: &ChangeGroupId, path: &str, edit: FileEdit) -> bool {
        let Some(file) = self
            .group_mut(group_id)
            .and_then(|group| group.changes.editable_mut(path))
        else {
            return false;
        };
        edit.apply(file);
        if let Some(active) = self
            .active_flow
            .as_mut()
            .filter(|flow| &flow.flow_id == group_id)
        {
            if let Some(file) = active.proposed_changes.editable_mut(path) {
                edit.apply(file);
            }
        }
        true
    }

    /// Overwrite the group list from an authoritative snapshot.
    pub fn replace_groups(&mut self, groups: Vec<ChangeGroup>) {
        self.groups = groups
            .into_iter()
            .map(|mut group| {
                group.changes = group.changes.deduplicated();
                group
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{AgentId, FileChange, ProposedChanges};
    use serde_json::Value;

    fn execution(flow_id: &str) -> FlowExecution {
        FlowExecution {
            flow_id: Some(ChangeGroupId::from(flow_id)),
            agent_id: Some(AgentId::from("a1")),
            proposed_changes: ProposedChanges {
                modify: vec![FileChange::new("a.rs").with_content("a")],
                create: vec![FileChange::new("b.rs").with_content("b")],
                delete: vec![FileChange::new("c.rs")],
            },
            result: Value::Null,
            state: Value::Null,
        }
    }

    fn recorded(flow_id: &str) -> ChangeSet {
        let mut set = ChangeSet::new();
        set.record_execution(execution(flow_id), &AgentRoster::new(), conclave_core::now());
        set
    }

    #[test]
    fn test_record_sets_active_flow() {
        let set = recorded("f1");
        assert_eq!(set.groups.len(), 1);
        assert_eq!(
            set.active_flow.as_ref().map(|f| f.flow_id.clone()),
            Some(ChangeGroupId::from("f1"))
        );
    }

    #[test]
    fn test_redelivered_execution_does_not_duplicate() {
        let mut set = recorded("f1");
        set.record_execution(execution("f1"), &AgentRoster::new(), conclave_core::now());
        assert_eq!(set.groups.len(), 1);
    }

    #[test]
    fn test_resolve_without_id_uses_active_flow() {
        let mut set = recorded("f1");
        assert_eq!(
            set.resolve(FlowResolution::default()),
            Some(ChangeGroupId::from("f1"))
        );
        assert!(set.groups.is_empty());
        assert!(set.active_flow.is_none());
    }

    #[test]
    fn test_resolve_other_flow_keeps_active() {
        let mut set = recorded("f1");
        set.record_execution(execution("f2"), &AgentRoster::new(), conclave_core::now());
        set.resolve(FlowResolution {
            flow_id: Some(ChangeGroupId::from("f1")),
        });
        assert_eq!(set.groups.len(), 1);
        assert_eq!(
            set.active_flow.as_ref().map(|f| f.flow_id.clone()),
            Some(ChangeGroupId::from("f2"))
        );
    }

    #[test]
    fn test_resolve_with_nothing_pending_is_noop() {
        let mut set = ChangeSet::new();
        assert_eq!(set.resolve(FlowResolution::default()), None);
    }

    #[test]
    fn test_remove_file_keeps_group() {
        let mut set = recorded("f1");
        let id = ChangeGroupId::from("f1");
        assert!(set.remove_file(&id, FileKind::Modify, "a.rs"));
        assert!(set.remove_file(&id, FileKind::Create, "b.rs"));
        assert!(set.remove_file(&id, FileKind::Delete, "c.rs"));
        let group = set.group(&id).unwrap();
        assert!(group.changes.is_empty());
    }

    #[test]
    fn test_remove_file_wrong_kind_is_noop() {
        let mut set = recorded("f1");
        assert!(!set.remove_file(&ChangeGroupId::from("f1"), FileKind::Delete, "a.rs"));
        assert_eq!(set.groups[0].changes.len(), 3);
    }

    #[test]
    fn test_edit_file_targets_modify_and_create_only() {
        let mut set = recorded("f1");
        let id = ChangeGroupId::from("f1");
        assert!(set.edit_file(&id, "a.rs", FileEdit::Content("edited".into())));
        assert!(set.edit_file(&id, "b.rs", FileEdit::Explanation("why".into())));
        assert!(!set.edit_file(&id, "c.rs", FileEdit::Content("nope".into())));
        assert!(!set.edit_file(&ChangeGroupId::from("ghost"), "a.rs", FileEdit::Content("x".into())));
        let group = set.group(&id).unwrap();
        assert_eq!(group.changes.modify[0].content.as_deref(), Some("edited"));
        assert_eq!(group.changes.create[0].explanation.as_deref(), Some("why"));
    }

    #[test]
    fn test_edit_file_keeps_active_flow_in_step() {
        let mut set = recorded("f1");
        set.record_execution(execution("f2"), &AgentRoster::new(), conclave_core::now());
        let f1 = ChangeGroupId::from("f1");
        let f2 = ChangeGroupId::from("f2");

        // f2 is active; editing f1 leaves the active copy alone.
        assert!(set.edit_file(&f1, "a.rs", FileEdit::Content("old flow".into())));
        let active = set.active_flow.clone().unwrap();
        assert_eq!(active.proposed_changes.modify[0].content.as_deref(), Some("a"));

        assert!(set.edit_file(&f2, "b.rs", FileEdit::Explanation("why".into())));
        let active = set.active_flow.as_ref().unwrap();
        assert_eq!(active.proposed_changes, set.group(&f2).unwrap().changes);
        assert_eq!(
            active.proposed_changes.create[0].explanation.as_deref(),
            Some("why")
        );
    }
}
