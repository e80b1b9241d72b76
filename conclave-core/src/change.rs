//! Proposed file changes and change groups.

use crate::{AgentId, ChangeGroupId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Which of the three file lists a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Modify,
    Create,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FileChangeWire", rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl FileChange {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Deletions are often sent as bare paths; everything else as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum FileChangeWire {
    Path(String),
    #[serde(rename_all = "camelCase")]
    Full {
        #[serde(alias = "filePath", alias = "file")]
        path: String,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        original_content: Option<String>,
        #[serde(default)]
        explanation: Option<String>,
    },
}

impl From<FileChangeWire> for FileChange {
    fn from(wire: FileChangeWire) -> Self {
        match wire {
            FileChangeWire::Path(path) => FileChange::new(path),
            FileChangeWire::Full {
                path,
                content,
                original_content,
                explanation,
            } => FileChange {
                path,
                content,
                original_content,
                explanation,
            },
        }
    }
}

/// The three file lists of a proposal.
///
/// Invariant (after [`ProposedChanges::deduplicated`]): a path appears in at
/// most one list, at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposedChanges {
    pub modify: Vec<FileChange>,
    pub create: Vec<FileChange>,
    pub delete: Vec<FileChange>,
}

impl ProposedChanges {
    /// Drop repeated paths. The first occurrence wins, scanning
    /// modify, then create, then delete.
    pub fn deduplicated(self) -> Self {
        let mut seen = HashSet::new();
        let mut keep = |list: Vec<FileChange>| -> Vec<FileChange> {
            list.into_iter()
                .filter(|file| seen.insert(file.path.clone()))
                .collect()
        };
        let modify = keep(self.modify);
        let create = keep(self.create);
        let delete = keep(self.delete);
        Self {
            modify,
            create,
            delete,
        }
    }

    pub fn list(&self, kind: FileKind) -> &[FileChange] {
        match kind {
            FileKind::Modify => &self.modify,
            FileKind::Create => &self.create,
            FileKind::Delete => &self.delete,
        }
    }

    pub fn list_mut(&mut self, kind: FileKind) -> &mut Vec<FileChange> {
        match kind {
            FileKind::Modify => &mut self.modify,
            FileKind::Create => &mut self.create,
            FileKind::Delete => &mut self.delete,
        }
    }

    /// Remove `path` from the list selected by `kind`. Returns whether a
    /// file was removed.
    pub fn remove(&mut self, kind: FileKind, path: &str) -> bool {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|file| file.path != path);
        list.len() != before
    }

    /// Locate an editable file (modify list first, then create).
    pub fn editable_mut(&mut self, path: &str) -> Option<&mut FileChange> {
        self.modify
            .iter_mut()
            .chain(self.create.iter_mut())
            .find(|file| file.path == path)
    }

    pub fn kind_of(&self, path: &str) -> Option<FileKind> {
        [FileKind::Modify, FileKind::Create, FileKind::Delete]
            .into_iter()
            .find(|kind| self.list(*kind).iter().any(|file| file.path == path))
    }

    pub fn len(&self) -> usize {
        self.modify.len() + self.create.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batch of proposed changes attributed to one agent action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeGroup {
    pub id: ChangeGroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(default)]
    pub agent_name: String,
    #[serde(
        default = "crate::now",
        deserialize_with = "deserialize_group_timestamp"
    )]
    pub timestamp: Timestamp,
    #[serde(default, alias = "files", alias = "proposedChanges")]
    pub changes: ProposedChanges,
}

fn deserialize_group_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(crate::parse_timestamp(&value).unwrap_or_else(crate::now))
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_files() -> impl Strategy<Value = Vec<FileChange>> {
        proptest::collection::vec("[a-d]\\.rs", 0..6)
            .prop_map(|paths| paths.into_iter().map(FileChange::new).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_deduplicated_path_in_at_most_one_list(
            modify in arb_files(),
            create in arb_files(),
            delete in arb_files(),
        ) {
            let all: HashSet<String> = modify
                .iter()
                .chain(&create)
                .chain(&delete)
                .map(|f| f.path.clone())
                .collect();
            let changes = ProposedChanges { modify, create, delete }.deduplicated();

            let mut seen = HashSet::new();
            for file in changes.modify.iter().chain(&changes.create).chain(&changes.delete) {
                prop_assert!(seen.insert(file.path.clone()), "{} kept twice", file.path);
            }
            // Nothing is lost, only repeats.
            prop_assert_eq!(seen, all);
        }

        #[test]
        fn test_deduplicated_is_idempotent(
            modify in arb_files(),
            create in arb_files(),
            delete in arb_files(),
        ) {
            let once = ProposedChanges { modify, create, delete }.deduplicated();
            prop_assert_eq!(once.clone().deduplicated(), once);
        }
    }
}
