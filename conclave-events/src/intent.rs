//! Outbound intents.
//!
//! Every user action that must reach the backend is one `Intent` variant.
//! On the wire an intent is `{"type": <name>, "payload": {...}}`.

use crate::inbound::SystemKind;
use conclave_core::{
    AgentId, AnnotationId, AutonomyLevel, ChangeGroupId, CheckpointId, DecisionId, FileKind,
    ImplementationId, MessageId, ProposedChanges, TeamId, Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Intent {
    // ========================================================================
    // CONVERSATION
    // ========================================================================
    #[serde(rename = "SEND_MESSAGE", rename_all = "camelCase")]
    SendMessage {
        id: MessageId,
        content: String,
        timestamp: Timestamp,
    },

    /// Message addressed to one agent, one team, or the coordinator.
    #[serde(rename = "SEND_AGENT_MESSAGE", rename_all = "camelCase")]
    SendAgentMessage {
        id: MessageId,
        content: String,
        timestamp: Timestamp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<AgentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team_id: Option<TeamId>,
        #[serde(rename = "isVPMessage")]
        is_vp_message: bool,
        is_team_message: bool,
        direct: bool,
    },

    #[serde(rename = "PENDING_INSTRUCTION", rename_all = "camelCase")]
    PendingInstruction {
        instruction: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<AgentId>,
    },

    // ========================================================================
    // CHANGE REVIEW
    // ========================================================================
    #[serde(rename = "APPLY_CHANGES", rename_all = "camelCase")]
    ApplyChanges {
        flow_id: ChangeGroupId,
        changes: ProposedChanges,
    },

    #[serde(rename = "REJECT_CHANGES", rename_all = "camelCase")]
    RejectChanges {
        flow_id: ChangeGroupId,
        changes: ProposedChanges,
    },

    #[serde(rename = "acceptGroup", rename_all = "camelCase")]
    AcceptGroup { group_id: ChangeGroupId },

    #[serde(rename = "rejectGroup", rename_all = "camelCase")]
    RejectGroup { group_id: ChangeGroupId },

    #[serde(rename = "acceptFile", rename_all = "camelCase")]
    AcceptFile {
        group_id: ChangeGroupId,
        path: String,
        file_type: FileKind,
    },

    #[serde(rename = "rejectFile", rename_all = "camelCase")]
    RejectFile {
        group_id: ChangeGroupId,
        path: String,
        file_type: FileKind,
    },

    #[serde(rename = "selectImplementation", rename_all = "camelCase")]
    SelectImplementation { implementation_id: ImplementationId },

    #[serde(rename = "dismissImplementations")]
    DismissImplementations {},

    // ========================================================================
    // ANNOTATIONS AND CHECKPOINTS
    // ========================================================================
    #[serde(rename = "addAnnotation", rename_all = "camelCase")]
    AddAnnotation {
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        content: String,
    },

    #[serde(rename = "editAnnotation", rename_all = "camelCase")]
    EditAnnotation {
        annotation_id: AnnotationId,
        content: String,
    },

    #[serde(rename = "deleteAnnotation", rename_all = "camelCase")]
    DeleteAnnotation { annotation_id: AnnotationId },

    #[serde(rename = "replyToAnnotation", rename_all = "camelCase")]
    ReplyToAnnotation {
        annotation_id: AnnotationId,
        content: String,
    },

    #[serde(rename = "restoreCheckpoint", rename_all = "camelCase")]
    RestoreCheckpoint { checkpoint_id: CheckpointId },

    #[serde(rename = "deleteCheckpoint", rename_all = "camelCase")]
    DeleteCheckpoint { checkpoint_id: CheckpointId },

    #[serde(rename = "viewCheckpointDiff", rename_all = "camelCase")]
    ViewCheckpointDiff { checkpoint_id: CheckpointId },

    #[serde(rename = "createCheckpoint")]
    CreateCheckpoint { description: String },

    // ========================================================================
    // SYSTEM TOGGLES
    // ========================================================================
    #[serde(rename = "TOGGLE_PROJECT_MANAGEMENT")]
    ToggleProjectManagement { enabled: bool },

    #[serde(rename = "TOGGLE_TOOLS_SYSTEM")]
    ToggleToolsSystem { enabled: bool },

    #[serde(rename = "TOGGLE_LEARNING_SYSTEM")]
    ToggleLearningSystem { enabled: bool },

    // ========================================================================
    // PROJECT, TEAM AND AGENT MANAGEMENT
    // ========================================================================
    #[serde(rename = "INITIALIZE_PROJECT")]
    InitializeProject {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    #[serde(rename = "createTeam", rename_all = "camelCase")]
    CreateTeam {
        name: String,
        agent_ids: Vec<AgentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        objective: Option<String>,
    },

    #[serde(rename = "CREATE_AGENT", rename_all = "camelCase")]
    CreateAgent {
        name: String,
        role: String,
        #[serde(rename = "short_description", default)]
        short_description: String,
        #[serde(default)]
        tools: Vec<String>,
    },

    #[serde(rename = "CREATE_TASK", rename_all = "camelCase")]
    CreateTask {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<AgentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team_id: Option<TeamId>,
    },

    #[serde(rename = "CREATE_FLOW", rename_all = "camelCase")]
    CreateFlow {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        agent_ids: Vec<AgentId>,
    },

    #[serde(rename = "CREATE_TOOL")]
    CreateTool {
        name: String,
        #[serde(default)]
        description: String,
    },

    // ========================================================================
    // AUTONOMY
    // ========================================================================
    #[serde(rename = "UPDATE_AGENT_AUTONOMY", rename_all = "camelCase")]
    UpdateAgentAutonomy {
        agent_id: AgentId,
        level: AutonomyLevel,
        value: f64,
    },

    #[serde(rename = "ACCEPT_DECISION", rename_all = "camelCase")]
    AcceptDecision {
        agent_id: AgentId,
        decision_id: DecisionId,
    },

    #[serde(rename = "REJECT_DECISION", rename_all = "camelCase")]
    RejectDecision {
        agent_id: AgentId,
        decision_id: DecisionId,
    },
}

impl Intent {
    /// Toggle intent for one subsystem.
    pub fn toggle(system: SystemKind, enabled: bool) -> Self {
        match system {
            SystemKind::ProjectManagement => Intent::ToggleProjectManagement { enabled },
            SystemKind::ToolsSystem => Intent::ToggleToolsSystem { enabled },
            SystemKind::LearningSystem => Intent::ToggleLearningSystem { enabled },
        }
    }

    /// The subsystem and requested value, if this is a toggle intent.
    pub fn as_toggle(&self) -> Option<(SystemKind, bool)> {
        match self {
            Intent::ToggleProjectManagement { enabled } => {
                Some((SystemKind::ProjectManagement, *enabled))
            }
            Intent::ToggleToolsSystem { enabled } => Some((SystemKind::ToolsSystem, *enabled)),
            Intent::ToggleLearningSystem { enabled } => {
                Some((SystemKind::LearningSystem, *enabled))
            }
            _ => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(
            self,
            Intent::SendMessage { .. } | Intent::SendAgentMessage { .. }
        )
    }

    /// Wire `type` of this intent.
    pub fn wire_type(&self) -> &'static str {
        match self {
            Intent::SendMessage { .. } => "SEND_MESSAGE",
            Intent::SendAgentMessage { .. } => "SEND_AGENT_MESSAGE",
            Intent::PendingInstruction { .. } => "PENDING_INSTRUCTION",
            Intent::ApplyChanges { .. } => "APPLY_CHANGES",
            Intent::RejectChanges { .. } => "REJECT_CHANGES",
            Intent::AcceptGroup { .. } => "acceptGroup",
            Intent::RejectGroup { .. } => "rejectGroup",
            Intent::AcceptFile { .. } => "acceptFile",
            Intent::RejectFile { .. } => "rejectFile",
            Intent::SelectImplementation { .. } => "selectImplementation",
            Intent::DismissImplementations {} => "dismissImplementations",
            Intent::AddAnnotation { .. } => "addAnnotation",
            Intent::EditAnnotation { .. } => "editAnnotation",
            Intent::DeleteAnnotation { .. } => "deleteAnnotation",
            Intent::ReplyToAnnotation { .. } => "replyToAnnotation",
            Intent::RestoreCheckpoint { .. } => "restoreCheckpoint",
            Intent::DeleteCheckpoint { .. } => "deleteCheckpoint",
            Intent::ViewCheckpointDiff { .. } => "viewCheckpointDiff",
            Intent::CreateCheckpoint { .. } => "createCheckpoint",
            Intent::ToggleProjectManagement { .. } => "TOGGLE_PROJECT_MANAGEMENT",
            Intent::ToggleToolsSystem { .. } => "TOGGLE_TOOLS_SYSTEM",
            Intent::ToggleLearningSystem { .. } => "TOGGLE_LEARNING_SYSTEM",
            Intent::InitializeProject { .. } => "INITIALIZE_PROJECT",
            Intent::CreateTeam { .. } => "createTeam",
            Intent::CreateAgent { .. } => "CREATE_AGENT",
            Intent::CreateTask { .. } => "CREATE_TASK",
            Intent::CreateFlow { .. } => "CREATE_FLOW",
            Intent::CreateTool { .. } => "CREATE_TOOL",
            Intent::UpdateAgentAutonomy { .. } => "UPDATE_AGENT_AUTONOMY",
            Intent::AcceptDecision { .. } => "ACCEPT_DECISION",
            Intent::RejectDecision { .. } => "REJECT_DECISION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_is_type_and_payload() {
        let intent = Intent::AcceptFile {
            group_id: ChangeGroupId::from("g1"),
            path: "src/a.rs".into(),
            file_type: FileKind::Modify,
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "acceptFile",
                "payload": {"groupId": "g1", "path": "src/a.rs", "fileType": "modify"}
            })
        );
    }

    #[test]
    fn test_empty_payload_is_an_object() {
        let value = serde_json::to_value(Intent::DismissImplementations {}).unwrap();
        assert_eq!(value, json!({"type": "dismissImplementations", "payload": {}}));
    }

    #[test]
    fn test_agent_message_discriminators() {
        let intent = Intent::SendAgentMessage {
            id: MessageId::from("m1"),
            content: "status?".into(),
            timestamp: conclave_core::now(),
            agent_id: None,
            team_id: Some(TeamId::from("root")),
            is_vp_message: true,
            is_team_message: true,
            direct: false,
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["payload"]["isVPMessage"], json!(true));
        assert_eq!(value["payload"]["isTeamMessage"], json!(true));
        assert_eq!(value["payload"]["direct"], json!(false));
        assert!(value["payload"].get("agentId").is_none());
    }

    #[test]
    fn test_wire_type_matches_serialized_tag() {
        let intents = vec![
            Intent::toggle(SystemKind::ToolsSystem, true),
            Intent::CreateCheckpoint {
                description: "before".into(),
            },
            Intent::CreateAgent {
                name: "Ada".into(),
                role: "Engineer".into(),
                short_description: String::new(),
                tools: vec![],
            },
        ];
        for intent in intents {
            let value = serde_json::to_value(&intent).unwrap();
            assert_eq!(value["type"], json!(intent.wire_type()));
        }
    }

    #[test]
    fn test_as_toggle_inverts_toggle() {
        let intent = Intent::toggle(SystemKind::LearningSystem, false);
        assert_eq!(intent.as_toggle(), Some((SystemKind::LearningSystem, false)));
        assert!(Intent::DismissImplementations {}.as_toggle().is_none());
    }
}
