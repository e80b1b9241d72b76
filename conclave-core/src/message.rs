//! Conversation messages.

use crate::identity::deserialize_loose_timestamp;
use crate::loose::{deserialize_lenient, deserialize_loose_bool};
use crate::{AgentId, MessageId, TeamId, Timestamp};
use serde::{Deserialize, Serialize};

/// Author class of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Agent,
    System,
}

/// Delivery status of a streamed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Loading,
    Error,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: String,
    pub content: String,
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(rename = "isVPResponse", default)]
    pub is_vp_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

/// Partial message as pushed by the backend.
///
/// Both new messages and streaming updates arrive in this shape; fields that
/// are `None` were absent from the envelope and must not overwrite stored data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_loose_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<Timestamp>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_type: Option<MessageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(
        rename = "isVPResponse",
        default,
        deserialize_with = "deserialize_loose_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_vp_response: Option<bool>,
    /// Unknown statuses (`"streaming"`, ...) read as absent.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<MessageStatus>,
}

impl MessagePatch {
    pub fn with_id(id: impl Into<MessageId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

impl Message {
    /// Shallow merge: every field present in `patch` overwrites the stored one.
    pub fn merge(&mut self, patch: MessagePatch) {
        if let Some(sender) = patch.sender {
            self.sender = sender;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(message_type) = patch.message_type {
            self.message_type = message_type;
        }
        if let Some(target_agent) = patch.target_agent {
            self.target_agent = Some(target_agent);
        }
        if let Some(team_id) = patch.team_id {
            self.team_id = Some(team_id);
        }
        if let Some(is_vp_response) = patch.is_vp_response {
            self.is_vp_response = is_vp_response;
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == Some(MessageStatus::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored() -> Message {
        Message {
            id: MessageId::from("m1"),
            sender: "a1".into(),
            content: "partial".into(),
            timestamp: crate::now(),
            message_type: MessageType::Agent,
            target_agent: None,
            team_id: Some(TeamId::from("root")),
            is_vp_response: false,
            status: Some(MessageStatus::Loading),
        }
    }

    #[test]
    fn test_merge_preserves_absent_fields() {
        let mut message = stored();
        let patch = MessagePatch {
            status: Some(MessageStatus::Complete),
            ..MessagePatch::with_id("m1")
        };
        message.merge(patch);
        assert_eq!(message.content, "partial");
        assert_eq!(message.team_id, Some(TeamId::from("root")));
        assert!(message.is_complete());
    }

    #[test]
    fn test_patch_parses_wire_names() {
        let patch: MessagePatch = serde_json::from_value(json!({
            "id": "m1",
            "type": "agent",
            "isVPResponse": true,
            "targetAgent": "a2",
            "timestamp": 1714557600000i64,
            "status": "loading"
        }))
        .unwrap();
        assert_eq!(patch.message_type, Some(MessageType::Agent));
        assert_eq!(patch.is_vp_response, Some(true));
        assert_eq!(patch.target_agent, Some(AgentId::from("a2")));
        assert!(patch.timestamp.is_some());
        assert_eq!(patch.status, Some(MessageStatus::Loading));
    }

    #[test]
    fn test_unknown_status_and_type_read_as_absent() {
        let patch: MessagePatch = serde_json::from_value(json!({
            "id": 1714557600000u64,
            "type": "bot",
            "status": "streaming",
            "content": "hi"
        }))
        .unwrap();
        assert_eq!(patch.id, Some(MessageId::from("1714557600000")));
        assert_eq!(patch.message_type, None);
        assert_eq!(patch.status, None);
        assert_eq!(patch.content.as_deref(), Some("hi"));
    }
}
