//! Inbound event union and the envelope decoder.
//!
//! The decoder is the only place that knows about legacy field aliasing.
//! Everything downstream sees one canonical payload per event kind.

use crate::envelope::{EnvelopeKind, RawEnvelope, Slot};
use crate::error::DecodeError;
use conclave_core::{
    AgentId, AgentRecord, ChangeGroupId, MessagePatch, ProjectState, ProposedChanges,
    ReviewSnapshot, TeamRecord,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One of the three system subsystems with a user-facing on/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemKind {
    ProjectManagement,
    ToolsSystem,
    LearningSystem,
}

/// Result of a backend flow execution awaiting a user decision.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowExecution {
    pub flow_id: Option<ChangeGroupId>,
    pub agent_id: Option<AgentId>,
    pub proposed_changes: ProposedChanges,
    pub result: Value,
    pub state: Value,
}

/// Backend verdict on the active flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowResolution {
    pub flow_id: Option<ChangeGroupId>,
}

/// Free-text error pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainErrorReport {
    pub message: String,
    /// Explicit classification, when the backend provides one.
    pub kind: Option<String>,
}

/// Closed union of everything the backend can push.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    FlowsUpdated { flows: Vec<Value> },
    AgentsLoaded { agents: Vec<AgentRecord> },
    /// `message` / `MESSAGE_RESPONSE`: a reply that also ends the local wait.
    MessageReceived { message: MessagePatch },
    MessageUpdated { message: MessagePatch },
    AnalysisComplete { content: String },
    TeamCreated { team: TeamRecord },
    ProjectInitialized {
        project: ProjectState,
        agents: Option<Vec<AgentRecord>>,
    },
    AgentCreated { agent: AgentRecord },
    TaskCreated { task: Value },
    Error(DomainErrorReport),
    AutonomyUpdated { patch: AgentRecord },
    LoadingIndicator { sender: Option<AgentId> },
    HideLoadingIndicator,
    FlowExecuted(Box<FlowExecution>),
    ChangesApplied(FlowResolution),
    ChangesRejected(FlowResolution),
    StateReplaced(Box<ReviewSnapshot>),
    SystemStatus { system: SystemKind, enabled: bool },
    /// Any `type` outside the recognized set. Accepted and ignored.
    Unrecognized { kind: String },
}

impl InboundEvent {
    /// Wire name of the event kind, for logging.
    pub fn kind_name(&self) -> &str {
        let kind = match self {
            InboundEvent::FlowsUpdated { .. } => EnvelopeKind::FlowUpdate,
            InboundEvent::AgentsLoaded { .. } => EnvelopeKind::AgentsLoaded,
            InboundEvent::MessageReceived { .. } => EnvelopeKind::Message,
            InboundEvent::MessageUpdated { .. } => EnvelopeKind::MessageUpdate,
            InboundEvent::AnalysisComplete { .. } => EnvelopeKind::AnalysisComplete,
            InboundEvent::TeamCreated { .. } => EnvelopeKind::TeamCreated,
            InboundEvent::ProjectInitialized { .. } => EnvelopeKind::ProjectInitialized,
            InboundEvent::AgentCreated { .. } => EnvelopeKind::AgentCreated,
            InboundEvent::TaskCreated { .. } => EnvelopeKind::TaskCreated,
            InboundEvent::Error(_) => EnvelopeKind::Error,
            InboundEvent::AutonomyUpdated { .. } => EnvelopeKind::AutonomyUpdated,
            InboundEvent::LoadingIndicator { .. } => EnvelopeKind::LoadingIndicator,
            InboundEvent::HideLoadingIndicator => EnvelopeKind::HideLoadingIndicator,
            InboundEvent::FlowExecuted(_) => EnvelopeKind::FlowExecuted,
            InboundEvent::ChangesApplied(_) => EnvelopeKind::ChangesApplied,
            InboundEvent::ChangesRejected(_) => EnvelopeKind::ChangesRejected,
            InboundEvent::StateReplaced(_) => EnvelopeKind::UpdateState,
            InboundEvent::SystemStatus { system, .. } => match system {
                SystemKind::ProjectManagement => EnvelopeKind::ProjectManagementStatus,
                SystemKind::ToolsSystem => EnvelopeKind::ToolsSystemStatus,
                SystemKind::LearningSystem => EnvelopeKind::LearningSystemStatus,
            },
            InboundEvent::Unrecognized { kind } => return kind,
        };
        kind.as_wire()
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Decode one envelope from its JSON text.
pub fn decode(text: &str) -> Result<InboundEvent, DecodeError> {
    let raw: RawEnvelope = serde_json::from_str(text)?;
    decode_envelope(raw)
}

pub fn decode_value(value: Value) -> Result<InboundEvent, DecodeError> {
    let raw: RawEnvelope = serde_json::from_value(value)?;
    decode_envelope(raw)
}

/// Classify a raw envelope and reconcile its aliased payload slots.
pub fn decode_envelope(raw: RawEnvelope) -> Result<InboundEvent, DecodeError> {
    let Some(kind) = EnvelopeKind::from_wire(&raw.kind) else {
        return Ok(InboundEvent::Unrecognized { kind: raw.kind });
    };
    let name = kind.as_wire();

    let event = match kind {
        EnvelopeKind::FlowUpdate => {
            let value = require(&raw, name, &[Slot::Flows, Slot::Flow, Slot::Payload, Slot::Content])?;
            let flows = match value {
                Value::Array(items) => items.clone(),
                Value::Object(map) => match map.get("flows") {
                    Some(Value::Array(items)) => items.clone(),
                    _ => vec![value.clone()],
                },
                other => vec![other.clone()],
            };
            InboundEvent::FlowsUpdated { flows }
        }
        EnvelopeKind::AgentsLoaded => {
            let value = require(&raw, name, &[Slot::Agents, Slot::Payload, Slot::Content])?;
            InboundEvent::AgentsLoaded {
                agents: agent_list(name, value),
            }
        }
        EnvelopeKind::Message => InboundEvent::MessageReceived {
            message: message_patch(&raw, name)?,
        },
        EnvelopeKind::MessageUpdate => InboundEvent::MessageUpdated {
            message: message_patch(&raw, name)?,
        },
        EnvelopeKind::AnalysisComplete => {
            let content = match raw.first(&[Slot::Content, Slot::Payload]) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Object(map)) => str_field(map, &["content", "analysis", "summary"])
                    .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            InboundEvent::AnalysisComplete { content }
        }
        EnvelopeKind::TeamCreated => {
            let mut team: TeamRecord = match raw.first(&[Slot::Payload, Slot::Content]) {
                Some(value) => parse(name, value)?,
                None => TeamRecord::default(),
            };
            if team.agents.is_empty() {
                if let Some(agents) = raw.first(&[Slot::Agents]) {
                    team.agents = agent_list(name, agents);
                }
            }
            InboundEvent::TeamCreated { team }
        }
        EnvelopeKind::ProjectInitialized => {
            let payload = raw.first(&[Slot::Payload, Slot::Content]);
            let project = match payload {
                Some(Value::Object(map)) => match map.get("projectState") {
                    Some(state) if !state.is_null() => parse(name, state)?,
                    _ => {
                        let mut rest = map.clone();
                        rest.remove("agents");
                        parse(name, &Value::Object(rest))?
                    }
                },
                _ => ProjectState::default(),
            };
            let agents = match payload
                .and_then(|value| value.get("agents"))
                .filter(|value| !value.is_null())
                .or_else(|| raw.first(&[Slot::Agents]))
            {
                Some(value) => Some(agent_list(name, value)),
                None => None,
            };
            InboundEvent::ProjectInitialized { project, agents }
        }
        EnvelopeKind::AgentCreated => {
            let value = require(&raw, name, &[Slot::Payload, Slot::Content])?;
            let record = match value.get("agent") {
                Some(agent) if agent.is_object() => agent,
                _ => value,
            };
            InboundEvent::AgentCreated {
                agent: parse(name, record)?,
            }
        }
        EnvelopeKind::TaskCreated => {
            let value = require(&raw, name, &[Slot::Payload, Slot::Content])?;
            InboundEvent::TaskCreated {
                task: value.clone(),
            }
        }
        EnvelopeKind::Error => InboundEvent::Error(error_report(&raw, name)?),
        EnvelopeKind::AutonomyUpdated => {
            let value = require(&raw, name, &[Slot::Payload, Slot::Content])?;
            let patch: AgentRecord = parse(name, value)?;
            if patch.id.is_none() {
                return Err(DecodeError::MissingField {
                    kind: name,
                    field: "agentId",
                });
            }
            InboundEvent::AutonomyUpdated { patch }
        }
        EnvelopeKind::LoadingIndicator => {
            let sender = match raw.first(&[Slot::Payload, Slot::Content]) {
                Some(Value::Object(map)) => str_field(map, &["sender", "agentId"]),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            };
            InboundEvent::LoadingIndicator {
                sender: sender.map(AgentId::from),
            }
        }
        EnvelopeKind::HideLoadingIndicator => InboundEvent::HideLoadingIndicator,
        EnvelopeKind::FlowExecuted => {
            let value = require(&raw, name, &[Slot::Payload, Slot::Flow, Slot::Content])?;
            InboundEvent::FlowExecuted(Box::new(flow_execution(name, value)?))
        }
        EnvelopeKind::ChangesApplied => InboundEvent::ChangesApplied(flow_resolution(&raw)),
        EnvelopeKind::ChangesRejected => InboundEvent::ChangesRejected(flow_resolution(&raw)),
        EnvelopeKind::UpdateState => {
            let value = require(&raw, name, &[Slot::Payload, Slot::Content])?;
            InboundEvent::StateReplaced(Box::new(parse(name, value)?))
        }
        EnvelopeKind::ProjectManagementStatus => system_status(&raw, name, SystemKind::ProjectManagement)?,
        EnvelopeKind::ToolsSystemStatus => system_status(&raw, name, SystemKind::ToolsSystem)?,
        EnvelopeKind::LearningSystemStatus => system_status(&raw, name, SystemKind::LearningSystem)?,
    };
    Ok(event)
}

// ============================================================================
// PAYLOAD HELPERS
// ============================================================================

fn require<'a>(
    raw: &'a RawEnvelope,
    kind: &'static str,
    slots: &[Slot],
) -> Result<&'a Value, DecodeError> {
    raw.first(slots).ok_or(DecodeError::MissingPayload { kind })
}

fn parse<T: DeserializeOwned>(kind: &'static str, value: &Value) -> Result<T, DecodeError> {
    T::deserialize(value).map_err(|source| DecodeError::InvalidPayload { kind, source })
}

fn str_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| value.as_str().map(str::to_string))
}

/// Read a roster one record at a time. A record that cannot be read is
/// dropped on its own; the rest of the list is kept.
fn agent_list(kind: &'static str, value: &Value) -> Vec<AgentRecord> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("agents") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(agents) => std::slice::from_ref(agents),
            None => std::slice::from_ref(value),
        },
        other => std::slice::from_ref(other),
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match AgentRecord::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(kind, index, error = %e, "Dropping unreadable agent record");
                None
            }
        })
        .collect()
}

fn message_patch(raw: &RawEnvelope, kind: &'static str) -> Result<MessagePatch, DecodeError> {
    match require(raw, kind, &[Slot::Payload, Slot::Content])? {
        Value::String(content) => Ok(MessagePatch {
            content: Some(content.clone()),
            ..MessagePatch::default()
        }),
        value => {
            let record = match value.get("message") {
                Some(inner) if inner.is_object() => inner,
                _ => value,
            };
            parse(kind, record)
        }
    }
}

fn error_report(raw: &RawEnvelope, kind: &'static str) -> Result<DomainErrorReport, DecodeError> {
    let payload = raw.first(&[Slot::Payload]);
    let explicit_kind = match payload {
        Some(Value::Object(map)) => str_field(map, &["kind", "errorKind"]),
        _ => None,
    };
    let message = [raw.first(&[Slot::Error]), payload, raw.first(&[Slot::Content])]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => str_field(map, &["message", "error"]),
            _ => None,
        })
        .ok_or(DecodeError::MissingField {
            kind,
            field: "error",
        })?;
    Ok(DomainErrorReport {
        message,
        kind: explicit_kind,
    })
}

fn flow_execution(kind: &'static str, value: &Value) -> Result<FlowExecution, DecodeError> {
    let field = |key: &str| value.get(key).filter(|v| !v.is_null());
    let proposed_changes: ProposedChanges = match field("proposedChanges").or_else(|| field("changes")) {
        Some(changes) => parse(kind, changes)?,
        None => ProposedChanges::default(),
    };
    let result = field("result").cloned().unwrap_or(Value::Null);
    let state = field("state").cloned().unwrap_or(Value::Null);

    let as_id = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);
    let flow_id = ["flowId", "id"]
        .iter()
        .find_map(|key| state.get(*key).and_then(as_id))
        .or_else(|| field("flowId").and_then(as_id))
        .map(ChangeGroupId::from);
    let agent_id = field("agentId")
        .and_then(as_id)
        .or_else(|| state.get("agentId").and_then(as_id))
        .or_else(|| result.get("agentId").and_then(as_id))
        .map(AgentId::from);

    Ok(FlowExecution {
        flow_id,
        agent_id,
        proposed_changes: proposed_changes.deduplicated(),
        result,
        state,
    })
}

fn flow_resolution(raw: &RawEnvelope) -> FlowResolution {
    let flow_id = match raw.first(&[Slot::Payload, Slot::Content]) {
        Some(Value::Object(map)) => str_field(map, &["flowId", "id"]),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    FlowResolution {
        flow_id: flow_id.filter(|id| !id.is_empty()).map(ChangeGroupId::from),
    }
}

fn system_status(
    raw: &RawEnvelope,
    kind: &'static str,
    system: SystemKind,
) -> Result<InboundEvent, DecodeError> {
    let value = require(raw, kind, &[Slot::Payload, Slot::Content])?;
    let enabled = match value {
        Value::Bool(b) => Some(*b),
        Value::Object(map) => ["enabled", "active", "isEnabled"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_bool))
            .or_else(|| match map.get("status").and_then(Value::as_str) {
                Some("enabled") | Some("active") | Some("on") => Some(true),
                Some("disabled") | Some("inactive") | Some("off") => Some(false),
                _ => None,
            }),
        _ => None,
    };
    let enabled = enabled.ok_or(DecodeError::MissingField {
        kind,
        field: "enabled",
    })?;
    Ok(InboundEvent::SystemStatus { system, enabled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{FileKind, MessageStatus, TeamId};
    use serde_json::json;

    fn decode_json(value: Value) -> Result<InboundEvent, DecodeError> {
        decode_value(value)
    }

    #[test]
    fn test_unknown_type_is_ignored_not_rejected() {
        let event = decode_json(json!({"type": "SOMETHING_NEW", "payload": {"x": 1}})).unwrap();
        assert_eq!(
            event,
            InboundEvent::Unrecognized {
                kind: "SOMETHING_NEW".to_string()
            }
        );
    }

    #[test]
    fn test_missing_type_is_malformed() {
        assert!(matches!(
            decode(r#"{"payload": {}}"#),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(decode("not json"), Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn test_agents_read_from_any_alias_slot() {
        let from_agents = decode_json(json!({"type": "agents-update", "agents": [{"id": "a1"}]})).unwrap();
        let from_payload = decode_json(json!({"type": "AGENTS_LOADED", "payload": [{"id": "a1"}]})).unwrap();
        let from_nested = decode_json(json!({"type": "AGENTS_LOADED", "payload": {"agents": [{"id": "a1"}]}})).unwrap();
        assert_eq!(from_agents, from_payload);
        assert_eq!(from_payload, from_nested);
    }

    #[test]
    fn test_unreadable_agent_record_drops_alone() {
        let event = decode_json(json!({
            "type": "AGENTS_LOADED",
            "agents": [
                {"id": "vp", "role": "VP of Engineering"},
                {"id": "a2", "role": "Engineer", "autonomyState": {"level": "Medium"}},
                {"id": {"nested": true}},
                "not an agent"
            ]
        }))
        .unwrap();
        let InboundEvent::AgentsLoaded { agents } = event else {
            panic!("expected AgentsLoaded");
        };
        let ids: Vec<_> = agents.iter().filter_map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec![AgentId::from("vp"), AgentId::from("a2")]);
        let level = agents[1].autonomy_state.as_ref().and_then(|s| s.level);
        assert_eq!(level, Some(conclave_core::AutonomyLevel::Medium));
    }

    #[test]
    fn test_numeric_message_id_is_accepted() {
        let event = decode_json(json!({
            "type": "MESSAGE_UPDATE",
            "payload": {"id": 1714557600000u64, "sender": "a1", "content": "hi", "status": "complete"}
        }))
        .unwrap();
        let InboundEvent::MessageUpdated { message } = event else {
            panic!("expected MessageUpdated");
        };
        assert_eq!(message.id, Some(conclave_core::MessageId::from("1714557600000")));
        assert_eq!(message.status, Some(MessageStatus::Complete));
    }

    #[test]
    fn test_unknown_message_status_keeps_the_update() {
        let event = decode_json(json!({
            "type": "MESSAGE_UPDATE",
            "payload": {"id": "m1", "teamId": "root", "content": "par", "status": "streaming"}
        }))
        .unwrap();
        let InboundEvent::MessageUpdated { message } = event else {
            panic!("expected MessageUpdated");
        };
        assert_eq!(message.content.as_deref(), Some("par"));
        assert_eq!(message.status, None);
    }

    #[test]
    fn test_flows_read_from_flow_or_flows() {
        let single = decode_json(json!({"type": "flow-update", "flow": {"id": "f1"}})).unwrap();
        assert_eq!(single, InboundEvent::FlowsUpdated { flows: vec![json!({"id": "f1"})] });
        let many = decode_json(json!({"type": "flow-update", "flows": [{"id": "f1"}, {"id": "f2"}]})).unwrap();
        assert!(matches!(many, InboundEvent::FlowsUpdated { flows } if flows.len() == 2));
    }

    #[test]
    fn test_message_update_payload() {
        let event = decode_json(json!({
            "type": "MESSAGE_UPDATE",
            "payload": {"id": "m1", "teamId": "root", "status": "loading"}
        }))
        .unwrap();
        let InboundEvent::MessageUpdated { message } = event else {
            panic!("expected MessageUpdated");
        };
        assert_eq!(message.team_id, Some(TeamId::from("root")));
        assert_eq!(message.status, Some(MessageStatus::Loading));
    }

    #[test]
    fn test_message_with_string_content() {
        let event = decode_json(json!({"type": "message", "content": "hello"})).unwrap();
        let InboundEvent::MessageReceived { message } = event else {
            panic!("expected MessageReceived");
        };
        assert_eq!(message.content.as_deref(), Some("hello"));
        assert!(message.id.is_none());
    }

    #[test]
    fn test_message_without_payload_is_malformed() {
        assert!(matches!(
            decode_json(json!({"type": "MESSAGE_UPDATE"})),
            Err(DecodeError::MissingPayload { .. })
        ));
    }

    #[test]
    fn test_error_envelope_prefers_error_field() {
        let event = decode_json(json!({
            "type": "error",
            "error": "Agent not found",
            "payload": {"kind": "team"}
        }))
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::Error(DomainErrorReport {
                message: "Agent not found".to_string(),
                kind: Some("team".to_string()),
            })
        );
    }

    #[test]
    fn test_error_envelope_falls_back_to_payload_message() {
        let event = decode_json(json!({"type": "error", "payload": {"message": "Task failed"}})).unwrap();
        assert!(matches!(event, InboundEvent::Error(report) if report.message == "Task failed"));
    }

    #[test]
    fn test_autonomy_update_requires_agent_id() {
        assert!(matches!(
            decode_json(json!({"type": "AUTONOMY_UPDATED", "payload": {"learningEnabled": false}})),
            Err(DecodeError::MissingField { field: "agentId", .. })
        ));
    }

    #[test]
    fn test_flow_executed_extracts_ids_and_partitions() {
        let event = decode_json(json!({
            "type": "FLOW_EXECUTED",
            "payload": {
                "agentId": "a1",
                "proposedChanges": {"modify": [{"path": "a.rs", "content": "new"}], "delete": ["a.rs", "b.rs"]},
                "result": {"summary": "ok"},
                "state": {"flowId": "flow-42"}
            }
        }))
        .unwrap();
        let InboundEvent::FlowExecuted(exec) = event else {
            panic!("expected FlowExecuted");
        };
        assert_eq!(exec.flow_id, Some(ChangeGroupId::from("flow-42")));
        assert_eq!(exec.agent_id, Some(AgentId::from("a1")));
        assert_eq!(exec.proposed_changes.kind_of("a.rs"), Some(FileKind::Modify));
        assert_eq!(exec.proposed_changes.delete.len(), 1);
        assert!(exec.proposed_changes.create.is_empty());
    }

    #[test]
    fn test_changes_applied_without_payload() {
        let event = decode_json(json!({"type": "CHANGES_APPLIED"})).unwrap();
        assert_eq!(event, InboundEvent::ChangesApplied(FlowResolution::default()));
    }

    #[test]
    fn test_status_accepts_bool_or_object() {
        let a = decode_json(json!({"type": "TOOLS_SYSTEM_STATUS", "payload": true})).unwrap();
        let b = decode_json(json!({"type": "TOOLS_SYSTEM_STATUS", "payload": {"enabled": true}})).unwrap();
        assert_eq!(a, b);
        assert!(decode_json(json!({"type": "TOOLS_SYSTEM_STATUS", "payload": {}})).is_err());
    }

    #[test]
    fn test_project_initialized_splits_agents_from_project() {
        let event = decode_json(json!({
            "type": "PROJECT_INITIALIZED",
            "payload": {"name": "demo", "agents": [{"id": "a1", "role": "VP of Engineering"}]}
        }))
        .unwrap();
        let InboundEvent::ProjectInitialized { project, agents } = event else {
            panic!("expected ProjectInitialized");
        };
        assert_eq!(project.name.as_deref(), Some("demo"));
        assert!(!project.details.contains_key("agents"));
        assert_eq!(agents.map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_kind_name_matches_wire() {
        let event = decode_json(json!({"type": "HIDE_LOADING_INDICATOR"})).unwrap();
        assert_eq!(event.kind_name(), "HIDE_LOADING_INDICATOR");
        let ignored = decode_json(json!({"type": "custom"})).unwrap();
        assert_eq!(ignored.kind_name(), "custom");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-zA-Z]{1,10}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    fn arb_known_kind() -> impl Strategy<Value = EnvelopeKind> {
        proptest::sample::select(EnvelopeKind::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_unknown_kinds_never_fail(kind in "[a-z]{1,6}-[a-z]{1,6}x", payload in arb_json()) {
            prop_assume!(EnvelopeKind::from_wire(&kind).is_none());
            let event = decode_value(serde_json::json!({"type": kind.clone(), "payload": payload}));
            prop_assert_eq!(event.ok(), Some(InboundEvent::Unrecognized { kind }));
        }

        #[test]
        fn test_known_kinds_decode_or_error_without_panic(
            kind in arb_known_kind(),
            payload in arb_json(),
            content in arb_json(),
        ) {
            let result = decode_value(serde_json::json!({
                "type": kind.as_wire(),
                "payload": payload,
                "content": content,
            }));
            if let Ok(event) = result {
                prop_assert_eq!(event.kind_name(), kind.as_wire());
            }
        }
    }
}
