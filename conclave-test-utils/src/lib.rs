//! Conclave Test Utilities
//!
//! Shared test infrastructure for the Conclave workspace:
//! - Envelope fixtures as the host would deliver them
//! - Proptest generators for records and envelope streams

pub use conclave_core::{
    AgentId, AgentRecord, AutonomyLevel, AutonomyStateRecord, MessagePatch, MessageStatus, TeamId,
};
pub use conclave_events::{EnvelopeKind, InboundEvent};

use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// ENVELOPE FIXTURES
// ============================================================================

/// Serialize an envelope line `{"type": kind, "payload": payload}`.
pub fn envelope(kind: &str, payload: Value) -> String {
    json!({"type": kind, "payload": payload}).to_string()
}

/// Envelope with no payload slot at all.
pub fn bare_envelope(kind: &str) -> String {
    json!({"type": kind}).to_string()
}

pub fn agent_json(id: &str, role: &str) -> Value {
    json!({"id": id, "role": role})
}

pub fn agents_loaded(agents: &[Value]) -> String {
    json!({"type": "AGENTS_LOADED", "agents": agents}).to_string()
}

pub fn agent_created(id: &str, role: &str) -> String {
    envelope("AGENT_CREATED", agent_json(id, role))
}

pub fn message_update(id: &str, team_id: &str, status: &str, content: &str) -> String {
    envelope(
        "MESSAGE_UPDATE",
        json!({"id": id, "teamId": team_id, "status": status, "content": content, "sender": "a1"}),
    )
}

pub fn loading_indicator(sender: &str) -> String {
    envelope("LOADING_INDICATOR", json!({"sender": sender}))
}

/// `FLOW_EXECUTED` with the given file lists. Deletions are bare paths.
pub fn flow_executed(
    flow_id: &str,
    agent_id: &str,
    modify: &[&str],
    create: &[&str],
    delete: &[&str],
) -> String {
    let files = |paths: &[&str]| -> Vec<Value> {
        paths
            .iter()
            .map(|path| json!({"path": path, "content": format!("// {path}")}))
            .collect()
    };
    envelope(
        "FLOW_EXECUTED",
        json!({
            "agentId": agent_id,
            "proposedChanges": {
                "modify": files(modify),
                "create": files(create),
                "delete": delete,
            },
            "result": {"summary": "done"},
            "state": {"flowId": flow_id},
        }),
    )
}

pub fn error_envelope(message: &str) -> String {
    json!({"type": "error", "error": message}).to_string()
}

// ============================================================================
// GENERATORS
// ============================================================================

pub fn arb_autonomy_level() -> impl Strategy<Value = AutonomyLevel> {
    prop_oneof![
        Just(AutonomyLevel::Low),
        Just(AutonomyLevel::Medium),
        Just(AutonomyLevel::High),
        Just(AutonomyLevel::Full),
    ]
}

pub fn arb_message_status() -> impl Strategy<Value = MessageStatus> {
    prop_oneof![
        Just(MessageStatus::Loading),
        Just(MessageStatus::Error),
        Just(MessageStatus::Complete),
    ]
}

/// Agent records with every field independently present or absent.
pub fn arb_agent_record() -> impl Strategy<Value = AgentRecord> {
    (
        proptest::option::of("a[0-9]"),
        proptest::option::of("[A-Za-z]{1,10}"),
        proptest::option::of(prop_oneof![
            "[A-Za-z ]{1,16}",
            Just("VP of Engineering".to_string()),
        ]),
        proptest::option::of(arb_autonomy_level()),
        proptest::option::of(proptest::collection::vec("[a-z_]{1,8}", 0..3)),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, name, role, level, tools, learning)| AgentRecord {
            id: id.map(AgentId::from),
            name,
            role,
            autonomy_state: level.map(|level| AutonomyStateRecord {
                level: Some(level),
                ..AutonomyStateRecord::default()
            }),
            tools,
            learning_enabled: learning,
            ..AgentRecord::default()
        })
}

/// Message patches drawn from a small id space so upserts collide.
pub fn arb_message_patch() -> impl Strategy<Value = MessagePatch> {
    (
        "m[0-4]",
        proptest::option::of("[a-z ]{0,12}"),
        proptest::option::of("a[0-2]"),
        proptest::option::of("t[0-2]"),
        proptest::option::of(any::<bool>()),
        proptest::option::of(arb_message_status()),
    )
        .prop_map(|(id, content, target, team, vp, status)| MessagePatch {
            content,
            target_agent: target.map(AgentId::from),
            team_id: team.map(TeamId::from),
            is_vp_response: vp,
            status,
            ..MessagePatch::with_id(id)
        })
}

/// Well-formed envelope lines of the kinds that touch roster and messages,
/// plus the occasional unknown kind.
pub fn arb_envelope_line() -> impl Strategy<Value = String> {
    prop_oneof![
        ("a[0-4]", "[A-Za-z ]{1,12}").prop_map(|(id, role)| agent_created(&id, &role)),
        proptest::collection::vec(("a[0-4]", "[A-Za-z ]{1,12}"), 0..4).prop_map(|agents| {
            let agents: Vec<Value> = agents.iter().map(|(id, role)| agent_json(id, role)).collect();
            agents_loaded(&agents)
        }),
        ("m[0-4]", "t[0-2]", prop_oneof![Just("loading"), Just("complete")], "[a-z]{0,8}")
            .prop_map(|(id, team, status, content)| message_update(&id, &team, status, &content)),
        "a[0-4]".prop_map(|sender| loading_indicator(&sender)),
        Just(bare_envelope("HIDE_LOADING_INDICATOR")),
        "[a-z]{3,10}_x".prop_map(|kind| envelope(&kind, json!({}))),
    ]
}
