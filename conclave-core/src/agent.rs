//! Agent roster entities.
//!
//! `Agent` is the fully populated form that the panel stores. `AgentRecord`
//! is the loose wire form: every field optional, accepted from any ingress
//! point and turned into an `Agent` by [`Normalizer::agent`](crate::Normalizer::agent).

use crate::loose::{deserialize_lenient, deserialize_loose_bool, deserialize_loose_f64};
use crate::AgentId;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// STATUS AND AUTONOMY
// ============================================================================

/// Coarse agent activity status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Active,
    Busy,
    Offline,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Active => "active",
            AgentStatus::Busy => "busy",
            AgentStatus::Offline => "offline",
            AgentStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Discrete autonomy level. Each level has a canonical numeric value.
///
/// Reads any casing of the level name, or a numeric autonomy value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutonomyLevel {
    Low,
    #[default]
    Medium,
    High,
    Full,
}

impl<'de> Deserialize<'de> for AutonomyLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => AutonomyLevel::parse(&s).ok_or_else(|| {
                de::Error::unknown_variant(&s, &["LOW", "MEDIUM", "HIGH", "FULL"])
            }),
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(AutonomyLevel::from_value)
                .ok_or_else(|| de::Error::custom("autonomy value out of range")),
            other => Err(de::Error::invalid_type(
                de::Unexpected::Other(&other.to_string()),
                &"an autonomy level",
            )),
        }
    }
}

impl AutonomyLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(AutonomyLevel::Low),
            "medium" => Some(AutonomyLevel::Medium),
            "high" => Some(AutonomyLevel::High),
            "full" => Some(AutonomyLevel::Full),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            AutonomyLevel::Low => 0.25,
            AutonomyLevel::Medium => 0.5,
            AutonomyLevel::High => 0.75,
            AutonomyLevel::Full => 1.0,
        }
    }

    /// Nearest level for a numeric autonomy value.
    pub fn from_value(value: f64) -> Self {
        let value = value.clamp(0.0, 1.0);
        if value < 0.375 {
            AutonomyLevel::Low
        } else if value < 0.625 {
            AutonomyLevel::Medium
        } else if value < 0.875 {
            AutonomyLevel::High
        } else {
            AutonomyLevel::Full
        }
    }
}

/// Per-task-type rule deciding whether an agent may act without approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecisionCriteria {
    pub confidence_threshold: f64,
    pub requires_approval: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DecisionCriteria {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            requires_approval: true,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomyState {
    pub level: AutonomyLevel,
    pub value: f64,
    pub task_type_criteria: BTreeMap<String, DecisionCriteria>,
    /// Most recent decisions, oldest first. Bounded at ingress.
    pub decision_history: Vec<Value>,
    /// Most recent user feedback entries, oldest first. Bounded at ingress.
    pub feedback_history: Vec<Value>,
}

impl Default for AutonomyState {
    fn default() -> Self {
        Self {
            level: AutonomyLevel::Medium,
            value: AutonomyLevel::Medium.value(),
            task_type_criteria: BTreeMap::new(),
            decision_history: Vec::new(),
            feedback_history: Vec::new(),
        }
    }
}

/// Four rates, each clamped to `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub success_rate: f64,
    pub efficiency_rate: f64,
    pub collaboration_rate: f64,
    pub learning_rate: f64,
}

// ============================================================================
// AGENT
// ============================================================================

/// A fully populated roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    #[serde(rename = "short_description")]
    pub short_description: String,
    pub status: AgentStatus,
    pub autonomy_state: AutonomyState,
    pub performance_metrics: PerformanceMetrics,
    pub tools: Vec<String>,
    pub collaboration_patterns: Vec<String>,
    pub learning_enabled: bool,
}

// ============================================================================
// WIRE RECORDS
// ============================================================================

/// Partially specified autonomy state as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutonomyStateRecord {
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<AutonomyLevel>,
    #[serde(
        deserialize_with = "deserialize_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_type_criteria: Option<BTreeMap<String, DecisionCriteria>>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_history: Option<Vec<Value>>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback_history: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceMetricsRecord {
    #[serde(
        deserialize_with = "deserialize_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub success_rate: Option<f64>,
    #[serde(
        deserialize_with = "deserialize_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub efficiency_rate: Option<f64>,
    #[serde(
        deserialize_with = "deserialize_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub collaboration_rate: Option<f64>,
    #[serde(
        deserialize_with = "deserialize_loose_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub learning_rate: Option<f64>,
}

/// Loose agent record. Used both for new agents and for partial patches.
///
/// Only the id must be well formed. Any other field that cannot be read is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentRecord {
    #[serde(alias = "agentId", skip_serializing_if = "Option::is_none")]
    pub id: Option<AgentId>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(
        rename = "short_description",
        alias = "shortDescription",
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub short_description: Option<String>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<AgentStatus>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub autonomy_state: Option<AutonomyStateRecord>,
    #[serde(
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance_metrics: Option<PerformanceMetricsRecord>,
    #[serde(
        deserialize_with = "deserialize_names",
        skip_serializing_if = "Option::is_none"
    )]
    pub tools: Option<Vec<String>>,
    #[serde(
        deserialize_with = "deserialize_names",
        skip_serializing_if = "Option::is_none"
    )]
    pub collaboration_patterns: Option<Vec<String>>,
    #[serde(
        deserialize_with = "deserialize_loose_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub learning_enabled: Option<bool>,
}

impl AgentRecord {
    pub fn with_id(id: impl Into<AgentId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Accepts a list of plain strings or of objects carrying a `name` field.
fn deserialize_names<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(None);
    };
    let names = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(map) => map
                .get("name")
                .or_else(|| map.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect();
    Ok(Some(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_autonomy_level_round_trips_value() {
        for level in [
            AutonomyLevel::Low,
            AutonomyLevel::Medium,
            AutonomyLevel::High,
            AutonomyLevel::Full,
        ] {
            assert_eq!(AutonomyLevel::from_value(level.value()), level);
        }
    }

    #[test]
    fn test_autonomy_level_accepts_lowercase() {
        let level: AutonomyLevel = serde_json::from_value(json!("high")).unwrap();
        assert_eq!(level, AutonomyLevel::High);
        assert_eq!(serde_json::to_value(level).unwrap(), json!("HIGH"));
    }

    #[test]
    fn test_autonomy_level_reads_any_casing_and_values() {
        for raw in [json!("Medium"), json!("MEDIUM"), json!(" medium "), json!(0.5)] {
            let level: AutonomyLevel = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(level, AutonomyLevel::Medium, "{raw}");
        }
        assert!(serde_json::from_value::<AutonomyLevel>(json!("reckless")).is_err());
    }

    #[test]
    fn test_record_degrades_unreadable_fields() {
        let record: AgentRecord = serde_json::from_value(json!({
            "id": "a2",
            "role": "Engineer",
            "status": 3,
            "autonomyState": {"level": "reckless", "value": "0.8", "decisionHistory": "none"},
            "performanceMetrics": {"successRate": "0.9", "learningRate": "fast"},
            "tools": "git",
            "learningEnabled": "false"
        }))
        .unwrap();
        assert_eq!(record.id, Some(AgentId::from("a2")));
        assert_eq!(record.status, None);
        let autonomy = record.autonomy_state.unwrap();
        assert_eq!(autonomy.level, None);
        assert_eq!(autonomy.value, Some(0.8));
        assert_eq!(autonomy.decision_history, None);
        let metrics = record.performance_metrics.unwrap();
        assert_eq!(metrics.success_rate, Some(0.9));
        assert_eq!(metrics.learning_rate, None);
        assert_eq!(record.tools, None);
        assert_eq!(record.learning_enabled, Some(false));
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let status: AgentStatus = serde_json::from_value(json!("thinking")).unwrap();
        assert_eq!(status, AgentStatus::Unknown);
    }

    #[test]
    fn test_record_accepts_agent_id_alias_and_tool_objects() {
        let record: AgentRecord = serde_json::from_value(json!({
            "agentId": "a1",
            "tools": ["search", {"name": "git"}, 42],
            "shortDescription": "reviews code"
        }))
        .unwrap();
        assert_eq!(record.id, Some(AgentId::from("a1")));
        assert_eq!(record.tools, Some(vec!["search".to_string(), "git".to_string()]));
        assert_eq!(record.short_description.as_deref(), Some("reviews code"));
    }

    #[test]
    fn test_agent_wire_shape_is_camel_case() {
        let agent = Agent {
            id: AgentId::from("a1"),
            name: "Eng".into(),
            role: "Engineer".into(),
            short_description: String::new(),
            status: AgentStatus::Idle,
            autonomy_state: AutonomyState::default(),
            performance_metrics: PerformanceMetrics::default(),
            tools: vec![],
            collaboration_patterns: vec![],
            learning_enabled: true,
        };
        let value = serde_json::to_value(&agent).unwrap();
        assert!(value.get("autonomyState").is_some());
        assert!(value.get("performanceMetrics").is_some());
        assert!(value.get("short_description").is_some());
        assert_eq!(value["autonomyState"]["level"], json!("MEDIUM"));
    }
}
