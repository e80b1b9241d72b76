//! Entity normalization.
//!
//! Every ingress point that introduces or replaces an agent or a message goes
//! through [`Normalizer`], so a stored entity is never partially populated.

use crate::{
    Agent, AgentRecord, AutonomyLevel, AutonomyState, AutonomyStateRecord, EntityIdType,
    Message, MessageId, MessagePatch, MessageType, NormalizeError, PerformanceMetrics,
    PerformanceMetricsRecord,
};
use serde_json::Value;

/// Default bound for autonomy history logs.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Sender name used for locally typed messages.
pub const USER_SENDER: &str = "user";

const SYSTEM_SENDER: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    history_limit: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Normalizer {
    pub fn new(history_limit: usize) -> Self {
        Self {
            history_limit: history_limit.max(1),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    // ========================================================================
    // AGENTS
    // ========================================================================

    /// Build a fully populated agent. Fails only when the record has no id.
    pub fn agent(&self, record: AgentRecord) -> Result<Agent, NormalizeError> {
        let id = record
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or(NormalizeError::MissingAgentId)?;
        let role = record.role.unwrap_or_default();
        let name = record
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                if role.trim().is_empty() {
                    id.to_string()
                } else {
                    role.clone()
                }
            });

        let mut autonomy_state = AutonomyState::default();
        if let Some(autonomy) = record.autonomy_state {
            self.merge_autonomy(&mut autonomy_state, autonomy);
        }
        let mut performance_metrics = PerformanceMetrics::default();
        if let Some(metrics) = record.performance_metrics {
            merge_metrics(&mut performance_metrics, metrics);
        }

        Ok(Agent {
            id,
            name,
            role,
            short_description: record.short_description.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            autonomy_state,
            performance_metrics,
            tools: record.tools.unwrap_or_default(),
            collaboration_patterns: record.collaboration_patterns.unwrap_or_default(),
            learning_enabled: record.learning_enabled.unwrap_or(true),
        })
    }

    /// Normalize a batch, separating records that could not be admitted.
    pub fn agents(
        &self,
        records: impl IntoIterator<Item = AgentRecord>,
    ) -> (Vec<Agent>, Vec<NormalizeError>) {
        let mut agents = Vec::new();
        let mut rejected = Vec::new();
        for record in records {
            match self.agent(record) {
                Ok(agent) => agents.push(agent),
                Err(err) => rejected.push(err),
            }
        }
        (agents, rejected)
    }

    /// Merge a partial record into a stored agent. The id is never changed.
    pub fn merge_agent(&self, agent: &mut Agent, patch: AgentRecord) {
        if let Some(name) = patch.name.filter(|name| !name.trim().is_empty()) {
            agent.name = name;
        }
        if let Some(role) = patch.role {
            agent.role = role;
        }
        if let Some(short_description) = patch.short_description {
            agent.short_description = short_description;
        }
        if let Some(status) = patch.status {
            agent.status = status;
        }
        if let Some(autonomy) = patch.autonomy_state {
            self.merge_autonomy(&mut agent.autonomy_state, autonomy);
        }
        if let Some(metrics) = patch.performance_metrics {
            merge_metrics(&mut agent.performance_metrics, metrics);
        }
        if let Some(tools) = patch.tools {
            agent.tools = tools;
        }
        if let Some(patterns) = patch.collaboration_patterns {
            agent.collaboration_patterns = patterns;
        }
        if let Some(learning_enabled) = patch.learning_enabled {
            agent.learning_enabled = learning_enabled;
        }
    }

    fn merge_autonomy(&self, state: &mut AutonomyState, record: AutonomyStateRecord) {
        match (record.level, record.value.filter(|v| v.is_finite())) {
            (Some(level), Some(value)) => {
                state.level = level;
                state.value = value.clamp(0.0, 1.0);
            }
            (Some(level), None) => {
                state.level = level;
                state.value = level.value();
            }
            (None, Some(value)) => {
                state.value = value.clamp(0.0, 1.0);
                state.level = AutonomyLevel::from_value(state.value);
            }
            (None, None) => {}
        }
        if let Some(criteria) = record.task_type_criteria {
            state.task_type_criteria.extend(criteria);
        }
        if let Some(history) = record.decision_history {
            state.decision_history = self.bounded(history);
        }
        if let Some(history) = record.feedback_history {
            state.feedback_history = self.bounded(history);
        }
    }

    /// Keep only the most recent `history_limit` entries.
    fn bounded(&self, mut history: Vec<Value>) -> Vec<Value> {
        if history.len() > self.history_limit {
            history.drain(..history.len() - self.history_limit);
        }
        history
    }

    // ========================================================================
    // MESSAGES
    // ========================================================================

    /// Build a fully populated message from a patch that matched nothing.
    pub fn message(&self, patch: MessagePatch) -> Message {
        let sender = patch
            .sender
            .filter(|sender| !sender.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_SENDER.to_string());
        let message_type = patch.message_type.unwrap_or(if sender == USER_SENDER {
            MessageType::User
        } else if sender == SYSTEM_SENDER {
            MessageType::System
        } else {
            MessageType::Agent
        });
        Message {
            id: patch.id.unwrap_or_else(MessageId::generate),
            sender,
            content: patch.content.unwrap_or_default(),
            timestamp: patch.timestamp.unwrap_or_else(crate::now),
            message_type,
            target_agent: patch.target_agent,
            team_id: patch.team_id,
            is_vp_response: patch.is_vp_response.unwrap_or(false),
            status: patch.status,
        }
    }
}

fn merge_metrics(metrics: &mut PerformanceMetrics, record: PerformanceMetricsRecord) {
    let rate = |value: f64| if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    if let Some(value) = record.success_rate {
        metrics.success_rate = rate(value);
    }
    if let Some(value) = record.efficiency_rate {
        metrics.efficiency_rate = rate(value);
    }
    if let Some(value) = record.collaboration_rate {
        metrics.collaboration_rate = rate(value);
    }
    if let Some(value) = record.learning_rate {
        metrics.learning_rate = rate(value);
    }
}
