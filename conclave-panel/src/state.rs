//! Panel state and the reducer.
//!
//! `PanelState` owns every materialized view. It changes only through
//! [`PanelState::reduce`], which handles one [`Action`] to completion and
//! returns the intents the caller must dispatch.

use crate::actions::{Action, MessageTarget, UiAction};
use crate::config::ReconcileSettings;
use crate::persistence::PersistedSnapshot;
use crate::reconcile::{
    apply_snapshot, AgentRoster, ChangeSet, Confirmation, ErrorSlots, FileEdit, MessageBuckets,
    ReviewState, SystemToggles,
};
use conclave_core::{
    Agent, AgentId, AgentRecord, EntityIdType, MessageId, MessagePatch, MessageType, Normalizer,
    ProjectState, Team, TeamId, TeamRecord, USER_SENDER,
};
use conclave_events::{InboundEvent, Intent};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub project: ProjectState,
    pub roster: AgentRoster,
    pub messages: MessageBuckets,
    pub changes: ChangeSet,
    pub review: ReviewState,
    pub toggles: SystemToggles,
    pub errors: ErrorSlots,
    /// Opaque flow definitions from the last `flow-update`.
    pub flows: Vec<Value>,
    /// Opaque task records, in announcement order.
    pub tasks: Vec<Value>,
    pub teams: Vec<Team>,
    /// A locally sent message is waiting for its reply.
    pub loading: bool,
    /// Agent the backend reports as working.
    pub loading_agent: Option<AgentId>,
}

/// Reduce one action into `state`. See [`PanelState::reduce`].
pub fn reduce(state: &mut PanelState, action: Action, settings: &ReconcileSettings) -> Vec<Intent> {
    state.reduce(action, settings)
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the persisted views from a snapshot. Everything else starts empty.
    pub fn from_snapshot(snapshot: PersistedSnapshot, settings: &ReconcileSettings) -> Self {
        let mut state = Self::new();
        state.restore(snapshot, settings);
        state
    }

    pub fn restore(&mut self, snapshot: PersistedSnapshot, settings: &ReconcileSettings) {
        let PersistedSnapshot {
            project_state,
            agents,
            messages,
        } = snapshot;
        self.project = project_state;
        self.roster.replace(agents, settings);
        self.messages = messages;
    }

    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            project_state: self.project.clone(),
            agents: self.roster.agents.clone(),
            messages: self.messages.clone(),
        }
    }

    /// Apply one action and return the intents to send, in order.
    ///
    /// Never fails: input that cannot be applied leaves the state unchanged.
    pub fn reduce(&mut self, action: Action, settings: &ReconcileSettings) -> Vec<Intent> {
        match action {
            Action::Inbound(event) => {
                self.apply_inbound(event, settings);
                Vec::new()
            }
            Action::Ui(action) => self.apply_ui(action, settings),
            Action::DispatchFailed(intent) => {
                self.apply_dispatch_failure(*intent);
                Vec::new()
            }
        }
    }

    // ========================================================================
    // INBOUND
    // ========================================================================

    fn apply_inbound(&mut self, event: InboundEvent, settings: &ReconcileSettings) {
        let normalizer = settings.normalizer();
        match event {
            InboundEvent::FlowsUpdated { flows } => {
                self.flows = flows;
            }
            InboundEvent::AgentsLoaded { agents } => {
                let agents = normalize_all(&normalizer, agents);
                self.roster.replace(agents, settings);
            }
            InboundEvent::MessageReceived { message } => {
                self.upsert_message(message, settings);
                self.loading = false;
            }
            InboundEvent::MessageUpdated { message } => {
                self.upsert_message(message, settings);
            }
            InboundEvent::AnalysisComplete { content } => {
                self.messages.push_system(content, &normalizer);
                self.loading = false;
            }
            InboundEvent::TeamCreated { team } => {
                self.apply_team(team, &normalizer, settings);
            }
            InboundEvent::ProjectInitialized { project, agents } => {
                self.project = ProjectState {
                    initialized: true,
                    ..project
                };
                if let Some(agents) = agents {
                    let agents = normalize_all(&normalizer, agents);
                    self.roster.replace(agents, settings);
                }
            }
            InboundEvent::AgentCreated { agent } => match normalizer.agent(agent) {
                Ok(agent) => self.roster.append(agent),
                Err(e) => tracing::debug!(error = %e, "Dropping created agent"),
            },
            InboundEvent::TaskCreated { task } => {
                let notice = format!("Task created: {}", task_title(&task));
                self.tasks.push(task);
                self.messages.push_system(notice, &normalizer);
            }
            InboundEvent::Error(report) => {
                let message = report.message.clone();
                match self.errors.record(report) {
                    Some(slot) => tracing::debug!(?slot, %message, "Domain error surfaced"),
                    None => tracing::debug!(%message, "Domain error matched no slot"),
                }
            }
            InboundEvent::AutonomyUpdated { patch } => {
                let agent_id = patch.id.clone();
                if !self.roster.patch(patch, &normalizer) {
                    tracing::debug!(?agent_id, "Autonomy update for unknown agent");
                }
            }
            InboundEvent::LoadingIndicator { sender } => {
                if sender.is_some() {
                    self.loading_agent = sender;
                }
            }
            InboundEvent::HideLoadingIndicator => {
                self.loading_agent = None;
            }
            InboundEvent::FlowExecuted(exec) => {
                let flow_id =
                    self.changes
                        .record_execution(*exec, &self.roster, conclave_core::now());
                tracing::debug!(%flow_id, "Flow awaiting decision");
            }
            InboundEvent::ChangesApplied(resolution) | InboundEvent::ChangesRejected(resolution) => {
                if self.changes.resolve(resolution).is_none() {
                    tracing::debug!("Flow verdict with no flow to resolve");
                }
            }
            InboundEvent::StateReplaced(snapshot) => {
                apply_snapshot(*snapshot, &mut self.review, &mut self.changes);
            }
            InboundEvent::SystemStatus { system, enabled } => {
                if self.toggles.confirm(system, enabled) == Confirmation::Overridden {
                    tracing::warn!(?system, enabled, "Backend overrode pending toggle");
                }
            }
            InboundEvent::Unrecognized { kind } => {
                tracing::trace!(%kind, "Ignoring unrecognized envelope");
            }
        }
    }

    fn upsert_message(&mut self, patch: MessagePatch, settings: &ReconcileSettings) {
        let upserted = self.messages.upsert(patch, settings);
        if upserted.complete {
            self.loading_agent = None;
        }
    }

    fn apply_team(&mut self, team: TeamRecord, normalizer: &Normalizer, settings: &ReconcileSettings) {
        let TeamRecord { id, name, agents } = team;
        let agents = normalize_all(normalizer, agents);
        let agent_ids: Vec<AgentId> = agents.iter().map(|a| a.id.clone()).collect();
        for agent in agents {
            self.roster.upsert(agent);
        }
        self.roster.promote_coordinator(settings);

        let id = id.unwrap_or_else(TeamId::generate);
        let name = name.unwrap_or_else(|| id.to_string());
        let team = Team { id, name, agent_ids };
        match self.teams.iter_mut().find(|t| t.id == team.id) {
            Some(existing) => *existing = team,
            None => self.teams.push(team),
        }
    }

    // ========================================================================
    // UI
    // ========================================================================

    fn apply_ui(&mut self, action: UiAction, settings: &ReconcileSettings) -> Vec<Intent> {
        match action {
            UiAction::SendMessage { content, target } => {
                if content.trim().is_empty() {
                    tracing::debug!("Ignoring empty message");
                    return Vec::new();
                }
                let intent = self.message_intent(content, target, settings);
                self.submit(intent, settings)
            }
            UiAction::ApplyChanges => self.flow_verdict(true),
            UiAction::RejectChanges => self.flow_verdict(false),
            UiAction::SetSystem { system, enabled } => {
                self.submit(Intent::toggle(system, enabled), settings)
            }
            UiAction::ModifyFileContent {
                group_id,
                path,
                content,
            } => {
                if !self.changes.edit_file(&group_id, &path, FileEdit::Content(content)) {
                    tracing::debug!(%group_id, %path, "No editable file to modify");
                }
                Vec::new()
            }
            UiAction::RequestExplanation {
                group_id,
                path,
                explanation,
            } => {
                if !self
                    .changes
                    .edit_file(&group_id, &path, FileEdit::Explanation(explanation))
                {
                    tracing::debug!(%group_id, %path, "No editable file to explain");
                }
                Vec::new()
            }
            UiAction::DismissError { slot } => {
                self.errors.dismiss(slot);
                Vec::new()
            }
            UiAction::Submit { intent } => self.submit(intent, settings),
        }
    }

    /// Build the send intent for a composed message with a fresh id.
    fn message_intent(
        &self,
        content: String,
        target: MessageTarget,
        settings: &ReconcileSettings,
    ) -> Intent {
        let id = MessageId::generate();
        let timestamp = conclave_core::now();
        match target {
            MessageTarget::General => Intent::SendMessage {
                id,
                content,
                timestamp,
            },
            MessageTarget::Agent(agent_id) => Intent::SendAgentMessage {
                id,
                content,
                timestamp,
                agent_id: Some(agent_id),
                team_id: None,
                is_vp_message: false,
                is_team_message: false,
                direct: true,
            },
            MessageTarget::Team(team_id) => Intent::SendAgentMessage {
                id,
                content,
                timestamp,
                agent_id: None,
                team_id: Some(team_id),
                is_vp_message: false,
                is_team_message: true,
                direct: false,
            },
            MessageTarget::Coordinator => Intent::SendAgentMessage {
                id,
                content,
                timestamp,
                agent_id: self.roster.vp_agent.clone(),
                team_id: Some(settings.coordinator_team_id.clone()),
                is_vp_message: true,
                is_team_message: true,
                direct: false,
            },
        }
    }

    fn flow_verdict(&self, accept: bool) -> Vec<Intent> {
        let Some(active) = &self.changes.active_flow else {
            tracing::debug!(accept, "No active flow");
            return Vec::new();
        };
        let flow_id = active.flow_id.clone();
        let changes = active.proposed_changes.clone();
        let intent = if accept {
            Intent::ApplyChanges { flow_id, changes }
        } else {
            Intent::RejectChanges { flow_id, changes }
        };
        vec![intent]
    }

    /// Apply an outbound intent's optimistic local effect and pass it on.
    fn submit(&mut self, intent: Intent, settings: &ReconcileSettings) -> Vec<Intent> {
        match &intent {
            Intent::SendMessage { .. } | Intent::SendAgentMessage { .. } => {
                if let Some(patch) = local_message(&intent, settings) {
                    self.messages.upsert(patch, settings);
                }
                self.loading = true;
            }
            Intent::AcceptGroup { group_id } | Intent::RejectGroup { group_id } => {
                self.changes.remove_group(group_id);
            }
            Intent::AcceptFile {
                group_id,
                path,
                file_type,
            }
            | Intent::RejectFile {
                group_id,
                path,
                file_type,
            } => {
                self.changes.remove_file(group_id, *file_type, path);
            }
            _ => {
                if let Some((system, enabled)) = intent.as_toggle() {
                    self.toggles.request(system, enabled);
                }
            }
        }
        vec![intent]
    }

    // ========================================================================
    // DISPATCH FAILURES
    // ========================================================================

    fn apply_dispatch_failure(&mut self, intent: Intent) {
        if intent.is_message() {
            self.loading = false;
            self.loading_agent = None;
        }
        if let Some((system, _)) = intent.as_toggle() {
            self.toggles.revert(system);
        }
    }
}

fn normalize_all(normalizer: &Normalizer, records: Vec<AgentRecord>) -> Vec<Agent> {
    let (agents, rejected) = normalizer.agents(records);
    for e in rejected {
        tracing::debug!(error = %e, "Dropping agent record");
    }
    agents
}

/// The user's own copy of an outgoing message, routed like a reply would be.
fn local_message(intent: &Intent, settings: &ReconcileSettings) -> Option<MessagePatch> {
    let (id, content, timestamp, target_agent, team_id) = match intent {
        Intent::SendMessage {
            id,
            content,
            timestamp,
        } => (id, content, timestamp, None, None),
        Intent::SendAgentMessage {
            id,
            content,
            timestamp,
            agent_id,
            team_id,
            is_vp_message,
            direct,
            ..
        } => {
            let target_agent = if *direct { agent_id.clone() } else { None };
            let team_id = if *is_vp_message {
                Some(settings.coordinator_team_id.clone())
            } else {
                team_id.clone()
            };
            (id, content, timestamp, target_agent, team_id)
        }
        _ => return None,
    };
    Some(MessagePatch {
        id: Some(id.clone()),
        sender: Some(USER_SENDER.to_string()),
        content: Some(content.clone()),
        timestamp: Some(*timestamp),
        message_type: Some(MessageType::User),
        target_agent,
        team_id,
        is_vp_response: None,
        status: None,
    })
}

fn task_title(task: &Value) -> &str {
    ["title", "name"]
        .iter()
        .find_map(|key| task.get(*key).and_then(Value::as_str))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or("Untitled task")
}
