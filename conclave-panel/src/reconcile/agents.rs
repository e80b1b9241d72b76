//! Agent roster reconciliation.

use crate::config::ReconcileSettings;
use conclave_core::{Agent, AgentId, AgentRecord, Normalizer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRoster {
    pub agents: Vec<Agent>,
    /// The coordinator agent, when the roster contains one.
    pub vp_agent: Option<AgentId>,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// First agent with `id`. The roster does not reject duplicate ids.
    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn vp_agent(&self) -> Option<&Agent> {
        self.vp_agent.as_ref().and_then(|id| self.get(id))
    }

    /// Replace the whole roster and re-evaluate the coordinator.
    pub fn replace(&mut self, agents: Vec<Agent>, settings: &ReconcileSettings) {
        self.agents = agents;
        self.promote_coordinator(settings);
    }

    /// Append without deduplication.
    pub fn append(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// Replace the agent with the same id in place, or append.
    pub fn upsert(&mut self, agent: Agent) {
        if let Some(existing) = self.agents.iter_mut().find(|a| a.id == agent.id) {
            *existing = agent;
        } else {
            self.agents.push(agent);
        }
    }

    /// Merge a partial record into every agent carrying its id.
    ///
    /// Returns `false` (and changes nothing) when no agent matches.
    pub fn patch(&mut self, patch: AgentRecord, normalizer: &Normalizer) -> bool {
        let Some(id) = patch.id.clone() else {
            return false;
        };
        let mut matched = false;
        for agent in self.agents.iter_mut().filter(|a| a.id == id) {
            normalizer.merge_agent(agent, patch.clone());
            matched = true;
        }
        matched
    }

    pub(crate) fn promote_coordinator(&mut self, settings: &ReconcileSettings) {
        self.vp_agent = self
            .agents
            .iter()
            .find(|a| settings.is_coordinator_role(&a.role))
            .map(|a| a.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{AgentStatus, AutonomyLevel, AutonomyStateRecord};

    fn agent(id: &str, role: &str) -> Agent {
        Normalizer::default()
            .agent(AgentRecord::with_id(id).role(role))
            .unwrap()
    }

    #[test]
    fn test_roster_new_is_empty() {
        let roster = AgentRoster::new();
        assert!(roster.is_empty());
        assert!(roster.vp_agent().is_none());
    }

    #[test]
    fn test_replace_promotes_coordinator() {
        let settings = ReconcileSettings::default();
        let mut roster = AgentRoster::new();
        roster.replace(
            vec![agent("a1", "Engineer"), agent("vp", "VP of Engineering")],
            &settings,
        );
        assert_eq!(roster.vp_agent().map(|a| a.id.clone()), Some(AgentId::from("vp")));
    }

    #[test]
    fn test_replace_without_coordinator_clears_reference() {
        let settings = ReconcileSettings::default();
        let mut roster = AgentRoster::new();
        roster.replace(vec![agent("vp", "VP of Engineering")], &settings);
        roster.replace(vec![agent("a1", "Engineer")], &settings);
        assert!(roster.vp_agent.is_none());
    }

    #[test]
    fn test_append_keeps_duplicate_ids() {
        let mut roster = AgentRoster::new();
        roster.append(agent("a1", "Engineer"));
        roster.append(agent("a1", "Engineer"));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut roster = AgentRoster::new();
        roster.upsert(agent("a1", "Engineer"));
        roster.upsert(agent("a2", "Designer"));
        roster.upsert(agent("a1", "Architect"));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.agents[0].role, "Architect");
    }

    #[test]
    fn test_patch_unknown_id_is_noop() {
        let mut roster = AgentRoster::new();
        roster.append(agent("a1", "Engineer"));
        let before = roster.clone();
        let patched = roster.patch(
            AgentRecord {
                status: Some(AgentStatus::Busy),
                ..AgentRecord::with_id("ghost")
            },
            &Normalizer::default(),
        );
        assert!(!patched);
        assert_eq!(roster, before);
    }

    #[test]
    fn test_patch_merges_autonomy() {
        let mut roster = AgentRoster::new();
        roster.append(agent("a1", "Engineer"));
        let patch = AgentRecord {
            autonomy_state: Some(AutonomyStateRecord {
                level: Some(AutonomyLevel::Low),
                ..AutonomyStateRecord::default()
            }),
            ..AgentRecord::with_id("a1")
        };
        assert!(roster.patch(patch, &Normalizer::default()));
        assert_eq!(roster.agents[0].autonomy_state.level, AutonomyLevel::Low);
        assert_eq!(roster.agents[0].role, "Engineer");
    }
}
