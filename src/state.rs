//! Orchestra state - the single persisted root aggregate
//!
//! One `OrchestraState` document holds everything: the roster profiles,
//! live formations, bounded journals, and the collective counters. It is
//! created exactly once (first initialization), loaded in full at the start
//! of an invocation, mutated in memory, and written back in full.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::AgentKey;

/// Activity state of one roster agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentActivity {
    /// Available for regular work
    Active,
    /// Currently part of a formation
    Collaborative,
    /// Winding down between actions
    Resting,
}

/// Derived classification of overall ensemble activity
///
/// Never stored as authoritative - recomputed on every read that reports it.
/// Messages carry a snapshot purely for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshMood {
    /// Four or more agents active in the last five minutes
    Energized,
    /// High cumulative action volume
    Focused,
    /// At least one formation playing
    Supportive,
    /// Baseline
    Harmony,
}

/// Kind of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Thought,
    Insight,
}

/// One journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub agent: AgentKey,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Mood at the time of creation, kept for audit
    pub mood: MeshMood,
}

/// Declared shape of a formation, with an expected member count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationPattern {
    Duet,
    Trio,
    Quartet,
    #[serde(rename = "full")]
    FullEnsemble,
}

impl FormationPattern {
    /// How many agents this pattern expects (advisory, not enforced)
    pub fn expected_members(self) -> usize {
        match self {
            FormationPattern::Duet => 2,
            FormationPattern::Trio => 3,
            FormationPattern::Quartet => 4,
            FormationPattern::FullEnsemble => 6,
        }
    }
}

/// Formation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationStatus {
    /// Playing - members are collaborating
    Active,
    /// Finished - set in the same transaction that removes the formation
    Complete,
}

/// An ad-hoc team of agents collaborating toward a stated purpose
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    pub id: Uuid,
    pub name: String,
    pub pattern: FormationPattern,
    /// Referenced, never owned - dissolution is explicit
    pub members: Vec<AgentKey>,
    pub purpose: String,
    pub status: FormationStatus,
    pub formed_at: DateTime<Utc>,
}

/// Profile of one roster agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub capabilities: Vec<String>,
    /// Always `floor(sqrt(xp / 100))` - recomputed whenever xp changes
    pub level: u32,
    pub xp: u64,
    pub activity: AgentActivity,
    pub last_active: DateTime<Utc>,
    pub action_count: u64,
    /// Sparse counter map, keys created on demand
    #[serde(default)]
    pub special_stats: BTreeMap<String, u64>,
}

/// The single root aggregate, persisted as one document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestraState {
    /// Assigned once at first registration, immutable thereafter
    pub orchestra_id: String,
    pub agents: BTreeMap<AgentKey, AgentProfile>,
    pub formations: Vec<Formation>,
    /// Newest first, capped at [`crate::journal::THOUGHTS_CAP`]
    pub thoughts: Vec<Message>,
    /// Newest first, capped at [`crate::journal::INSIGHTS_CAP`]
    pub insights: Vec<Message>,
    pub total_actions: u64,
    pub collective_xp: u64,
    pub registered_at: DateTime<Utc>,
    /// Timestamp of the last persisted write
    pub last_sync: DateTime<Utc>,
}

impl OrchestraState {
    /// One-time construction of the state document for a fresh identity
    ///
    /// Every roster agent starts at level 0 with zero xp. This is the only
    /// place profiles are created; there is no dynamic agent creation.
    pub fn bootstrap(orchestra_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let agents = AgentKey::ALL
            .into_iter()
            .map(|key| {
                let desc = key.descriptor();
                let profile = AgentProfile {
                    name: desc.name.to_string(),
                    role: desc.role.to_string(),
                    capabilities: desc.capabilities.iter().map(|c| c.to_string()).collect(),
                    level: 0,
                    xp: 0,
                    activity: AgentActivity::Active,
                    last_active: now,
                    action_count: 0,
                    special_stats: BTreeMap::new(),
                };
                (key, profile)
            })
            .collect();

        Self {
            orchestra_id: orchestra_id.into(),
            agents,
            formations: Vec::new(),
            thoughts: Vec::new(),
            insights: Vec::new(),
            total_actions: 0,
            collective_xp: 0,
            registered_at: now,
            last_sync: now,
        }
    }

    /// Look up one profile, rejecting keys missing from the document
    pub(crate) fn profile_mut(
        &mut self,
        key: AgentKey,
    ) -> Result<&mut AgentProfile, crate::error::OrchestraError> {
        self.agents
            .get_mut(&key)
            .ok_or_else(|| crate::error::OrchestraError::AgentNotFound(key.key().to_string()))
    }
}
