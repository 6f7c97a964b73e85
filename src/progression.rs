//! Progression engine - XP accrual, level derivation, mood derivation

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::error::OrchestraError;
use crate::roster::AgentKey;
use crate::state::{MeshMood, OrchestraState};

/// Seconds within which an agent counts as "active" for mood purposes
pub const ACTIVE_WINDOW_SECS: i64 = 300;

/// Active-in-window agent count at which the ensemble reads as energized
pub const ENERGIZED_ACTIVE_AGENTS: usize = 4;

/// Total action volume above which the ensemble reads as focused
pub const FOCUSED_ACTION_THRESHOLD: u64 = 100;

/// Level is a pure function of xp: `floor(sqrt(xp / 100))`
pub fn level_for_xp(xp: u64) -> u32 {
    ((xp / 100) as f64).sqrt() as u32
}

/// Outcome of one XP grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpGrant {
    pub agent: AgentKey,
    pub amount: u64,
    pub new_xp: u64,
    pub new_level: u32,
    /// Set when the grant crossed a level boundary
    pub leveled_up: bool,
}

impl OrchestraState {
    /// Grant `amount` XP to one agent for a named action
    ///
    /// Recomputes the level in the same mutation, bumps the agent's activity
    /// counters and the collective counters, and journals one insight when a
    /// level boundary is crossed. A key missing from the document is a typed
    /// failure with no mutation.
    pub fn grant_xp(
        &mut self,
        agent: AgentKey,
        amount: u64,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<XpGrant, OrchestraError> {
        let profile = self.profile_mut(agent)?;

        let prior_level = profile.level;
        profile.xp += amount;
        profile.level = level_for_xp(profile.xp);
        profile.action_count += 1;
        profile.last_active = now;

        let new_xp = profile.xp;
        let new_level = profile.level;
        let leveled_up = new_level > prior_level;

        self.collective_xp += amount;
        self.total_actions += 1;

        debug!(
            agent = %agent,
            amount = amount,
            xp = new_xp,
            level = new_level,
            action = action,
            "Granted XP"
        );

        if leveled_up {
            info!(agent = %agent, level = new_level, "Agent leveled up");
            self.add_insight(
                agent,
                format!("{} reached level {}! The ensemble grows stronger.", agent, new_level),
                now,
            );
        }

        Ok(XpGrant {
            agent,
            amount,
            new_xp,
            new_level,
            leveled_up,
        })
    }
}

/// Derive the current mood - pure function of state, no mutation
///
/// Priority order is fixed: active-agent count first, action volume second,
/// formation presence third, harmony as the default.
pub fn determine_mood(state: &OrchestraState, now: DateTime<Utc>) -> MeshMood {
    let window = Duration::seconds(ACTIVE_WINDOW_SECS);
    let active = state
        .agents
        .values()
        .filter(|a| now.signed_duration_since(a.last_active) <= window)
        .count();

    if active >= ENERGIZED_ACTIVE_AGENTS {
        MeshMood::Energized
    } else if state.total_actions > FOCUSED_ACTION_THRESHOLD {
        MeshMood::Focused
    } else if state
        .formations
        .iter()
        .any(|f| f.status == crate::state::FormationStatus::Active)
    {
        MeshMood::Supportive
    } else {
        MeshMood::Harmony
    }
}
