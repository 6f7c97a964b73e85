//! Thought and insight journals
//!
//! Two bounded, newest-first logs of agent utterances. Insights also appear
//! in the thought log until evicted; the lists trim independently, so their
//! membership can diverge. Best-effort history, not a ledger.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::progression::determine_mood;
use crate::roster::AgentKey;
use crate::state::{Message, MessageKind, OrchestraState};

/// Maximum retained thoughts
pub const THOUGHTS_CAP: usize = 100;

/// Maximum retained insights
pub const INSIGHTS_CAP: usize = 50;

impl OrchestraState {
    /// Journal one entry, newest first, trimming to capacity
    ///
    /// The created message snapshots the current mood for audit. Returns a
    /// clone for callers that also broadcast it externally.
    pub fn add_thought(
        &mut self,
        agent: AgentKey,
        content: impl Into<String>,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> Message {
        let message = Message {
            id: Uuid::new_v4(),
            agent,
            kind,
            content: content.into(),
            timestamp: now,
            mood: determine_mood(self, now),
        };

        self.thoughts.insert(0, message.clone());
        self.thoughts.truncate(THOUGHTS_CAP);

        message
    }

    /// Journal an insight: a thought that is also retained in the smaller log
    pub fn add_insight(
        &mut self,
        agent: AgentKey,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Message {
        let message = self.add_thought(agent, content, MessageKind::Insight, now);

        self.insights.insert(0, message.clone());
        self.insights.truncate(INSIGHTS_CAP);

        message
    }
}
