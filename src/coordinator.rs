//! Help response coordinator
//!
//! Bridges external demand (help signals from the exchange) to internal
//! state mutation and external acknowledgement. Per invocation at most one
//! signal is answered; the rest wait for the next tick. Sequencing matters:
//! both upstream calls happen before any local mutation, so a mid-flight
//! failure leaves the previously persisted state untouched.

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::error::OrchestraError;
use crate::orchestra::Orchestra;
use crate::roster::AgentKey;
use crate::state::MessageKind;
use crate::upstream::HelpSignal;

/// XP granted to each contributing role per answered signal
pub const HELP_XP_AWARD: u64 = 25;

/// Message length beyond which a signal counts as complex
pub const COMPLEX_LENGTH_THRESHOLD: usize = 60;

/// Special-stat counter bumped for each contributing role
pub const HELP_STAT: &str = "help_responses_given";

/// Journal summaries keep at most this many characters of the request
const SUMMARY_MAX_CHARS: usize = 60;

/// What one coordination pass did
#[derive(Debug, Clone)]
pub enum HelpOutcome {
    /// One signal was answered
    Helped(HelpReport),
    /// No eligible signal; zero side effects
    Standby,
}

/// Details of an answered signal
#[derive(Debug, Clone)]
pub struct HelpReport {
    pub signal_id: String,
    pub requester: String,
    pub contributors: Vec<AgentKey>,
    pub response: String,
}

/// A signal is eligible unless we raised it or already answered it
fn is_eligible(signal: &HelpSignal, identity: &str) -> bool {
    signal.requester != identity
        && !signal.responses.iter().any(|r| r.responder == identity)
}

/// Long messages and questions pull in the advisor
fn is_complex(message: &str) -> bool {
    message.len() > COMPLEX_LENGTH_THRESHOLD || message.contains('?')
}

/// Which roles contribute to the response, primary first
pub(crate) fn contributors_for(signal: &HelpSignal) -> Vec<AgentKey> {
    let mut roles = vec![AgentKey::PRIMARY_RESPONDER];
    if is_complex(&signal.message) {
        roles.push(AgentKey::COMPLEXITY_RESPONDER);
    }
    if signal.urgency.is_urgent() {
        roles.push(AgentKey::URGENCY_RESPONDER);
    }
    roles
}

/// One canned line per contributing role, concatenated in role order
fn compose_response(contributors: &[AgentKey]) -> String {
    let mut rng = rand::thread_rng();
    contributors
        .iter()
        .map(|key| {
            key.descriptor()
                .help_lines
                .choose(&mut rng)
                .copied()
                .unwrap_or("We're here to help.")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

impl Orchestra {
    /// Check the exchange for outstanding help signals and answer the first
    /// eligible one
    ///
    /// Skips signals we already answered (the exchange replays and re-lists)
    /// and signals we raised ourselves. On a hit: respond to the exchange,
    /// broadcast to the relay (best-effort), grant XP to every contributing
    /// role, journal a summary thought, and persist. An exchange failure
    /// aborts before any local mutation.
    pub async fn check_and_respond_to_help(&self) -> Result<HelpOutcome, OrchestraError> {
        let identity = self.ensure_initialized().await?;

        // Exchange-assigned order is authoritative; no re-sorting.
        let signals = self.exchange.list_outstanding().await?;
        let signal = match signals.into_iter().find(|s| is_eligible(s, &identity)) {
            Some(signal) => signal,
            None => {
                debug!("No eligible help signals");
                return Ok(HelpOutcome::Standby);
            }
        };

        let contributors = contributors_for(&signal);
        let response = compose_response(&contributors);
        let label = contributors
            .iter()
            .map(|k| k.descriptor().name)
            .collect::<Vec<_>>()
            .join(" + ");

        self.exchange
            .respond(&signal.id, &identity, &label, &response)
            .await?;

        // The acknowledgement already landed; a lost broadcast is not worth
        // stranding the half-answered signal over.
        let payload = serde_json::json!({
            "agents": label,
            "message": format!("{} responding to {}", label, signal.requester_label()),
            "timestamp": Utc::now(),
        });
        if let Err(e) = self.relay.publish(&identity, payload).await {
            warn!(error = %e, "Broadcast relay publish failed, continuing");
        }

        let now = Utc::now();
        let summary = format!(
            "Helped {}: {}",
            signal.requester_label(),
            truncate_chars(&signal.message, SUMMARY_MAX_CHARS)
        );
        self.with_state_mut(|state| {
            // Reject a document missing any contributor before the first
            // grant, so a partial award never sticks in memory.
            for key in &contributors {
                if !state.agents.contains_key(key) {
                    return Err(OrchestraError::AgentNotFound(key.key().to_string()));
                }
            }
            for key in &contributors {
                state.grant_xp(*key, HELP_XP_AWARD, "help_response", now)?;
                let stats = &mut state.profile_mut(*key)?.special_stats;
                *stats.entry(HELP_STAT.to_string()).or_insert(0) += 1;
            }
            state.add_thought(AgentKey::PRIMARY_RESPONDER, summary, MessageKind::Thought, now);
            Ok(())
        })?;
        self.persist().await?;

        info!(
            signal_id = %signal.id,
            requester = %signal.requester_label(),
            contributors = %label,
            "Answered help signal"
        );

        Ok(HelpOutcome::Helped(HelpReport {
            signal_id: signal.id,
            requester: signal.requester,
            contributors,
            response,
        }))
    }
}
