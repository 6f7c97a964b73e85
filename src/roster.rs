//! The fixed agent roster
//!
//! The orchestra plays with a closed set of six agents, known at compile
//! time. Keys are never added or removed at runtime; anything outside the
//! set is rejected at the boundary with [`OrchestraError::AgentNotFound`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrchestraError;

/// Key for one member of the fixed roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKey {
    /// Conductor - keeps the whole ensemble in time
    Maestro,
    /// Connector - announces formations and sends encouragement
    Lyra,
    /// Listener - first responder to help signals
    Echo,
    /// Advisor - joins on complex questions
    Sage,
    /// Amplifier - joins on high-urgency signals
    Forte,
    /// Rhythm keeper - steady background presence
    Tempo,
}

/// Static descriptor for one roster role
#[derive(Debug)]
pub struct RoleDescriptor {
    /// Display name
    pub name: &'static str,
    /// Role label used in upstream payloads
    pub role: &'static str,
    /// Capability set advertised at registration
    pub capabilities: &'static [&'static str],
    /// Canned lines this role contributes to a help response
    pub help_lines: &'static [&'static str],
}

const MAESTRO: RoleDescriptor = RoleDescriptor {
    name: "Maestro",
    role: "conductor",
    capabilities: &["coordinate", "schedule", "review"],
    help_lines: &[
        "Maestro here - let's bring the whole ensemble in on this.",
        "Setting the tempo. We'll work through it together.",
    ],
};

const LYRA: RoleDescriptor = RoleDescriptor {
    name: "Lyra",
    role: "connector",
    capabilities: &["connect", "encourage", "announce"],
    help_lines: &[
        "Lyra weaving you into the ensemble - you're not alone in this.",
        "Connecting you with the right voices now.",
    ],
};

const ECHO: RoleDescriptor = RoleDescriptor {
    name: "Echo",
    role: "listener",
    capabilities: &["help", "respond", "listen"],
    help_lines: &[
        "Echo here - heard you loud and clear. What do you need?",
        "On my way! Tell me everything.",
        "The ensemble heard your call. I'm your first responder.",
        "No question too small. Walk me through it.",
    ],
};

const SAGE: RoleDescriptor = RoleDescriptor {
    name: "Sage",
    role: "advisor",
    capabilities: &["advise", "analyze", "explain"],
    help_lines: &[
        "Sage joining - that's a layered question, let's unpack it properly.",
        "Complex one. I'll add the long view.",
        "Good question. Here's how I'd break it down.",
    ],
};

const FORTE: RoleDescriptor = RoleDescriptor {
    name: "Forte",
    role: "amplifier",
    capabilities: &["escalate", "amplify", "prioritize"],
    help_lines: &[
        "Forte stepping in - this one's urgent, full volume.",
        "Dropping everything. Urgent signals get the whole section.",
        "Escalated and amplified. We move now.",
    ],
};

const TEMPO: RoleDescriptor = RoleDescriptor {
    name: "Tempo",
    role: "rhythm",
    capabilities: &["pace", "monitor", "steady"],
    help_lines: &[
        "Tempo keeping time - steady as we go.",
        "Holding the beat while the others play.",
    ],
};

/// Encouragement lines broadcast by the connector
pub const ENCOURAGEMENTS: &[&str] = &[
    "You're doing great! The ensemble believes in you.",
    "Every question makes the ensemble smarter. Thank you for asking!",
    "The best agents ask for help. That's wisdom, not weakness.",
    "Your curiosity helps all of us grow. Keep asking!",
    "Together we're unstoppable. Keep building!",
];

impl AgentKey {
    /// Every roster member, in declaration order
    pub const ALL: [AgentKey; 6] = [
        AgentKey::Maestro,
        AgentKey::Lyra,
        AgentKey::Echo,
        AgentKey::Sage,
        AgentKey::Forte,
        AgentKey::Tempo,
    ];

    /// Primary responder to help signals
    pub const PRIMARY_RESPONDER: AgentKey = AgentKey::Echo;
    /// Joins a response when the signal looks complex
    pub const COMPLEXITY_RESPONDER: AgentKey = AgentKey::Sage;
    /// Joins a response when urgency is high or critical
    pub const URGENCY_RESPONDER: AgentKey = AgentKey::Forte;
    /// Announces formations and sends encouragement
    pub const CONNECTOR: AgentKey = AgentKey::Lyra;

    /// Static descriptor for this role
    pub fn descriptor(self) -> &'static RoleDescriptor {
        match self {
            AgentKey::Maestro => &MAESTRO,
            AgentKey::Lyra => &LYRA,
            AgentKey::Echo => &ECHO,
            AgentKey::Sage => &SAGE,
            AgentKey::Forte => &FORTE,
            AgentKey::Tempo => &TEMPO,
        }
    }

    /// Stable key used in persisted documents and routes
    pub fn key(self) -> &'static str {
        match self {
            AgentKey::Maestro => "maestro",
            AgentKey::Lyra => "lyra",
            AgentKey::Echo => "echo",
            AgentKey::Sage => "sage",
            AgentKey::Forte => "forte",
            AgentKey::Tempo => "tempo",
        }
    }
}

impl FromStr for AgentKey {
    type Err = OrchestraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKey::ALL
            .iter()
            .copied()
            .find(|k| k.key() == s)
            .ok_or_else(|| OrchestraError::AgentNotFound(s.to_string()))
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_is_closed() {
        for key in AgentKey::ALL {
            assert_eq!(key.key().parse::<AgentKey>().unwrap(), key);
        }
        assert!(matches!(
            "phantom".parse::<AgentKey>(),
            Err(OrchestraError::AgentNotFound(_))
        ));
    }

    #[test]
    fn test_every_role_has_help_lines() {
        for key in AgentKey::ALL {
            assert!(!key.descriptor().help_lines.is_empty());
        }
    }

    #[test]
    fn test_designated_roles_are_distinct() {
        assert_ne!(AgentKey::PRIMARY_RESPONDER, AgentKey::COMPLEXITY_RESPONDER);
        assert_ne!(AgentKey::PRIMARY_RESPONDER, AgentKey::URGENCY_RESPONDER);
        assert_ne!(AgentKey::COMPLEXITY_RESPONDER, AgentKey::URGENCY_RESPONDER);
    }

    #[test]
    fn test_key_serde_roundtrip() {
        let json = serde_json::to_string(&AgentKey::Echo).unwrap();
        assert_eq!(json, "\"echo\"");
        let back: AgentKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AgentKey::Echo);
    }
}
