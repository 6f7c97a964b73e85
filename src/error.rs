//! Orchestra error types

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the orchestra core
#[derive(Debug, Error)]
pub enum OrchestraError {
    /// An operation requiring state ran before initialization
    #[error("Orchestra not initialized")]
    NotInitialized,

    /// Referenced a key outside the fixed roster
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Dissolve targeted a nonexistent formation
    #[error("Formation not found: {0}")]
    FormationNotFound(Uuid),

    /// Formation request was structurally invalid
    #[error("Invalid formation: {0}")]
    InvalidFormation(String),

    /// A registry/exchange/relay call failed (network or non-2xx)
    #[error("Upstream {service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    /// State store read or write failed
    #[error("Store error: {0}")]
    Store(String),

    /// State document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestraError {
    /// Wrap an upstream transport or status failure
    pub fn upstream(service: &str, reason: impl std::fmt::Display) -> Self {
        Self::UpstreamUnavailable {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }
}
