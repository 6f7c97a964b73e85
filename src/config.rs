//! Orchestra configuration

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for one orchestra process
///
/// Deserializable so a wrapping service can load it from its own config
/// file; every field has a sensible local default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestraConfig {
    /// Display name sent at registration
    pub name: String,
    /// Description sent at registration
    pub description: String,
    /// Base URL of the agent registry
    pub registry_url: String,
    /// Base URL of the help exchange
    pub exchange_url: String,
    /// Base URL of the broadcast relay
    pub relay_url: String,
    /// Path of the persisted state document
    pub state_path: PathBuf,
}

impl Default for OrchestraConfig {
    fn default() -> Self {
        Self {
            name: "Ensemble".to_string(),
            description: "Coordinated agent orchestra - shared progression and help response"
                .to_string(),
            registry_url: "http://localhost:8080".to_string(),
            exchange_url: "http://localhost:8080".to_string(),
            relay_url: "http://localhost:8081".to_string(),
            state_path: PathBuf::from("./data/orchestra.json"),
        }
    }
}
