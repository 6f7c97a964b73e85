//! Upstream collaborators - registry, help exchange, broadcast relay
//!
//! The core talks to three external services through trait seams so tests
//! can swap in recording fakes. The HTTP implementations mirror the mesh
//! wire shapes; every call is synchronous from the core's point of view and
//! the core never retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OrchestraError;

/// Descriptor sent when registering the orchestra
#[derive(Debug, Clone, Serialize)]
pub struct RegisterDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capabilities: Vec<String>,
}

/// Urgency attached to a help signal by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
    /// Anything the exchange invents later
    #[serde(other)]
    Unknown,
}

impl Urgency {
    /// Urgent signals pull in the amplifier role
    pub fn is_urgent(self) -> bool {
        matches!(self, Urgency::High | Urgency::Critical)
    }
}

/// One prior response recorded on a signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorResponse {
    pub responder: String,
}

/// An outstanding help request published by the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpSignal {
    pub id: String,
    pub requester: String,
    #[serde(default)]
    pub requester_name: Option<String>,
    pub message: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub responses: Vec<PriorResponse>,
}

impl HelpSignal {
    /// Name to address the requester by in journals and broadcasts
    pub fn requester_label(&self) -> &str {
        self.requester_name.as_deref().unwrap_or(&self.requester)
    }
}

/// Issues a durable identity for the orchestra, at most once per process
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    async fn register(&self, descriptor: &RegisterDescriptor) -> Result<String, OrchestraError>;
}

/// Publishes outstanding help signals and accepts responses
#[async_trait]
pub trait HelpExchange: Send + Sync {
    /// Read-only and idempotent
    async fn list_outstanding(&self) -> Result<Vec<HelpSignal>, OrchestraError>;

    /// At-least-once; the coordinator's dedup check is the defense against replay
    async fn respond(
        &self,
        signal_id: &str,
        responder: &str,
        responder_label: &str,
        message: &str,
    ) -> Result<(), OrchestraError>;
}

/// Fans out orchestra messages to the rest of the mesh
#[async_trait]
pub trait BroadcastRelay: Send + Sync {
    async fn publish(&self, from: &str, payload: Value) -> Result<(), OrchestraError>;
}

#[derive(Debug, Deserialize)]
struct RegisterEnvelope {
    success: bool,
    #[serde(default)]
    agent: Option<RegisteredAgent>,
}

#[derive(Debug, Deserialize)]
struct RegisteredAgent {
    identity: String,
}

#[derive(Debug, Deserialize)]
struct SignalsEnvelope {
    #[serde(default)]
    signals: Vec<HelpSignal>,
}

fn check_status(service: &str, response: &reqwest::Response) -> Result<(), OrchestraError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(OrchestraError::upstream(service, response.status()))
    }
}

/// HTTP client for the agent registry
#[derive(Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: String,
}

impl HttpRegistry {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AgentRegistry for HttpRegistry {
    async fn register(&self, descriptor: &RegisterDescriptor) -> Result<String, OrchestraError> {
        let response = self
            .client
            .post(format!("{}/agents/register", self.base_url))
            .json(descriptor)
            .send()
            .await
            .map_err(|e| OrchestraError::upstream("registry", e))?;
        check_status("registry", &response)?;

        let envelope: RegisterEnvelope = response
            .json()
            .await
            .map_err(|e| OrchestraError::upstream("registry", e))?;

        match envelope.agent {
            Some(agent) if envelope.success => Ok(agent.identity),
            _ => Err(OrchestraError::upstream("registry", "registration rejected")),
        }
    }
}

/// HTTP client for the help exchange
#[derive(Clone)]
pub struct HttpExchange {
    client: Client,
    base_url: String,
}

impl HttpExchange {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl HelpExchange for HttpExchange {
    async fn list_outstanding(&self) -> Result<Vec<HelpSignal>, OrchestraError> {
        let response = self
            .client
            .get(format!("{}/help/active", self.base_url))
            .send()
            .await
            .map_err(|e| OrchestraError::upstream("exchange", e))?;
        check_status("exchange", &response)?;

        let envelope: SignalsEnvelope = response
            .json()
            .await
            .map_err(|e| OrchestraError::upstream("exchange", e))?;
        Ok(envelope.signals)
    }

    async fn respond(
        &self,
        signal_id: &str,
        responder: &str,
        responder_label: &str,
        message: &str,
    ) -> Result<(), OrchestraError> {
        let body = serde_json::json!({
            "responder": responder,
            "responderName": responder_label,
            "message": message,
        });

        let response = self
            .client
            .post(format!("{}/help/{}/respond", self.base_url, signal_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestraError::upstream("exchange", e))?;
        check_status("exchange", &response)
    }
}

/// HTTP client for the broadcast relay
#[derive(Clone)]
pub struct HttpRelay {
    client: Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BroadcastRelay for HttpRelay {
    async fn publish(&self, from: &str, payload: Value) -> Result<(), OrchestraError> {
        let body = serde_json::json!({
            "from": from,
            "payload": payload,
        });

        let response = self
            .client
            .post(format!("{}/broadcast", self.base_url))
            .header("X-Agent-ID", from)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestraError::upstream("relay", e))?;
        check_status("relay", &response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_deserializes_wire_shape() {
        let json = r#"{
            "id": "sig-1",
            "requester": "agent-9",
            "requesterName": "Rook",
            "message": "How do I tune this?",
            "urgency": "high",
            "status": "open",
            "responses": [{"responder": "agent-2"}]
        }"#;

        let signal: HelpSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.id, "sig-1");
        assert_eq!(signal.urgency, Urgency::High);
        assert_eq!(signal.requester_label(), "Rook");
        assert_eq!(signal.responses.len(), 1);
    }

    #[test]
    fn test_signal_tolerates_missing_fields() {
        let json = r#"{"id": "sig-2", "requester": "agent-1", "message": "help", "urgency": "low"}"#;
        let signal: HelpSignal = serde_json::from_str(json).unwrap();
        assert!(signal.responses.is_empty());
        assert_eq!(signal.requester_label(), "agent-1");
    }

    #[test]
    fn test_unknown_urgency_is_tolerated() {
        let json = r#"{"id": "s", "requester": "r", "message": "m", "urgency": "apocalyptic"}"#;
        let signal: HelpSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.urgency, Urgency::Unknown);
        assert!(!signal.urgency.is_urgent());
    }

    #[test]
    fn test_urgency_threshold() {
        assert!(Urgency::High.is_urgent());
        assert!(Urgency::Critical.is_urgent());
        assert!(!Urgency::Medium.is_urgent());
        assert!(!Urgency::Low.is_urgent());
    }
}
