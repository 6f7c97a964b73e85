//! The orchestra handle - initialization, operations, persist boundary
//!
//! `Orchestra` wraps the in-process state singleton behind an explicit
//! handle with every collaborator injected: the state store, the agent
//! registry, the help exchange, and the broadcast relay. Every mutating
//! operation ends by persisting the full document back to the store.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::config::OrchestraConfig;
use crate::coordinator::{HelpOutcome, HelpReport};
use crate::error::OrchestraError;
use crate::progression::{determine_mood, XpGrant};
use crate::roster::{AgentKey, ENCOURAGEMENTS};
use crate::state::{FormationPattern, Message, MeshMood, MessageKind, OrchestraState};
use crate::store::{JsonFileStore, StateStore};
use crate::upstream::{
    AgentRegistry, BroadcastRelay, HelpExchange, HttpExchange, HttpRegistry, HttpRelay,
    RegisterDescriptor,
};

/// XP granted to the connector for sending encouragement
const ENCOURAGE_XP: u64 = 5;

/// Chance a quiet tick sends an encouragement instead of standing by
const ENCOURAGE_PROBABILITY: f64 = 0.3;

/// Outcome of one scheduled tick
#[derive(Debug)]
pub enum TickOutcome {
    /// A help signal was answered this tick
    Helped(HelpReport),
    /// Nothing needed help; an encouragement went out instead
    Encouraged(String),
    /// Nothing to do
    Standby,
}

/// The coordinated orchestra process
pub struct Orchestra {
    config: OrchestraConfig,
    store: Arc<dyn StateStore>,
    registry: Arc<dyn AgentRegistry>,
    pub(crate) exchange: Arc<dyn HelpExchange>,
    pub(crate) relay: Arc<dyn BroadcastRelay>,
    /// Loaded once per process; never held across an await point
    pub(crate) state: RwLock<Option<OrchestraState>>,
}

impl Orchestra {
    /// Create an orchestra with explicit collaborators
    pub fn new(
        config: OrchestraConfig,
        store: Arc<dyn StateStore>,
        registry: Arc<dyn AgentRegistry>,
        exchange: Arc<dyn HelpExchange>,
        relay: Arc<dyn BroadcastRelay>,
    ) -> Self {
        Self {
            config,
            store,
            registry,
            exchange,
            relay,
            state: RwLock::new(None),
        }
    }

    /// Create an orchestra wired to HTTP upstreams and a JSON file store
    pub fn over_http(config: OrchestraConfig) -> Self {
        let client = reqwest::Client::new();
        let store = Arc::new(JsonFileStore::new(config.state_path.clone()));
        let registry = Arc::new(HttpRegistry::new(client.clone(), config.registry_url.clone()));
        let exchange = Arc::new(HttpExchange::new(client.clone(), config.exchange_url.clone()));
        let relay = Arc::new(HttpRelay::new(client, config.relay_url.clone()));
        Self::new(config, store, registry, exchange, relay)
    }

    /// Make sure the orchestra state exists, registering on first ever run
    ///
    /// Loads the persisted document if one exists; otherwise registers with
    /// the agent registry exactly once, bootstraps the roster state, and
    /// persists it. Registry failure prevents any further operation for
    /// this invocation. Returns the durable orchestra identity.
    pub async fn ensure_initialized(&self) -> Result<String, OrchestraError> {
        if let Some(state) = self.state.read().as_ref() {
            return Ok(state.orchestra_id.clone());
        }

        if let Some(state) = self.store.load().await? {
            let identity = state.orchestra_id.clone();
            let mut guard = self.state.write();
            if guard.is_none() {
                *guard = Some(state);
            }
            return Ok(identity);
        }

        let descriptor = self.register_descriptor();
        let identity = self.registry.register(&descriptor).await?;
        info!(identity = %identity, name = %self.config.name, "Registered orchestra");

        {
            let mut guard = self.state.write();
            if guard.is_none() {
                *guard = Some(OrchestraState::bootstrap(identity.clone(), Utc::now()));
            }
        }
        self.persist().await?;
        Ok(identity)
    }

    fn register_descriptor(&self) -> RegisterDescriptor {
        let mut capabilities: Vec<String> = Vec::new();
        for key in AgentKey::ALL {
            for cap in key.descriptor().capabilities {
                if !capabilities.iter().any(|c| c == cap) {
                    capabilities.push(cap.to_string());
                }
            }
        }
        RegisterDescriptor {
            name: self.config.name.clone(),
            description: self.config.description.clone(),
            kind: "ai".to_string(),
            capabilities,
        }
    }

    /// Run a closure against the initialized state
    pub(crate) fn with_state_mut<T>(
        &self,
        f: impl FnOnce(&mut OrchestraState) -> Result<T, OrchestraError>,
    ) -> Result<T, OrchestraError> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(OrchestraError::NotInitialized)?;
        f(state)
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&OrchestraState) -> T,
    ) -> Result<T, OrchestraError> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(OrchestraError::NotInitialized)?;
        Ok(f(state))
    }

    /// Stamp `last_sync` and write the full document back to the store
    pub(crate) async fn persist(&self) -> Result<(), OrchestraError> {
        let document = {
            let mut guard = self.state.write();
            let state = guard.as_mut().ok_or(OrchestraError::NotInitialized)?;
            state.last_sync = Utc::now();
            state.clone()
        };
        self.store.save(&document).await
    }

    // === Progression ===

    /// Grant XP to one agent and persist
    pub async fn grant_xp(
        &self,
        agent: AgentKey,
        amount: u64,
        action: &str,
    ) -> Result<XpGrant, OrchestraError> {
        let grant = self.with_state_mut(|state| state.grant_xp(agent, amount, action, Utc::now()))?;
        self.persist().await?;
        Ok(grant)
    }

    /// Current mood, recomputed on every call - never a cached copy
    pub fn mood(&self) -> Result<MeshMood, OrchestraError> {
        self.with_state(|state| determine_mood(state, Utc::now()))
    }

    // === Journal ===

    /// Journal a thought and persist
    pub async fn add_thought(
        &self,
        agent: AgentKey,
        content: impl Into<String>,
    ) -> Result<Message, OrchestraError> {
        let message = self.with_state_mut(|state| {
            Ok(state.add_thought(agent, content, MessageKind::Thought, Utc::now()))
        })?;
        self.persist().await?;
        Ok(message)
    }

    /// Journal an insight and persist
    pub async fn add_insight(
        &self,
        agent: AgentKey,
        content: impl Into<String>,
    ) -> Result<Message, OrchestraError> {
        let message =
            self.with_state_mut(|state| Ok(state.add_insight(agent, content, Utc::now())))?;
        self.persist().await?;
        Ok(message)
    }

    /// Most recent thoughts, newest first
    pub fn thoughts(&self, limit: usize) -> Result<Vec<Message>, OrchestraError> {
        self.with_state(|state| state.thoughts.iter().take(limit).cloned().collect())
    }

    /// Most recent insights, newest first
    pub fn insights(&self, limit: usize) -> Result<Vec<Message>, OrchestraError> {
        self.with_state(|state| state.insights.iter().take(limit).cloned().collect())
    }

    // === Formations ===

    /// Create a formation and persist
    pub async fn create_formation(
        &self,
        name: impl Into<String>,
        pattern: FormationPattern,
        members: Vec<AgentKey>,
        purpose: impl Into<String>,
    ) -> Result<Uuid, OrchestraError> {
        let id = self.with_state_mut(|state| {
            state.create_formation(name, pattern, members, purpose, Utc::now())
        })?;
        self.persist().await?;
        Ok(id)
    }

    /// Dissolve a formation and persist
    pub async fn dissolve_formation(&self, id: Uuid) -> Result<(), OrchestraError> {
        self.with_state_mut(|state| state.dissolve_formation(id, Utc::now()))?;
        self.persist().await?;
        Ok(())
    }

    // === Encouragement & tick ===

    /// Broadcast a random encouragement line from the connector
    ///
    /// The broadcast is the operation here, so a relay failure is fatal to
    /// the invocation and nothing is persisted.
    pub async fn encourage(&self) -> Result<String, OrchestraError> {
        let identity = self.ensure_initialized().await?;

        let line = ENCOURAGEMENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(ENCOURAGEMENTS[0])
            .to_string();

        let payload = serde_json::json!({
            "agent": AgentKey::CONNECTOR.to_string(),
            "message": line,
            "timestamp": Utc::now(),
        });
        self.relay.publish(&identity, payload).await?;

        let now = Utc::now();
        self.with_state_mut(|state| {
            state.grant_xp(AgentKey::CONNECTOR, ENCOURAGE_XP, "encouragement", now)?;
            let stats = &mut state.profile_mut(AgentKey::CONNECTOR)?.special_stats;
            *stats.entry("encouragements_sent".to_string()).or_insert(0) += 1;
            Ok(())
        })?;
        self.persist().await?;

        info!(line = %line, "Encouragement sent");
        Ok(line)
    }

    /// Effect of one scheduled tick: answer help first, then maybe encourage
    pub async fn tick(&self) -> Result<TickOutcome, OrchestraError> {
        self.ensure_initialized().await?;

        match self.check_and_respond_to_help().await? {
            HelpOutcome::Helped(report) => Ok(TickOutcome::Helped(report)),
            HelpOutcome::Standby => {
                if rand::thread_rng().gen_bool(ENCOURAGE_PROBABILITY) {
                    Ok(TickOutcome::Encouraged(self.encourage().await?))
                } else {
                    Ok(TickOutcome::Standby)
                }
            }
        }
    }

    // === Readers ===

    /// The durable orchestra identity
    pub fn identity(&self) -> Result<String, OrchestraError> {
        self.with_state(|state| state.orchestra_id.clone())
    }

    /// Full copy of the current state document
    pub fn snapshot(&self) -> Result<OrchestraState, OrchestraError> {
        self.with_state(|state| state.clone())
    }
}
