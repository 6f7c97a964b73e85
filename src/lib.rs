//! # Ensemble
//!
//! Coordination core for a small orchestra of named agents that collectively
//! answer external help signals and track a shared progression state.
//!
//! ## Architecture
//!
//! ```text
//!                       ┌──────────────────────────────┐
//!                       │          ORCHESTRA            │
//!                       │  ┌──────────┐ ┌────────────┐  │
//!   help signals ─────▶ │  │ Help     │ │ Progression│  │
//!   (exchange)          │  │ Coord.   │ │ Engine     │  │
//!                       │  └──────────┘ └────────────┘  │
//!   broadcasts  ◀─────  │  ┌──────────┐ ┌────────────┐  │
//!   (relay)             │  │ Formation│ │ Journals   │  │
//!                       │  │ Manager  │ │ (bounded)  │  │
//!                       │  └──────────┘ └────────────┘  │
//!                       └───────────────┬──────────────┘
//!                                       │ full document
//!                                       ▼
//!                                 state store
//! ```
//!
//! ## Key Concepts
//!
//! - **Orchestra**: the whole coordinated process, one durable identity
//! - **Agent**: one member of the fixed six-role roster
//! - **Formation**: an ad-hoc team with an explicit lifecycle
//! - **Help signal**: an external request answered at most once
//! - **Mood**: derived activity classification, recomputed on every read

pub mod config;
pub mod coordinator;
pub mod error;
pub mod formation;
pub mod journal;
pub mod orchestra;
pub mod progression;
pub mod roster;
pub mod state;
pub mod store;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testkit;

pub use config::OrchestraConfig;
pub use coordinator::{HelpOutcome, HelpReport};
pub use error::OrchestraError;
pub use orchestra::{Orchestra, TickOutcome};
pub use progression::{determine_mood, level_for_xp, XpGrant};
pub use roster::AgentKey;
pub use state::{
    AgentActivity, AgentProfile, Formation, FormationPattern, FormationStatus, MeshMood, Message,
    MessageKind, OrchestraState,
};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use upstream::{
    AgentRegistry, BroadcastRelay, HelpExchange, HelpSignal, HttpExchange, HttpRegistry,
    HttpRelay, RegisterDescriptor, Urgency,
};
