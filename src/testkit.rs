//! Recording fakes for the upstream collaborators, shared across test mods

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::OrchestraError;
use crate::upstream::{
    AgentRegistry, BroadcastRelay, HelpExchange, HelpSignal, RegisterDescriptor, Urgency,
};

/// Build a minimal open signal
pub fn signal(id: &str, requester: &str, message: &str, urgency: Urgency) -> HelpSignal {
    HelpSignal {
        id: id.to_string(),
        requester: requester.to_string(),
        requester_name: None,
        message: message.to_string(),
        urgency,
        status: "open".to_string(),
        responses: Vec::new(),
    }
}

/// Registry fake handing out a fixed identity and counting calls
pub struct MockRegistry {
    identity: String,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockRegistry {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next register call fail
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgentRegistry for MockRegistry {
    async fn register(&self, _descriptor: &RegisterDescriptor) -> Result<String, OrchestraError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(OrchestraError::upstream("registry", "mock outage"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.identity.clone())
    }
}

/// One respond call observed by the exchange fake
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    pub signal_id: String,
    pub responder: String,
    pub label: String,
    pub message: String,
}

/// Exchange fake serving preset signals and recording responses
#[derive(Default)]
pub struct MockExchange {
    signals: Mutex<Vec<HelpSignal>>,
    responses: Mutex<Vec<RecordedResponse>>,
    fail_list: AtomicBool,
    fail_respond: AtomicBool,
}

impl MockExchange {
    pub fn with_signals(signals: Vec<HelpSignal>) -> Self {
        Self {
            signals: Mutex::new(signals),
            ..Default::default()
        }
    }

    pub fn responses(&self) -> Vec<RecordedResponse> {
        self.responses.lock().clone()
    }

    /// Make every list call fail
    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    /// Make every respond call fail
    pub fn fail_respond(&self) {
        self.fail_respond.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HelpExchange for MockExchange {
    async fn list_outstanding(&self) -> Result<Vec<HelpSignal>, OrchestraError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(OrchestraError::upstream("exchange", "mock outage"));
        }
        Ok(self.signals.lock().clone())
    }

    async fn respond(
        &self,
        signal_id: &str,
        responder: &str,
        responder_label: &str,
        message: &str,
    ) -> Result<(), OrchestraError> {
        if self.fail_respond.load(Ordering::SeqCst) {
            return Err(OrchestraError::upstream("exchange", "mock outage"));
        }
        self.responses.lock().push(RecordedResponse {
            signal_id: signal_id.to_string(),
            responder: responder.to_string(),
            label: responder_label.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Relay fake recording published payloads
#[derive(Default)]
pub struct MockRelay {
    published: Mutex<Vec<(String, Value)>>,
    fail: AtomicBool,
}

impl MockRelay {
    pub fn published(&self) -> Vec<(String, Value)> {
        self.published.lock().clone()
    }

    /// Make the next publish call fail
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BroadcastRelay for MockRelay {
    async fn publish(&self, from: &str, payload: Value) -> Result<(), OrchestraError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(OrchestraError::upstream("relay", "mock outage"));
        }
        self.published.lock().push((from.to_string(), payload));
        Ok(())
    }
}
