//! Session registry: maps a session id to the single live client channel
//! for that session. Registration is last-write-wins (a reconnecting client
//! replaces the old channel); deregistration is identity-guarded so a stale
//! disconnect can never remove a newer registration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Transcript event relayed to the session's client channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEvent {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix seconds
    pub timestamp: f64,
}

impl TranscriptEvent {
    pub fn stt_result(session_id: &str, text: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            text: text.to_string(),
            kind: "stt_result".to_string(),
            timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Cheap-clone handle to one client's event channel.
///
/// Carries a unique id so the registry can tell two channels for the same
/// session apart.
#[derive(Debug, Clone)]
pub struct ClientChannel {
    id: Uuid,
    tx: mpsc::UnboundedSender<TranscriptEvent>,
}

impl ClientChannel {
    /// Create a channel handle plus the receiver its owner drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TranscriptEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Push an event to the channel owner. Returns `false` if the owner is
    /// gone; the caller treats that the same as no registration.
    pub fn push(&self, event: TranscriptEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Shared, mutex-protected session id → channel map.
///
/// The only state shared across a session's concurrent paths; every access
/// is a brief critical section with no suspension point inside.
pub struct SessionRegistry {
    channels: Mutex<HashMap<String, ClientChannel>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Register a channel for a session, replacing any previous one.
    /// Latest client wins; replacement is not an error.
    pub fn register(&self, session_id: &str, channel: ClientChannel) {
        let mut channels = self.channels.lock().expect("registry lock poisoned");
        channels.insert(session_id.to_string(), channel);
    }

    /// Look up the currently registered channel, if any.
    pub fn lookup(&self, session_id: &str) -> Option<ClientChannel> {
        let channels = self.channels.lock().expect("registry lock poisoned");
        channels.get(session_id).cloned()
    }

    /// Remove the mapping only if `channel` is still the registered instance.
    /// A deregister from a replaced channel is a no-op.
    pub fn deregister(&self, session_id: &str, channel: &ClientChannel) {
        let mut channels = self.channels.lock().expect("registry lock poisoned");
        if let Some(current) = channels.get(session_id) {
            if current.id == channel.id {
                channels.remove(session_id);
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
