use crate::media::MediaEngine;
use crate::registry::SessionRegistry;
use crate::session::{SessionContext, SessionManager};
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Service name reported on the info endpoint
    pub service_name: String,
    /// Media transport seam used by the signaling endpoint
    pub engine: Arc<dyn MediaEngine>,
    /// Session id → client channel map
    pub registry: Arc<SessionRegistry>,
    /// Per-session pipeline bookkeeping
    pub sessions: SessionManager,
    /// Resources handed to every session's pipelines
    pub context: SessionContext,
}

impl AppState {
    /// Whether the transcription bridge is active for new sessions
    pub fn transcription_enabled(&self) -> bool {
        self.context.recognizer.is_some()
    }
}
