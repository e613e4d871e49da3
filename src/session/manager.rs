use crate::jobs::JobDispatcher;
use crate::media::{MediaConnection, RemoteTrack, SessionDescription};
use crate::pipeline::{TranscriptionBridge, VideoSamplingPipeline};
use crate::registry::SessionRegistry;
use crate::stt::{Recognizer, RecognizerParams};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::info;
use uuid::Uuid;

/// Explicitly constructed resources a session's pipelines need, passed in
/// rather than reached for through globals.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<SessionRegistry>,
    pub dispatcher: JobDispatcher,
    pub recognizer: Option<Arc<dyn Recognizer>>,
    pub stt_params: RecognizerParams,
    pub sample_interval: Duration,
}

struct SessionHandle {
    generation: Uuid,
    aborts: Vec<AbortHandle>,
}

impl SessionHandle {
    fn abort_all(&self) {
        for abort in &self.aborts {
            abort.abort();
        }
    }
}

/// Tracks each session's running pipeline task set.
///
/// Renegotiation replaces (and stops) the previous set; a connection-closed
/// signal stops the current one; a finished set removes only itself, guarded
/// by a generation id so a stale supervisor never unseats a newer
/// negotiation. The client channel registry is deliberately untouched here:
/// media can outlive or be outlived by the signaling channel.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of sessions with live media pipelines
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().expect("session map lock poisoned").len()
    }

    /// Wire a negotiated connection: one task per remote track plus a
    /// supervisor watching for connection closure. Returns the answer to
    /// hand back to the signaling caller.
    pub fn attach(
        &self,
        ctx: &SessionContext,
        session_id: &str,
        connection: MediaConnection,
    ) -> SessionDescription {
        let MediaConnection {
            answer,
            tracks,
            outgoing_video,
            closed,
        } = connection;

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        for track in tracks {
            match track {
                RemoteTrack::Audio(source) => {
                    tasks.push(TranscriptionBridge::spawn(
                        session_id.to_string(),
                        source,
                        ctx.recognizer.clone(),
                        ctx.stt_params.clone(),
                        Arc::clone(&ctx.registry),
                    ));
                }
                RemoteTrack::Video(source) => {
                    let mut pipeline = VideoSamplingPipeline::new(
                        source,
                        session_id.to_string(),
                        ctx.dispatcher.clone(),
                        ctx.sample_interval,
                    );
                    let outgoing = outgoing_video.clone();
                    let sid = session_id.to_string();
                    tasks.push(tokio::spawn(async move {
                        while let Some(frame) = pipeline.next().await {
                            if let Some(tx) = &outgoing {
                                if tx.send(frame).await.is_err() {
                                    // Outgoing side of the connection is gone.
                                    break;
                                }
                            }
                        }
                        info!("[{}] video pipeline finished", sid);
                    }));
                }
            }
        }

        let generation = Uuid::new_v4();
        let handle = SessionHandle {
            generation,
            aborts: tasks.iter().map(|t| t.abort_handle()).collect(),
        };

        let previous = {
            let mut sessions = self.sessions.lock().expect("session map lock poisoned");
            sessions.insert(session_id.to_string(), handle)
        };
        if let Some(previous) = previous {
            info!(
                "[{}] renegotiation replaces existing media connection",
                session_id
            );
            previous.abort_all();
        }

        self.spawn_supervisor(session_id.to_string(), generation, tasks, closed);

        info!("[{}] media session attached", session_id);
        answer
    }

    /// Supervises one pipeline set: waits for natural end-of-track
    /// completion or a transport-closed signal (which aborts the set), then
    /// removes the session entry it still owns.
    fn spawn_supervisor(
        &self,
        session_id: String,
        generation: Uuid,
        tasks: Vec<JoinHandle<()>>,
        mut closed: watch::Receiver<bool>,
    ) {
        let manager = self.clone();

        tokio::spawn(async move {
            let aborts: Vec<AbortHandle> = tasks.iter().map(|t| t.abort_handle()).collect();
            let mut all_done = futures::future::join_all(tasks);

            tokio::select! {
                _ = &mut all_done => {}
                _ = wait_for_close(&mut closed) => {
                    info!("[{}] media connection closed, stopping pipelines", session_id);
                    for abort in &aborts {
                        abort.abort();
                    }
                    let _ = all_done.await;
                }
            }

            manager.remove_if(&session_id, generation);
            info!("[{}] media session cleaned up", session_id);
        });
    }

    fn remove_if(&self, session_id: &str, generation: Uuid) {
        let mut sessions = self.sessions.lock().expect("session map lock poisoned");
        if let Some(current) = sessions.get(session_id) {
            if current.generation == generation {
                sessions.remove(session_id);
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves when the transport reports closure. A dropped sender without a
/// close signal resolves never; the pipelines then end on their own when the
/// frame channels drain out.
async fn wait_for_close(closed: &mut watch::Receiver<bool>) {
    if *closed.borrow() {
        return;
    }
    while closed.changed().await.is_ok() {
        if *closed.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await
}
