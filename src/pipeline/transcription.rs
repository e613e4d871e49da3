use crate::media::AudioSource;
use crate::registry::{SessionRegistry, TranscriptEvent};
use crate::stt::{Recognizer, RecognizerEvent, RecognizerParams, RecognizerSession};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Bridges one audio track to the streaming recognizer for the track's
/// lifetime.
///
/// Two concurrent paths: a drain loop feeding raw PCM to the recognizer and
/// a relay task pushing recognized text to the session's client channel via
/// the registry (silent drop when none is registered). Teardown closes the
/// recognizer session exactly once and never disturbs the session's other
/// pipelines.
pub struct TranscriptionBridge;

impl TranscriptionBridge {
    pub fn spawn(
        session_id: String,
        source: AudioSource,
        recognizer: Option<Arc<dyn Recognizer>>,
        params: RecognizerParams,
        registry: Arc<SessionRegistry>,
    ) -> JoinHandle<()> {
        tokio::spawn(Self::run(session_id, source, recognizer, params, registry))
    }

    async fn run(
        session_id: String,
        mut source: AudioSource,
        recognizer: Option<Arc<dyn Recognizer>>,
        params: RecognizerParams,
        registry: Arc<SessionRegistry>,
    ) {
        let Some(recognizer) = recognizer else {
            info!(
                "[{}] transcription disabled, discarding audio track",
                session_id
            );
            Self::drain_discard(&mut source).await;
            return;
        };

        let session = match recognizer.open(&params).await {
            Ok(session) => session,
            Err(e) => {
                // The track must keep flowing even when the recognizer is
                // unreachable.
                error!("[{}] failed to open recognizer session: {}", session_id, e);
                Self::drain_discard(&mut source).await;
                return;
            }
        };
        let RecognizerSession {
            mut sink,
            mut events,
        } = session;

        info!("[{}] transcription bridge started", session_id);

        // Relay task: recognizer events, in vendor order, to whatever client
        // channel is registered at event time.
        let relay_session_id = session_id.clone();
        let mut relay = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    RecognizerEvent::Transcript { text } if !text.is_empty() => {
                        info!("[{}] stt: {}", relay_session_id, text);
                        let record = TranscriptEvent::stt_result(&relay_session_id, &text);
                        match registry.lookup(&relay_session_id) {
                            Some(channel) => {
                                if !channel.push(record) {
                                    debug!(
                                        "[{}] client channel gone, dropping transcript",
                                        relay_session_id
                                    );
                                }
                            }
                            None => {
                                debug!(
                                    "[{}] no client channel registered, dropping transcript",
                                    relay_session_id
                                );
                            }
                        }
                    }
                    RecognizerEvent::Transcript { .. } => {}
                    RecognizerEvent::Open => {
                        info!("[{}] recognizer session open", relay_session_id);
                    }
                    RecognizerEvent::Error(e) => {
                        error!("[{}] recognizer error: {}", relay_session_id, e);
                    }
                    RecognizerEvent::Closed => {
                        info!("[{}] recognizer session closed", relay_session_id);
                        break;
                    }
                }
            }
        });

        // Drain loop: every audio frame goes to the recognizer as raw PCM.
        // A send failure stops the drain, and so does the relay finishing:
        // an event-stream closure means the recognizer connection is gone,
        // and teardown must not wait for the track to end on its own.
        let mut relay_done = false;
        loop {
            // Biased so frames already delivered are forwarded before the
            // relay's completion is acted on.
            tokio::select! {
                biased;
                frame = source.next() => match frame {
                    Some(frame) => {
                        if let Err(e) = sink.send(&frame.to_le_bytes()).await {
                            warn!(
                                "[{}] recognizer send failed, stopping drain: {}",
                                session_id, e
                            );
                            break;
                        }
                    }
                    None => break,
                },
                result = &mut relay, if !relay_done => {
                    relay_done = true;
                    if let Err(e) = result {
                        error!("[{}] relay task panicked: {}", session_id, e);
                    }
                    info!(
                        "[{}] recognizer event stream ended, stopping drain",
                        session_id
                    );
                    break;
                }
            }
        }

        // Close exactly once, swallowing close-time errors.
        if let Err(e) = sink.close().await {
            debug!("[{}] recognizer close error ignored: {}", session_id, e);
        }

        if relay_done {
            // The recognizer went away mid-track; keep consuming so the
            // transport is never backpressured.
            Self::drain_discard(&mut source).await;
        } else if let Err(e) = relay.await {
            error!("[{}] relay task panicked: {}", session_id, e);
        }

        info!("[{}] transcription bridge finished", session_id);
    }

    /// Consume the track without any network activity so the frame source is
    /// never backpressured.
    async fn drain_discard(source: &mut AudioSource) {
        while source.next().await.is_some() {}
    }
}
