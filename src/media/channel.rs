use super::engine::{
    AudioSource, MediaConnection, MediaEngine, NegotiationError, RemoteTrack, SessionDescription,
    TrackKind, VideoSource,
};
use super::frames::{AudioFrame, VideoFrame};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::info;
use uuid::Uuid;

/// Buffered decoded frames per track before the ingest side backpressures
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Transport-facing side of a negotiated connection.
///
/// The DTLS/SRTP transport (or a test) pushes decoded frames into the
/// senders, reads returned video from `returned_video`, and calls `close`
/// when the peer goes away. Dropping the ingest ends every track.
pub struct MediaIngest {
    pub session_id: String,
    pub audio: Option<mpsc::Sender<AudioFrame>>,
    pub video: Option<mpsc::Sender<VideoFrame>>,
    /// Passthrough video driven back out to the peer
    pub returned_video: Option<mpsc::Receiver<VideoFrame>>,
    id: Uuid,
    closed_tx: Arc<watch::Sender<bool>>,
}

impl MediaIngest {
    /// Signal that the underlying transport closed. The frame senders should
    /// be dropped (or the whole ingest dropped) alongside this call so the
    /// track drain loops observe end-of-track.
    pub fn close(&self) {
        let _ = self.closed_tx.send(true);
    }
}

/// In-process media engine.
///
/// Validates the offer, synthesizes an answer for the media kinds it carries,
/// and hands decoded-frame channels to the orchestrator on one side and a
/// `MediaIngest` to the transport binding on the other. Stands in for a full
/// WebRTC stack, which plugs in behind the same `MediaEngine` trait.
pub struct ChannelMediaEngine {
    pending: Arc<Mutex<HashMap<String, MediaIngest>>>,
}

impl ChannelMediaEngine {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Take ownership of the transport side of a negotiated connection.
    /// Renegotiation replaces any untaken ingest for the same session.
    pub fn take_ingest(&self, session_id: &str) -> Option<MediaIngest> {
        self.pending
            .lock()
            .expect("ingest map lock poisoned")
            .remove(session_id)
    }

    /// Whether a negotiated, not-yet-claimed transport side exists.
    pub fn has_pending_ingest(&self, session_id: &str) -> bool {
        self.pending
            .lock()
            .expect("ingest map lock poisoned")
            .contains_key(session_id)
    }

    /// Discards an ingest nobody claimed once its connection is gone.
    ///
    /// The closed-watch receivers live on the orchestrator side; when the
    /// last one drops (after a close signal, end of tracks, or a connection
    /// that was never attached) the pending entry has no future taker. The
    /// id guard keeps a stale evictor from unseating a renegotiated ingest.
    fn spawn_evictor(
        &self,
        session_id: String,
        ingest_id: Uuid,
        closed_tx: Arc<watch::Sender<bool>>,
    ) {
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            closed_tx.closed().await;
            let mut pending = pending.lock().expect("ingest map lock poisoned");
            if let Some(current) = pending.get(&session_id) {
                if current.id == ingest_id {
                    pending.remove(&session_id);
                    info!("[{}] discarded unclaimed media ingest", session_id);
                }
            }
        });
    }

    fn parse_offer(offer: &SessionDescription) -> Result<Vec<TrackKind>, NegotiationError> {
        if !offer.kind.eq_ignore_ascii_case("offer") {
            return Err(NegotiationError::UnsupportedType(offer.kind.clone()));
        }

        let mut lines = offer.sdp.lines().map(str::trim);
        match lines.next() {
            Some(first) if first.starts_with("v=") => {}
            _ => {
                return Err(NegotiationError::Malformed(
                    "missing v= protocol version line".to_string(),
                ))
            }
        }

        let mut kinds = Vec::new();
        for line in lines {
            let kind = if line.starts_with("m=audio") {
                TrackKind::Audio
            } else if line.starts_with("m=video") {
                TrackKind::Video
            } else {
                continue;
            };
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            return Err(NegotiationError::NoMedia);
        }
        Ok(kinds)
    }

    fn answer_for(kinds: &[TrackKind]) -> SessionDescription {
        let mut sdp = String::from("v=0\r\no=- 0 0 IN IP4 0.0.0.0\r\ns=interview-media\r\nt=0 0\r\n");
        for kind in kinds {
            match kind {
                TrackKind::Audio => sdp.push_str("m=audio 9 RTP/AVP 0\r\n"),
                TrackKind::Video => sdp.push_str("m=video 9 RTP/AVP 96\r\n"),
            }
        }
        SessionDescription {
            sdp,
            kind: "answer".to_string(),
        }
    }
}

impl Default for ChannelMediaEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MediaEngine for ChannelMediaEngine {
    async fn negotiate(
        &self,
        session_id: &str,
        offer: SessionDescription,
    ) -> Result<MediaConnection, NegotiationError> {
        let kinds = Self::parse_offer(&offer)?;

        let (closed_tx, closed_rx) = watch::channel(false);
        let closed_tx = Arc::new(closed_tx);
        let ingest_id = Uuid::new_v4();
        let mut ingest = MediaIngest {
            session_id: session_id.to_string(),
            audio: None,
            video: None,
            returned_video: None,
            id: ingest_id,
            closed_tx: Arc::clone(&closed_tx),
        };

        let mut tracks = Vec::new();
        let mut outgoing_video = None;
        for kind in &kinds {
            match kind {
                TrackKind::Audio => {
                    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
                    ingest.audio = Some(tx);
                    tracks.push(RemoteTrack::Audio(AudioSource::from_receiver(rx)));
                }
                TrackKind::Video => {
                    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
                    ingest.video = Some(tx);
                    tracks.push(RemoteTrack::Video(VideoSource::from_receiver(rx)));

                    let (out_tx, out_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
                    ingest.returned_video = Some(out_rx);
                    outgoing_video = Some(out_tx);
                }
            }
        }

        info!(
            "[{}] negotiated media connection with {} track(s)",
            session_id,
            tracks.len()
        );

        {
            let mut pending = self.pending.lock().expect("ingest map lock poisoned");
            pending.insert(session_id.to_string(), ingest);
        }
        self.spawn_evictor(session_id.to_string(), ingest_id, closed_tx);

        Ok(MediaConnection {
            answer: Self::answer_for(&kinds),
            tracks,
            outgoing_video,
            closed: closed_rx,
        })
    }
}
