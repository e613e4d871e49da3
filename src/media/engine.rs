use super::frames::{AudioFrame, VideoFrame};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

/// SDP-equivalent session description exchanged during negotiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescription {
    pub sdp: String,
    /// "offer" or "answer"
    #[serde(rename = "type")]
    pub kind: String,
}

/// Media kind negotiated for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Why negotiation failed. Surfaced synchronously to the signaling caller;
/// a failed negotiation leaves nothing half-wired.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("malformed session description: {0}")]
    Malformed(String),

    #[error("unsupported description type {0:?}, expected \"offer\"")]
    UnsupportedType(String),

    #[error("offer contains no supported media sections")]
    NoMedia,

    #[error("media engine failure: {0}")]
    Engine(String),
}

/// Pull-based source of decoded audio frames for one remote track.
/// Returns `None` when the track ends.
pub struct AudioSource {
    rx: mpsc::Receiver<AudioFrame>,
}

impl AudioSource {
    pub fn from_receiver(rx: mpsc::Receiver<AudioFrame>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AudioFrame> {
        self.rx.recv().await
    }
}

/// Pull-based source of decoded video frames for one remote track.
pub struct VideoSource {
    rx: mpsc::Receiver<VideoFrame>,
}

impl VideoSource {
    pub fn from_receiver(rx: mpsc::Receiver<VideoFrame>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<VideoFrame> {
        self.rx.recv().await
    }
}

/// A remote track delivered by the media engine after negotiation
pub enum RemoteTrack {
    Audio(AudioSource),
    Video(VideoSource),
}

impl RemoteTrack {
    pub fn kind(&self) -> TrackKind {
        match self {
            RemoteTrack::Audio(_) => TrackKind::Audio,
            RemoteTrack::Video(_) => TrackKind::Video,
        }
    }
}

/// A negotiated per-session media connection.
///
/// Owns the remote tracks, the sender side of the outgoing (returned) video
/// track, and a closed-signal watch that flips to `true` when the underlying
/// transport reports closure.
pub struct MediaConnection {
    pub answer: SessionDescription,
    pub tracks: Vec<RemoteTrack>,
    pub outgoing_video: Option<mpsc::Sender<VideoFrame>>,
    pub closed: watch::Receiver<bool>,
}

/// Seam to the real-time media transport.
///
/// Implementations handle description exchange and deliver decoded frames;
/// ICE/DTLS/SRTP internals stay behind this trait. Negotiation is atomic:
/// either a fully-wired `MediaConnection` or an error and nothing created.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    async fn negotiate(
        &self,
        session_id: &str,
        offer: SessionDescription,
    ) -> Result<MediaConnection, NegotiationError>;
}
