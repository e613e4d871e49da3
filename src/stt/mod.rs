//! Streaming speech-to-text seam.
//!
//! The vendor protocol sits behind the `Recognizer` trait: opening a session
//! yields a raw-audio sink plus a typed event stream, consumed by the
//! transcription bridge. `DeepgramRecognizer` is the production
//! implementation.

pub mod deepgram;

use anyhow::Result;
use tokio::sync::mpsc;

pub use deepgram::DeepgramRecognizer;

/// Fixed connect parameters for a streaming recognition session.
/// Configuration constants, not re-negotiated per call.
#[derive(Debug, Clone)]
pub struct RecognizerParams {
    pub model: String,
    pub language: String,
    pub smart_format: bool,
    /// Raw audio encoding label, e.g. "linear16"
    pub encoding: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for RecognizerParams {
    fn default() -> Self {
        Self {
            model: "nova-2".to_string(),
            language: "ko".to_string(),
            smart_format: true,
            encoding: "linear16".to_string(),
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// Typed event emitted by a recognizer session.
///
/// An explicit lazy stream, not nested callbacks: the session's read side
/// produces events in vendor order and the channel closes when the
/// connection is gone.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    Open,
    /// A recognized-text result; may carry an empty transcript
    Transcript { text: String },
    Error(String),
    Closed,
}

/// Write side of an open recognizer session
#[async_trait::async_trait]
pub trait RecognizerSink: Send {
    /// Send a chunk of raw audio (little-endian PCM).
    async fn send(&mut self, pcm: &[u8]) -> Result<()>;

    /// Finish the stream and close the connection.
    async fn close(&mut self) -> Result<()>;
}

/// An open streaming recognition session
pub struct RecognizerSession {
    pub sink: Box<dyn RecognizerSink>,
    pub events: mpsc::Receiver<RecognizerEvent>,
}

/// External streaming recognizer seam
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    async fn open(&self, params: &RecognizerParams) -> Result<RecognizerSession>;
}
