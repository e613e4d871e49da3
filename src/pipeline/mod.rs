//! Per-track processing pipelines.
//!
//! One pipeline per negotiated media kind: video frames pass through with
//! rate-limited emotion sampling on the side, audio frames feed the
//! streaming transcription bridge. Pipelines are independently scheduled and
//! never block the upstream frame source on their downstream action.

pub mod transcription;
pub mod video;

pub use transcription::TranscriptionBridge;
pub use video::{VideoSamplingPipeline, DEFAULT_SAMPLE_INTERVAL};
