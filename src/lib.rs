pub mod config;
pub mod http;
pub mod jobs;
pub mod media;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod stt;

pub use config::Config;
pub use http::{create_router, AppState};
pub use jobs::{JobDispatcher, JobQueue, NatsJobQueue};
pub use media::{
    ChannelMediaEngine, MediaConnection, MediaEngine, MediaIngest, NegotiationError,
    SessionDescription, TrackKind,
};
pub use pipeline::{TranscriptionBridge, VideoSamplingPipeline, DEFAULT_SAMPLE_INTERVAL};
pub use registry::{ClientChannel, SessionRegistry, TranscriptEvent};
pub use session::{SessionContext, SessionManager};
pub use stt::{DeepgramRecognizer, Recognizer, RecognizerEvent, RecognizerParams};
