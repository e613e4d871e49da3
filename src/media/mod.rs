//! Media engine seam.
//!
//! The real-time transport (ICE/DTLS/SRTP, codecs) lives behind the
//! `MediaEngine` trait; this crate only consumes decoded frames and track
//! lifecycle events. `ChannelMediaEngine` is the in-process implementation
//! the transport binding (and the test suite) feeds directly.

pub mod channel;
pub mod engine;
pub mod frames;

pub use channel::{ChannelMediaEngine, MediaIngest};
pub use engine::{
    AudioSource, MediaConnection, MediaEngine, NegotiationError, RemoteTrack, SessionDescription,
    TrackKind, VideoSource,
};
pub use frames::{AudioFrame, VideoFrame};
