mod common;

use common::{settle, video_frame, RecordingQueue};
use interview_media::jobs::JobDispatcher;
use interview_media::media::{
    ChannelMediaEngine, MediaEngine, NegotiationError, SessionDescription, TrackKind,
};
use interview_media::registry::{ClientChannel, SessionRegistry};
use interview_media::session::{SessionContext, SessionManager};
use interview_media::stt::RecognizerParams;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

fn offer(sdp: &str) -> SessionDescription {
    SessionDescription {
        sdp: sdp.to_string(),
        kind: "offer".to_string(),
    }
}

fn audio_video_offer() -> SessionDescription {
    offer(
        "v=0\r\n\
         o=- 46117317 2 IN IP4 127.0.0.1\r\n\
         s=-\r\n\
         t=0 0\r\n\
         m=audio 49170 RTP/AVP 0\r\n\
         m=video 51372 RTP/AVP 96\r\n",
    )
}

fn test_context(queue: Arc<RecordingQueue>, registry: Arc<SessionRegistry>) -> SessionContext {
    SessionContext {
        registry,
        dispatcher: JobDispatcher::new(queue),
        recognizer: None,
        stt_params: RecognizerParams::default(),
        sample_interval: Duration::from_secs(2),
    }
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    timeout(WAIT, async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_negotiate_audio_and_video() {
    let engine = ChannelMediaEngine::new();
    let connection = engine.negotiate("s1", audio_video_offer()).await.unwrap();

    assert_eq!(connection.answer.kind, "answer");
    assert!(connection.answer.sdp.contains("m=audio"));
    assert!(connection.answer.sdp.contains("m=video"));

    let kinds: Vec<TrackKind> = connection.tracks.iter().map(|t| t.kind()).collect();
    assert_eq!(kinds, vec![TrackKind::Audio, TrackKind::Video]);
    assert!(connection.outgoing_video.is_some());
}

#[tokio::test]
async fn test_negotiate_audio_only() {
    let engine = ChannelMediaEngine::new();
    let connection = engine
        .negotiate("s1", offer("v=0\r\nm=audio 9 RTP/AVP 0\r\n"))
        .await
        .unwrap();

    assert_eq!(connection.tracks.len(), 1);
    // Audio is consumed one-way; nothing is sent back.
    assert!(connection.outgoing_video.is_none());
}

#[tokio::test]
async fn test_negotiate_rejects_malformed_sdp() {
    let engine = ChannelMediaEngine::new();
    let result = engine.negotiate("s1", offer("not an sdp")).await;
    assert!(matches!(result, Err(NegotiationError::Malformed(_))));

    // Nothing half-wired after a failed negotiation.
    assert!(engine.take_ingest("s1").is_none());
}

#[tokio::test]
async fn test_negotiate_rejects_non_offer() {
    let engine = ChannelMediaEngine::new();
    let description = SessionDescription {
        sdp: "v=0\r\nm=audio 9 RTP/AVP 0\r\n".to_string(),
        kind: "answer".to_string(),
    };
    let result = engine.negotiate("s1", description).await;
    assert!(matches!(result, Err(NegotiationError::UnsupportedType(_))));
}

#[tokio::test]
async fn test_negotiate_rejects_unsupported_media() {
    let engine = ChannelMediaEngine::new();
    let result = engine
        .negotiate("s1", offer("v=0\r\nm=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n"))
        .await;
    assert!(matches!(result, Err(NegotiationError::NoMedia)));
}

#[tokio::test]
async fn test_pending_ingest_stays_claimable_while_connection_live() {
    let engine = ChannelMediaEngine::new();
    let connection = engine.negotiate("s9", audio_video_offer()).await.unwrap();

    settle().await;
    assert!(engine.has_pending_ingest("s9"));
    assert!(engine.take_ingest("s9").is_some());
    drop(connection);
}

#[tokio::test]
async fn test_unclaimed_ingest_discarded_when_connection_dropped() {
    let engine = ChannelMediaEngine::new();
    let connection = engine.negotiate("s9", audio_video_offer()).await.unwrap();
    assert!(engine.has_pending_ingest("s9"));

    // The connection goes away before any transport binding claims the
    // ingest; the entry must not outlive it.
    drop(connection);
    wait_until(|| !engine.has_pending_ingest("s9")).await;
    assert!(engine.take_ingest("s9").is_none());
}

#[tokio::test]
async fn test_video_passthrough_and_sampling_side_effect() {
    let engine = ChannelMediaEngine::new();
    let queue = Arc::new(RecordingQueue::new());
    let registry = Arc::new(SessionRegistry::new());
    let manager = SessionManager::new();

    let connection = engine.negotiate("s1", audio_video_offer()).await.unwrap();
    let answer = manager.attach(&test_context(queue.clone(), registry), "s1", connection);
    assert_eq!(answer.kind, "answer");
    assert_eq!(manager.active_sessions(), 1);

    let mut ingest = engine.take_ingest("s1").expect("transport side available");
    let video_tx = ingest.video.take().unwrap();
    let mut returned = ingest.returned_video.take().unwrap();

    // Every ingested frame comes back on the outgoing track, in order.
    for i in 0..3u64 {
        video_tx.send(video_frame(i)).await.unwrap();
        let frame = timeout(WAIT, returned.recv()).await.unwrap().unwrap();
        assert_eq!(frame, video_frame(i));
    }

    settle().await;
    assert!(queue.count() >= 1, "first frame sampled immediately");

    // Ending the tracks lets the session clean itself up.
    drop(video_tx);
    drop(ingest);
    drop(returned);
    wait_until(|| manager.active_sessions() == 0).await;
}

#[tokio::test]
async fn test_connection_close_leaves_client_channel_registered() {
    let engine = ChannelMediaEngine::new();
    let queue = Arc::new(RecordingQueue::new());
    let registry = Arc::new(SessionRegistry::new());
    let manager = SessionManager::new();

    let (channel, _events) = ClientChannel::new();
    registry.register("s3", channel);

    let connection = engine
        .negotiate("s3", offer("v=0\r\nm=audio 9 RTP/AVP 0\r\n"))
        .await
        .unwrap();
    manager.attach(
        &test_context(queue, Arc::clone(&registry)),
        "s3",
        connection,
    );

    let ingest = engine.take_ingest("s3").unwrap();
    ingest.close();
    drop(ingest);

    wait_until(|| manager.active_sessions() == 0).await;

    // The media connection is gone; the signaling channel is independent
    // and stays registered.
    assert!(registry.lookup("s3").is_some());
}

#[tokio::test]
async fn test_renegotiation_replaces_previous_connection() {
    let engine = ChannelMediaEngine::new();
    let queue = Arc::new(RecordingQueue::new());
    let registry = Arc::new(SessionRegistry::new());
    let manager = SessionManager::new();
    let context = test_context(queue, registry);

    let first = engine.negotiate("s1", audio_video_offer()).await.unwrap();
    manager.attach(&context, "s1", first);

    let second = engine.negotiate("s1", audio_video_offer()).await.unwrap();
    manager.attach(&context, "s1", second);

    assert_eq!(manager.active_sessions(), 1);

    // The replaced pipeline set shuts down; the replacement stays attached.
    settle().await;
    assert_eq!(manager.active_sessions(), 1);

    let ingest = engine.take_ingest("s1").unwrap();
    ingest.close();
    drop(ingest);
    wait_until(|| manager.active_sessions() == 0).await;
}
