use interview_media::registry::{ClientChannel, SessionRegistry, TranscriptEvent};

#[test]
fn test_last_registration_wins() {
    let registry = SessionRegistry::new();
    let (a, _rx_a) = ClientChannel::new();
    let (b, _rx_b) = ClientChannel::new();

    registry.register("s1", a.clone());
    registry.register("s1", b.clone());

    let current = registry.lookup("s1").expect("channel registered");
    assert_eq!(current.id(), b.id());
}

#[test]
fn test_stale_deregister_is_noop() {
    let registry = SessionRegistry::new();
    let (a, _rx_a) = ClientChannel::new();
    let (b, _rx_b) = ClientChannel::new();

    registry.register("s1", a.clone());
    registry.register("s1", b.clone());

    // A disconnect handler for the replaced channel must not remove the
    // newer registration.
    registry.deregister("s1", &a);
    assert_eq!(registry.lookup("s1").unwrap().id(), b.id());

    registry.deregister("s1", &b);
    assert!(registry.lookup("s1").is_none());
}

#[test]
fn test_lookup_unknown_session() {
    let registry = SessionRegistry::new();
    assert!(registry.lookup("missing").is_none());
}

#[tokio::test]
async fn test_push_delivers_to_owner() {
    let (channel, mut rx) = ClientChannel::new();
    let event = TranscriptEvent::stt_result("s1", "hello");

    assert!(channel.push(event.clone()));
    let received = rx.recv().await.unwrap();
    assert_eq!(received, event);
}

#[test]
fn test_push_after_owner_gone() {
    let (channel, rx) = ClientChannel::new();
    drop(rx);

    // Delivery failure is reported, not panicked.
    assert!(!channel.push(TranscriptEvent::stt_result("s1", "hello")));
}

#[test]
fn test_transcript_event_wire_format() {
    let event = TranscriptEvent::stt_result("s2", "안녕하세요");
    assert!(event.timestamp > 0.0);

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["sessionId"], "s2");
    assert_eq!(json["text"], "안녕하세요");
    assert_eq!(json["type"], "stt_result");
    assert!(json["timestamp"].is_number());
}
