mod common;

use common::RecordingQueue;
use interview_media::jobs::{
    EvaluationJob, JobDispatcher, EMOTION_ANALYSIS_JOB, EVALUATION_JOB, EVALUATION_RUBRIC,
};
use std::sync::Arc;

#[tokio::test]
async fn test_emotion_analysis_submission() {
    let queue = Arc::new(RecordingQueue::new());
    let dispatcher = JobDispatcher::new(queue.clone());

    dispatcher
        .submit_emotion_analysis("session-1", "aGVsbG8=".to_string())
        .await
        .unwrap();

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 1);

    let (name, payload) = &jobs[0];
    assert_eq!(name, EMOTION_ANALYSIS_JOB);
    assert_eq!(payload["session_id"], "session-1");
    assert_eq!(payload["image"], "aGVsbG8=");
    assert!(payload["timestamp"].is_string());
}

#[tokio::test]
async fn test_evaluation_submission() {
    let queue = Arc::new(RecordingQueue::new());
    let dispatcher = JobDispatcher::new(queue.clone());

    dispatcher
        .submit_evaluation(42, "What is ownership?", "It is...", EVALUATION_RUBRIC)
        .await
        .unwrap();

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 1);

    let (name, payload) = &jobs[0];
    assert_eq!(name, EVALUATION_JOB);
    assert_eq!(payload["record_id"], 42);
    assert_eq!(payload["question"], "What is ownership?");
    assert_eq!(payload["answer"], "It is...");
    assert_eq!(payload["rubric"], EVALUATION_RUBRIC);
}

#[test]
fn test_evaluation_job_serialization() {
    let job = EvaluationJob {
        record_id: 7,
        question: "질문".to_string(),
        answer: "답변".to_string(),
        rubric: EVALUATION_RUBRIC.to_string(),
        timestamp: "2026-08-28T12:00:00Z".to_string(),
    };

    let json = serde_json::to_string(&job).unwrap();
    assert!(json.contains("\"record_id\":7"));
    assert!(json.contains("질문"));

    let back: EvaluationJob = serde_json::from_str(&json).unwrap();
    assert_eq!(back.record_id, 7);
    assert_eq!(back.rubric, EVALUATION_RUBRIC);
}

#[tokio::test]
async fn test_duplicate_submission_tolerated() {
    let queue = Arc::new(RecordingQueue::new());
    let dispatcher = JobDispatcher::new(queue.clone());

    // At-most-once, best-effort: the dispatcher never deduplicates.
    for _ in 0..2 {
        dispatcher
            .submit_emotion_analysis("session-1", "aGVsbG8=".to_string())
            .await
            .unwrap();
    }

    assert_eq!(queue.count(), 2);
}
