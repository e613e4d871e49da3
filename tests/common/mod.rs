use anyhow::Result;
use interview_media::jobs::JobQueue;
use interview_media::media::VideoFrame;
use std::sync::Mutex;

/// In-memory work queue that records every enqueued job
pub struct RecordingQueue {
    jobs: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn jobs(&self) -> Vec<(String, serde_json::Value)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job_name: &str, payload: serde_json::Value) -> Result<()> {
        self.jobs
            .lock()
            .unwrap()
            .push((job_name.to_string(), payload));
        Ok(())
    }
}

/// Tiny valid RGB24 frame for pipeline tests
pub fn video_frame(timestamp_ms: u64) -> VideoFrame {
    VideoFrame {
        data: vec![128; 2 * 2 * 3],
        width: 2,
        height: 2,
        timestamp_ms,
    }
}

/// Let detached tasks spawned by the code under test run to completion.
/// The short real sleeps give work handed to the blocking pool a chance
/// to finish even when the tokio clock is paused.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}
