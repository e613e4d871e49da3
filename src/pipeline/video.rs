use crate::jobs::JobDispatcher;
use crate::media::{VideoFrame, VideoSource};
use base64::Engine;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Minimum wall-clock gap between sampled frames
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Passthrough video pipeline with periodic emotion sampling.
///
/// `next()` returns every frame unmodified and in order; at most once per
/// interval the current frame is also encoded and submitted as an
/// emotion-analysis job on a detached task, so the side effect never shares
/// the frame return path. The rate limit is wall-clock based and tolerates
/// variable frame rates.
pub struct VideoSamplingPipeline {
    source: VideoSource,
    session_id: String,
    dispatcher: JobDispatcher,
    interval: Duration,
    last_sample: Option<Instant>,
}

impl VideoSamplingPipeline {
    pub fn new(
        source: VideoSource,
        session_id: String,
        dispatcher: JobDispatcher,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            session_id,
            dispatcher,
            interval,
            last_sample: None,
        }
    }

    /// Pull the next frame. Returns `None` when the track ends.
    pub async fn next(&mut self) -> Option<VideoFrame> {
        let frame = self.source.next().await?;

        let now = Instant::now();
        let due = match self.last_sample {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };

        if due {
            self.last_sample = Some(now);
            self.sample(frame.clone());
        }

        Some(frame)
    }

    /// Encode and submit a sampled frame without touching the frame path.
    /// Encoding and enqueueing both happen on the detached task; any failure
    /// is logged and dropped.
    fn sample(&self, frame: VideoFrame) {
        let session_id = self.session_id.clone();
        let dispatcher = self.dispatcher.clone();

        tokio::spawn(async move {
            // JPEG encoding is CPU-bound; keep it off the async workers.
            let encoded = tokio::task::spawn_blocking(move || {
                let jpeg = frame.to_jpeg()?;
                Ok::<_, anyhow::Error>(base64::engine::general_purpose::STANDARD.encode(jpeg))
            })
            .await;
            let image_b64 = match encoded {
                Ok(Ok(image)) => image,
                Ok(Err(e)) => {
                    warn!("[{}] failed to encode sampled frame: {}", session_id, e);
                    return;
                }
                Err(e) => {
                    warn!("[{}] sampled frame encode task failed: {}", session_id, e);
                    return;
                }
            };

            if let Err(e) = dispatcher
                .submit_emotion_analysis(&session_id, image_b64)
                .await
            {
                warn!("[{}] emotion-analysis dispatch failed: {}", session_id, e);
            } else {
                debug!("[{}] submitted emotion-analysis frame", session_id);
            }
        });
    }
}
