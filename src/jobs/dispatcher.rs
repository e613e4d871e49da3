use super::messages::{
    EmotionAnalysisJob, EvaluationJob, EMOTION_ANALYSIS_JOB, EVALUATION_JOB,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// External work queue seam.
///
/// `enqueue` returns once the message is handed to the queue, not once the
/// job runs; there is no result channel. Implementations must be safe for
/// concurrent use from every session path.
#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job_name: &str, payload: serde_json::Value) -> Result<()>;
}

/// NATS-backed work queue; jobs land on `jobs.<name>` subjects
pub struct NatsJobQueue {
    client: async_nats::Client,
}

impl NatsJobQueue {
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl JobQueue for NatsJobQueue {
    async fn enqueue(&self, job_name: &str, payload: serde_json::Value) -> Result<()> {
        let subject = format!("jobs.{}", job_name);
        let bytes = serde_json::to_vec(&payload)?;

        self.client
            .publish(subject.clone(), bytes.into())
            .await
            .with_context(|| format!("Failed to publish job to {}", subject))?;

        debug!("Enqueued job on {}", subject);
        Ok(())
    }
}

/// Typed fire-and-forget job submission.
///
/// At-most-once, best-effort: a failed enqueue is the caller's to log and
/// drop, and duplicate submissions are the worker's problem to deduplicate.
#[derive(Clone)]
pub struct JobDispatcher {
    queue: Arc<dyn JobQueue>,
}

impl JobDispatcher {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    async fn submit<T: Serialize>(&self, job_name: &str, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload)
            .with_context(|| format!("Failed to serialize {} payload", job_name))?;
        self.queue.enqueue(job_name, value).await
    }

    /// Submit a sampled frame for facial-emotion analysis.
    pub async fn submit_emotion_analysis(&self, session_id: &str, image_b64: String) -> Result<()> {
        let job = EmotionAnalysisJob {
            session_id: session_id.to_string(),
            image: image_b64,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.submit(EMOTION_ANALYSIS_JOB, &job).await
    }

    /// Submit an answer for rubric-based evaluation.
    pub async fn submit_evaluation(
        &self,
        record_id: i64,
        question: &str,
        answer: &str,
        rubric: &str,
    ) -> Result<()> {
        let job = EvaluationJob {
            record_id,
            question: question.to_string(),
            answer: answer.to_string(),
            rubric: rubric.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.submit(EVALUATION_JOB, &job).await
    }
}
